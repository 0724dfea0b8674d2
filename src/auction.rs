//! The auction record: one time-boxed Dutch auction over a token pair.

use crate::fixed::U256;
use crate::types::{AuctionId, RebalanceNonce, Timestamp, Token};

/// A single Dutch auction. At most one exists per rebalance at a
/// time; it is superseded when closed, when its interval elapses, or
/// when a new rebalance starts.
///
/// Invariants (enforced at open): `start <= end`,
/// `end_price <= start_price`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Auction {
    pub id: AuctionId,
    /// Owning rebalance.
    pub nonce: RebalanceNonce,
    pub sell: Token,
    pub buy: Token,
    /// D18 sell-token-per-share: the sell balance may not drop below
    /// `ceil(sell_limit * supply / 1e18)`. Derived at open from the
    /// rebalance limit spot and the sell token's weight spot,
    /// rounded up so the protocol never ends below its floor.
    pub sell_limit: u128,
    /// D18 buy-token-per-share: the buy balance may not rise above
    /// `floor(buy_limit * supply / 1e18)`. Rounded down so the
    /// protocol never ends above its ceiling.
    pub buy_limit: u128,
    /// D27 buy-token per sell-token at `start`.
    pub start_price: U256,
    /// D27 buy-token per sell-token at `end`.
    pub end_price: U256,
    /// Decay constant, wad per second:
    /// `k = ln(start_price/end_price) / (end - start)`.
    pub k: u128,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Auction {
    /// True while bids may settle against this auction.
    pub fn is_ongoing(&self, now: Timestamp) -> bool {
        now >= self.start && now <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::D27;

    fn auction() -> Auction {
        Auction {
            id: AuctionId(1),
            nonce: RebalanceNonce(1),
            sell: Token::new("USDC"),
            buy: Token::new("WETH"),
            sell_limit: 0,
            buy_limit: u128::MAX,
            start_price: U256::from(D27),
            end_price: U256::from(D27),
            k: 0,
            start: 100,
            end: 700,
        }
    }

    #[test]
    fn ongoing_window_is_inclusive() {
        let a = auction();
        assert!(!a.is_ongoing(99));
        assert!(a.is_ongoing(100));
        assert!(a.is_ongoing(400));
        assert!(a.is_ongoing(700));
        assert!(!a.is_ongoing(701));
    }
}
