//! Bid validation and pricing.
//!
//! A bid is ephemeral: a `(sell_amount, bid_amount, price)` triple
//! computed at call time. This module is pure; the engine applies
//! the resulting ledger transfer atomically or not at all.

use crate::auction::Auction;
use crate::curve;
use crate::error::{EngineError, Result};
use crate::fixed::{self, Rounding, U256, D27};
use crate::lot;
use crate::types::Timestamp;

/// A priced bid against the current lot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    /// Sell-token quantity leaving the basket.
    pub sell_amount: u128,
    /// Buy-token quantity entering the basket,
    /// `ceil(sell_amount * price / 1e27)`.
    pub bid_amount: u128,
    /// D27 buy-token per sell-token at the quoted timestamp.
    pub price: U256,
}

/// Validate and price a bid.
///
/// Fails with `AuctionNotOngoing` outside the auction interval,
/// `InsufficientBalance` if `sell_amount` is zero or exceeds the
/// current lot, and `SlippageExceeded` if the priced bid amount is
/// zero or above `max_buy_amount`.
pub fn quote(
    auction: &Auction,
    timestamp: Timestamp,
    total_supply: u128,
    sell_balance: u128,
    buy_balance: u128,
    sell_amount: u128,
    max_buy_amount: u128,
) -> Result<Quote> {
    let price = curve::price(auction, timestamp)?;

    if sell_amount == 0 {
        return Err(EngineError::InsufficientBalance);
    }

    let bid_amount = fixed::mul_div(
        U256::from(sell_amount),
        price,
        U256::from(D27),
        Rounding::Ceil,
    )
    .and_then(fixed::narrow)
    .ok_or(EngineError::Overflow)?;

    if bid_amount == 0 || bid_amount > max_buy_amount {
        return Err(EngineError::SlippageExceeded);
    }

    let lot = lot::max_sell(auction, sell_balance, buy_balance, total_supply, price);
    if sell_amount > lot {
        return Err(EngineError::InsufficientBalance);
    }

    Ok(Quote {
        sell_amount,
        bid_amount,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{D18, MAX_TOKEN_BALANCE};
    use crate::types::{AuctionId, RebalanceNonce, Token};

    fn auction() -> Auction {
        Auction {
            id: AuctionId(1),
            nonce: RebalanceNonce(1),
            sell: Token::new("SELL"),
            buy: Token::new("BUY"),
            sell_limit: 0,
            buy_limit: MAX_TOKEN_BALANCE,
            start_price: U256::from(2 * D27),
            end_price: U256::from(2 * D27),
            k: 0,
            start: 0,
            end: 100,
        }
    }

    #[test]
    fn prices_at_curve_and_ceils() {
        let a = auction();
        // 3 sell at price 2.0 -> 6 buy exactly
        let q = quote(&a, 50, 1_000, 1_000, 0, 3, 100).unwrap();
        assert_eq!(q.bid_amount, 6);
        assert_eq!(q.price, U256::from(2 * D27));
    }

    #[test]
    fn bid_amount_rounds_up() {
        let mut a = auction();
        a.start_price = U256::from(D27 / 2);
        a.end_price = a.start_price;
        // 3 sell at price 0.5 -> 1.5 -> ceil 2
        let q = quote(&a, 50, 1_000, 1_000, 0, 3, 100).unwrap();
        assert_eq!(q.bid_amount, 2);
    }

    #[test]
    fn slippage_rejected() {
        let a = auction();
        let err = quote(&a, 50, 1_000, 1_000, 0, 3, 5);
        assert_eq!(err, Err(EngineError::SlippageExceeded));
    }

    #[test]
    fn oversized_sell_rejected() {
        let a = auction();
        // lot is bounded by the sell balance
        let err = quote(&a, 50, 1_000, 10, 0, 11, u128::MAX);
        assert_eq!(err, Err(EngineError::InsufficientBalance));
    }

    #[test]
    fn zero_sell_rejected() {
        let a = auction();
        assert_eq!(
            quote(&a, 50, 1_000, 1_000, 0, 0, 100),
            Err(EngineError::InsufficientBalance)
        );
    }

    #[test]
    fn expired_auction_rejected() {
        let a = auction();
        assert_eq!(
            quote(&a, 101, 1_000, 1_000, 0, 3, 100),
            Err(EngineError::AuctionNotOngoing)
        );
    }
}
