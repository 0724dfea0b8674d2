//! Notifications emitted on every lifecycle transition.
//!
//! The engine appends one entry per state change (requires the
//! "event-log" feature, enabled by default). Consumers use the log
//! for audit trails and assertions; there is no replay requirement.

use crate::fixed::U256;
use crate::types::{Account, AuctionId, RebalanceNonce, Timestamp, Token};

/// A state transition the engine has committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    RebalanceStarted {
        nonce: RebalanceNonce,
        restricted_until: Timestamp,
        available_until: Timestamp,
    },
    AuctionOpened {
        id: AuctionId,
        nonce: RebalanceNonce,
        sell: Token,
        buy: Token,
        start_price: U256,
        end_price: U256,
        start: Timestamp,
        end: Timestamp,
    },
    BidFilled {
        id: AuctionId,
        bidder: Account,
        sell: Token,
        buy: Token,
        sell_amount: u128,
        bid_amount: u128,
        price: U256,
    },
    AuctionClosed {
        id: AuctionId,
    },
    RebalanceEnded {
        nonce: RebalanceNonce,
    },
}
