//! Engine error taxonomy.
//!
//! Every operation is fail-fast and atomic: an `Err` means no state
//! was touched. Variants group into parameter validation, temporal,
//! economic, and authorization failures.

use crate::types::Token;

/// All errors the engine can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineError {
    // --- parameter validation ---
    #[error("price range invalid: requires 0 < low <= high <= 100*low")]
    InvalidPriceRange,

    #[error("rebalance limits invalid: requires 0 < low <= spot <= high <= 1e36")]
    InvalidLimits,

    #[error("weight range invalid: requires low <= spot <= high")]
    InvalidWeights,

    #[error("rebalance must name at least one token")]
    EmptyBasket,

    #[error("duplicate token {0} in rebalance")]
    DuplicateToken(Token),

    #[error("token {0} is not part of the active rebalance")]
    UnknownToken(Token),

    #[error("sell and buy token must differ")]
    SameToken,

    #[error("ttl must cover the exclusivity window plus the quiet-period buffer")]
    InvalidTtl,

    #[error("arithmetic overflow")]
    Overflow,

    // --- temporal ---
    #[error("no rebalance is active")]
    NoRebalance,

    #[error("rebalance ttl has passed; no further auction may open")]
    RebalanceExpired,

    #[error("an auction is already open for this rebalance")]
    AuctionAlreadyOpen,

    #[error("auction not ongoing at this timestamp")]
    AuctionNotOngoing,

    #[error("exclusivity window has not elapsed")]
    ExclusivityNotElapsed,

    // --- economic ---
    #[error("slippage exceeded: bid amount outside caller bound")]
    SlippageExceeded,

    #[error("insufficient balance: sell amount exceeds current lot")]
    InsufficientBalance,

    // --- authorization ---
    #[error("caller lacks the required role")]
    NotAuthorized,

    #[error("override would widen a governance-approved range")]
    CannotWiden,
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert!(format!("{}", EngineError::SlippageExceeded).contains("slippage"));
        assert!(format!("{}", EngineError::InsufficientBalance).contains("lot"));
        let e = EngineError::DuplicateToken(Token::new("WETH"));
        assert!(format!("{e}").contains("WETH"));
    }

    #[test]
    fn is_error() {
        let err: Box<dyn std::error::Error> = Box::new(EngineError::NoRebalance);
        assert!(err.to_string().contains("rebalance"));
    }
}
