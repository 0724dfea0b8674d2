//! Core identifiers: Token, Account, RebalanceNonce, AuctionId, Timestamp

use std::fmt;

/// A token identifier: up to 8 bytes of ASCII, stored inline.
///
/// Tokens are cheap to copy and compare, which matters because the
/// balance ledger and every lifecycle check is keyed by them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token([u8; 8]);

impl Token {
    /// Create a token from a symbol string.
    ///
    /// # Panics
    /// Panics if the symbol is empty or longer than 8 bytes.
    pub fn new(symbol: &str) -> Self {
        assert!(
            !symbol.is_empty() && symbol.len() <= 8,
            "token symbol must be 1-8 bytes, got {:?}",
            symbol
        );
        let mut bytes = [0u8; 8];
        bytes[..symbol.len()].copy_from_slice(symbol.as_bytes());
        Token(bytes)
    }

    /// The symbol as a string slice.
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(8);
        std::str::from_utf8(&self.0[..end]).unwrap_or("<invalid>")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller identity for role checks. Opaque to the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Account(pub u64);

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct{}", self.0)
    }
}

/// Monotonically increasing rebalance identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalanceNonce(pub u64);

impl fmt::Display for RebalanceNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Unique auction identifier assigned by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuctionId(pub u64);

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Timestamp in seconds. Absolute; supplied by the caller on every
/// state-changing operation and checked against deadlines.
pub type Timestamp = u64;
