//! Governance-approved ranges: weights, prices, and basket limits.
//!
//! Ranges are validated once at `start_rebalance` and may only be
//! narrowed afterwards (auction launcher overrides). Widening is
//! always an error.

use crate::error::{EngineError, Result};
use crate::fixed::{MAX_LIMIT, MAX_PRICE_RATIO};
use crate::types::Token;

/// How much of a token one basket unit should contain, in D27
/// token-per-basket-unit. `low <= spot <= high`; zero is allowed
/// (a token being sold out of the basket entirely).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightRange {
    pub low: u128,
    pub spot: u128,
    pub high: u128,
}

impl WeightRange {
    /// A point range at `spot`.
    pub fn point(spot: u128) -> Self {
        Self {
            low: spot,
            spot,
            high: spot,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.low > self.spot || self.spot > self.high {
            return Err(EngineError::InvalidWeights);
        }
        Ok(())
    }

    /// True if `self` lies within `outer` (narrowing-only check).
    pub fn is_within(&self, outer: &WeightRange) -> bool {
        self.low >= outer.low && self.high <= outer.high
    }
}

/// Unit-of-account per token, in D27. `high/low` must not exceed
/// 100: price discovery is bounded by the supplied estimates, not by
/// market depth, and a wider band would let the decay curve cross
/// orders of magnitude of mispricing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceRange {
    pub low: u128,
    pub high: u128,
}

impl PriceRange {
    /// A point range (no uncertainty).
    pub fn point(price: u128) -> Self {
        Self {
            low: price,
            high: price,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.low == 0 || self.high < self.low {
            return Err(EngineError::InvalidPriceRange);
        }
        // high <= 100 * low, checked without overflow
        if self.high / self.low > MAX_PRICE_RATIO
            || (self.high / self.low == MAX_PRICE_RATIO && self.high % self.low != 0)
        {
            return Err(EngineError::InvalidPriceRange);
        }
        Ok(())
    }

    pub fn is_within(&self, outer: &PriceRange) -> bool {
        self.low >= outer.low && self.high <= outer.high
    }
}

/// Basket-units-per-share, in D18. Bounds how aggressively the whole
/// basket may be resized. Must lie in `(0, 1e36]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalanceLimits {
    pub low: u128,
    pub spot: u128,
    pub high: u128,
}

impl RebalanceLimits {
    /// A point limit at `spot`.
    pub fn point(spot: u128) -> Self {
        Self {
            low: spot,
            spot,
            high: spot,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.low == 0
            || self.low > self.spot
            || self.spot > self.high
            || self.high > MAX_LIMIT
        {
            return Err(EngineError::InvalidLimits);
        }
        Ok(())
    }

    pub fn is_within(&self, outer: &RebalanceLimits) -> bool {
        self.low >= outer.low && self.high <= outer.high
    }

    /// Width of the `[low, high]` span. Non-increasing across the
    /// auctions of one rebalance; zero means the rebalancing intent
    /// is exactly pinned down.
    pub fn span(&self) -> u128 {
        self.high - self.low
    }
}

/// Per-token parameters supplied by governance at rebalance start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenParams {
    pub token: Token,
    pub weights: WeightRange,
    pub prices: PriceRange,
}

impl TokenParams {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.prices.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::D27;

    #[test]
    fn weight_ordering_enforced() {
        assert!(WeightRange {
            low: 2,
            spot: 1,
            high: 3
        }
        .validate()
        .is_err());
        assert!(WeightRange {
            low: 1,
            spot: 2,
            high: 3
        }
        .validate()
        .is_ok());
        assert!(WeightRange::point(0).validate().is_ok());
    }

    #[test]
    fn price_zero_low_rejected() {
        assert!(PriceRange { low: 0, high: 1 }.validate().is_err());
    }

    #[test]
    fn price_inverted_rejected() {
        assert!(PriceRange { low: 10, high: 5 }.validate().is_err());
    }

    #[test]
    fn price_ratio_bound() {
        // exactly 100x is allowed
        assert!(PriceRange {
            low: D27,
            high: 100 * D27
        }
        .validate()
        .is_ok());
        // just over is not
        assert!(PriceRange {
            low: D27,
            high: 100 * D27 + 1
        }
        .validate()
        .is_err());
    }

    #[test]
    fn limits_bounds() {
        assert!(RebalanceLimits::point(0).validate().is_err());
        assert!(RebalanceLimits::point(1).validate().is_ok());
        assert!(RebalanceLimits::point(MAX_LIMIT).validate().is_ok());
        assert!(RebalanceLimits::point(MAX_LIMIT + 1).validate().is_err());
    }

    #[test]
    fn narrowing_checks() {
        let outer = RebalanceLimits {
            low: 10,
            spot: 50,
            high: 100,
        };
        let narrower = RebalanceLimits {
            low: 20,
            spot: 50,
            high: 80,
        };
        let wider = RebalanceLimits {
            low: 5,
            spot: 50,
            high: 100,
        };
        assert!(narrower.is_within(&outer));
        assert!(!wider.is_within(&outer));
        assert!(outer.is_within(&outer));
    }

    #[test]
    fn span_shrinks_under_narrowing() {
        let outer = RebalanceLimits {
            low: 10,
            spot: 50,
            high: 100,
        };
        let inner = RebalanceLimits {
            low: 30,
            spot: 40,
            high: 60,
        };
        assert!(inner.is_within(&outer));
        assert!(inner.span() <= outer.span());
    }
}
