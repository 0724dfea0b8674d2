//! The rebalance record: one governance action, narrowed over time.

use crate::error::{EngineError, Result};
use crate::ranges::{PriceRange, RebalanceLimits, TokenParams, WeightRange};
use crate::types::{RebalanceNonce, Timestamp, Token};

/// How much latitude the auction launcher has over prices when
/// opening an auction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PriceControl {
    /// Prices are fixed to the governance estimates.
    #[default]
    None,
    /// The launcher may narrow price ranges within the estimates.
    Partial,
    /// The launcher may pin prices to any point inside the
    /// estimates, including `low == high`.
    Full,
}

/// One governance-initiated rebalance. Mutated only by narrowing
/// (never widening) through successive auction openings; superseded
/// when a new rebalance starts or it is explicitly ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rebalance {
    pub nonce: RebalanceNonce,
    pub tokens: Vec<TokenParams>,
    pub limits: RebalanceLimits,
    pub price_control: PriceControl,
    /// End of the launcher-exclusivity window; permissionless opens
    /// are rejected before this.
    pub restricted_until: Timestamp,
    /// Absolute ceiling on when any further auction may open. An
    /// already-open auction may still run past it.
    pub available_until: Timestamp,
}

impl Rebalance {
    /// Parameters for `token`, if it participates in this rebalance.
    pub fn token_params(&self, token: Token) -> Option<&TokenParams> {
        self.tokens.iter().find(|p| p.token == token)
    }

    /// Narrow the basket limits. Fails with `CannotWiden` if the new
    /// range is not contained in the current one.
    pub fn narrow_limits(&mut self, new: RebalanceLimits) -> Result<()> {
        new.validate()?;
        if !new.is_within(&self.limits) {
            return Err(EngineError::CannotWiden);
        }
        self.limits = new;
        Ok(())
    }

    /// Narrow a token's weight range.
    pub fn narrow_weights(&mut self, token: Token, new: WeightRange) -> Result<()> {
        new.validate()?;
        let params = self
            .tokens
            .iter_mut()
            .find(|p| p.token == token)
            .ok_or(EngineError::UnknownToken(token))?;
        if !new.is_within(&params.weights) {
            return Err(EngineError::CannotWiden);
        }
        params.weights = new;
        Ok(())
    }

    /// Narrow a token's price range, subject to the configured trust
    /// level.
    pub fn narrow_prices(&mut self, token: Token, new: PriceRange) -> Result<()> {
        match self.price_control {
            PriceControl::None => return Err(EngineError::NotAuthorized),
            // Pinning an exact price (low == high) needs full trust.
            PriceControl::Partial if new.low == new.high => {
                return Err(EngineError::NotAuthorized);
            }
            PriceControl::Partial | PriceControl::Full => {}
        }
        new.validate()?;
        let params = self
            .tokens
            .iter_mut()
            .find(|p| p.token == token)
            .ok_or(EngineError::UnknownToken(token))?;
        if !new.is_within(&params.prices) {
            return Err(EngineError::CannotWiden);
        }
        params.prices = new;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{D18, D27};

    fn rebalance() -> Rebalance {
        Rebalance {
            nonce: RebalanceNonce(1),
            tokens: vec![TokenParams {
                token: Token::new("USDC"),
                weights: WeightRange {
                    low: 0,
                    spot: D27,
                    high: 2 * D27,
                },
                prices: PriceRange {
                    low: D27 / 2,
                    high: 2 * D27,
                },
            }],
            limits: RebalanceLimits {
                low: D18 / 2,
                spot: D18,
                high: 2 * D18,
            },
            price_control: PriceControl::Partial,
            restricted_until: 3_600,
            available_until: 86_400,
        }
    }

    #[test]
    fn narrow_limits_shrinks_span() {
        let mut r = rebalance();
        let before = r.limits.span();
        r.narrow_limits(RebalanceLimits {
            low: D18,
            spot: D18,
            high: D18,
        })
        .unwrap();
        assert!(r.limits.span() < before);
        assert_eq!(r.limits.span(), 0);
    }

    #[test]
    fn widening_limits_rejected() {
        let mut r = rebalance();
        let err = r.narrow_limits(RebalanceLimits {
            low: D18 / 4,
            spot: D18,
            high: 2 * D18,
        });
        assert_eq!(err, Err(EngineError::CannotWiden));
        // state unchanged
        assert_eq!(r.limits.low, D18 / 2);
    }

    #[test]
    fn widening_weights_rejected() {
        let mut r = rebalance();
        let usdc = Token::new("USDC");
        let err = r.narrow_weights(
            usdc,
            WeightRange {
                low: 0,
                spot: D27,
                high: 3 * D27,
            },
        );
        assert_eq!(err, Err(EngineError::CannotWiden));
    }

    #[test]
    fn price_control_none_blocks_overrides() {
        let mut r = rebalance();
        r.price_control = PriceControl::None;
        let usdc = Token::new("USDC");
        let err = r.narrow_prices(usdc, PriceRange::point(D27));
        assert_eq!(err, Err(EngineError::NotAuthorized));
    }

    #[test]
    fn partial_allows_narrowing_within_range() {
        let mut r = rebalance();
        let usdc = Token::new("USDC");
        let narrower = PriceRange {
            low: D27,
            high: 2 * D27,
        };
        r.narrow_prices(usdc, narrower).unwrap();
        assert_eq!(r.token_params(usdc).unwrap().prices, narrower);
    }

    #[test]
    fn partial_rejects_point_price() {
        let mut r = rebalance();
        let usdc = Token::new("USDC");
        let err = r.narrow_prices(usdc, PriceRange::point(D27));
        assert_eq!(err, Err(EngineError::NotAuthorized));
        // range untouched
        assert_eq!(r.token_params(usdc).unwrap().prices.low, D27 / 2);
    }

    #[test]
    fn full_allows_point_price() {
        let mut r = rebalance();
        r.price_control = PriceControl::Full;
        let usdc = Token::new("USDC");
        r.narrow_prices(usdc, PriceRange::point(D27)).unwrap();
        assert_eq!(r.token_params(usdc).unwrap().prices, PriceRange::point(D27));
    }

    #[test]
    fn unknown_token_rejected() {
        let mut r = rebalance();
        let other = Token::new("WBTC");
        assert_eq!(
            r.narrow_weights(other, WeightRange::point(0)),
            Err(EngineError::UnknownToken(other))
        );
    }
}
