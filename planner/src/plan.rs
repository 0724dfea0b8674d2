//! SNAPSHOT→TARGET planning.
//!
//! Computes the auction sequence that moves the basket from its
//! current composition to the target weights, plus the governance
//! parameters (token weights, price ranges, limits) to seed the
//! engine with. Planning runs in f64; fixed-point conversion happens
//! exactly once, at emission.

use dutchbook::{PriceRange, RebalanceLimits, Token, TokenParams, WeightRange, D18, D27};
use log::debug;
use rustc_hash::FxHashMap;

use crate::config::PlannerConfig;
use crate::error::{Error, Result};
use crate::snapshot::Snapshot;

/// One planned auction: sell the surplus token into the deficit one.
#[derive(Debug, Clone)]
pub struct PlannedTrade {
    pub sell: Token,
    pub buy: Token,
    /// Notional to move, in the unit of account.
    pub value: f64,
    /// Spot exchange rate, buy-token per sell-token.
    pub pair_price: f64,
}

/// A complete rebalance plan ready to hand to the engine.
#[derive(Debug, Clone)]
pub struct Plan {
    pub trades: Vec<PlannedTrade>,
    pub tokens: Vec<TokenParams>,
    pub limits: RebalanceLimits,
    pub total_value: f64,
}

/// Compute a rebalance plan for `snapshot`.
///
/// Greedy pairing: repeatedly match the largest surplus against the
/// largest deficit (first listed wins ties) until every residual is
/// inside the tolerance. N assets always settle in at most N-1
/// trades; exceeding that bound means the imbalances do not cancel
/// and the snapshot is inconsistent.
pub fn plan(snapshot: &Snapshot, config: &PlannerConfig) -> Result<Plan> {
    let total = snapshot.total_value();
    if total <= 0.0 {
        return Err(Error::Snapshot("basket holds no value".into()));
    }
    let supply = snapshot.supply as f64;
    let targets: FxHashMap<&str, f64> = snapshot
        .targets
        .iter()
        .map(|t| (t.symbol.as_str(), t.weight))
        .collect();

    // USD imbalance per asset, positive = oversized.
    let mut imbalance: Vec<f64> = snapshot
        .assets
        .iter()
        .map(|a| {
            let weight = targets.get(a.symbol.as_str()).copied().unwrap_or(0.0);
            a.balance as f64 * a.price - weight * total
        })
        .collect();

    let floor = config.tolerance * total;
    let max_trades = snapshot.assets.len() - 1;
    let mut trades = Vec::new();

    loop {
        let (si, surplus) = argmax(&imbalance, |v| v);
        let (bi, deficit) = argmax(&imbalance, |v| -v);
        if surplus <= floor || deficit <= floor {
            break;
        }
        if trades.len() == max_trades {
            return Err(Error::NonConvergence {
                trades: trades.len() + 1,
                max: max_trades,
            });
        }

        let value = surplus.min(deficit);
        let sell = &snapshot.assets[si];
        let buy = &snapshot.assets[bi];
        debug!(
            "trade {}: sell {} -> buy {} ({value:.2} of {total:.2})",
            trades.len() + 1,
            sell.symbol,
            buy.symbol,
        );
        trades.push(PlannedTrade {
            sell: Token::new(&sell.symbol),
            buy: Token::new(&buy.symbol),
            value,
            pair_price: sell.price / buy.price,
        });
        imbalance[si] -= value;
        imbalance[bi] += value;
    }

    Ok(Plan {
        trades,
        tokens: token_params(snapshot, &targets, config, total, supply),
        // One basket unit per share; the per-token weights carry the
        // full target composition.
        limits: RebalanceLimits::point(D18),
        total_value: total,
    })
}

/// Index and value of the maximum of `key(v)`, first index on ties.
fn argmax(values: &[f64], key: impl Fn(f64) -> f64) -> (usize, f64) {
    values
        .iter()
        .copied()
        .map(key)
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| {
            if v > best.1 { (i, v) } else { best }
        })
}

/// Governance parameters per asset: target weight in D27
/// token-per-basket-unit and a price band widened by the asset's
/// uncertainty.
fn token_params(
    snapshot: &Snapshot,
    targets: &FxHashMap<&str, f64>,
    config: &PlannerConfig,
    total: f64,
    supply: f64,
) -> Vec<TokenParams> {
    snapshot
        .assets
        .iter()
        .map(|a| {
            let fraction = targets.get(a.symbol.as_str()).copied().unwrap_or(0.0);
            let weight = fraction * total / (a.price * supply);
            let u = a.uncertainty.unwrap_or(config.default_uncertainty);
            TokenParams {
                token: Token::new(&a.symbol),
                weights: WeightRange::point(to_d27(weight)),
                prices: PriceRange {
                    low: to_d27(a.price * (1.0 - u)).max(1),
                    high: to_d27(a.price * (1.0 + u)).max(1),
                },
            }
        })
        .collect()
}

/// Convert a non-negative f64 to D27 fixed-point, rounding to
/// nearest. The integer part converts exactly; only the fraction
/// goes through floating-point scaling.
pub fn to_d27(x: f64) -> u128 {
    to_fixed(x, D27)
}

fn to_fixed(x: f64, scale: u128) -> u128 {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    let int = x.trunc() as u128;
    let frac = ((x - x.trunc()) * scale as f64).round() as u128;
    int.saturating_mul(scale).saturating_add(frac)
}

impl Plan {
    /// JSON rendering for file output and audit. Fixed-point values
    /// are emitted as strings; u128 does not survive every JSON
    /// consumer.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "total_value": self.total_value,
            "limits": {
                "low": self.limits.low.to_string(),
                "spot": self.limits.spot.to_string(),
                "high": self.limits.high.to_string(),
            },
            "tokens": self.tokens.iter().map(|p| serde_json::json!({
                "symbol": p.token.as_str(),
                "weight": p.weights.spot.to_string(),
                "price_low": p.prices.low.to_string(),
                "price_high": p.prices.high.to_string(),
            })).collect::<Vec<_>>(),
            "trades": self.trades.iter().map(|t| serde_json::json!({
                "sell": t.sell.as_str(),
                "buy": t.buy.as_str(),
                "value": t.value,
                "pair_price": t.pair_price,
            })).collect::<Vec<_>>(),
        })
    }
}
