//! Property-based tests for planner convergence.
//!
//! Across random baskets the greedy pairing must finish within the
//! N-1 trade bound and leave no surplus/deficit pair that still
//! clears the tolerance.

use chrono::Utc;
use dutchbook::Token;
use dutchbook_planner::config::PlannerConfig;
use dutchbook_planner::plan::plan;
use dutchbook_planner::snapshot::{AssetState, Snapshot, TargetWeight};
use proptest::prelude::*;

const TOLERANCE: f64 = 0.001;

fn config() -> PlannerConfig {
    PlannerConfig {
        tolerance: TOLERANCE,
        default_uncertainty: 0.0,
        ..PlannerConfig::default()
    }
}

/// A basket of `n` assets with positive balances and prices, plus a
/// random target composition normalized to sum to 1.
fn basket_strategy(n: usize) -> impl Strategy<Value = Snapshot> {
    let assets = proptest::collection::vec((1u128..=1_000_000_000u128, 0.001f64..100_000.0), n);
    let weights = proptest::collection::vec(0.01f64..1.0, n);
    (assets, weights).prop_map(|(assets, weights)| {
        let sum: f64 = weights.iter().sum();
        Snapshot {
            timestamp: Utc::now(),
            supply: 1_000_000,
            assets: assets
                .iter()
                .enumerate()
                .map(|(i, &(balance, price))| AssetState {
                    symbol: format!("TOK{i}"),
                    balance,
                    price,
                    uncertainty: None,
                })
                .collect(),
            targets: weights
                .iter()
                .enumerate()
                .map(|(i, &w)| TargetWeight {
                    symbol: format!("TOK{i}"),
                    weight: w / sum,
                })
                .collect(),
        }
    })
}

fn sized_basket() -> impl Strategy<Value = (usize, Snapshot)> {
    (2usize..=7).prop_flat_map(|n| (Just(n), basket_strategy(n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// N assets settle in at most N-1 trades, and replaying the
    /// trades over the USD imbalances leaves no tradeable pair: at
    /// least one side of the book is fully inside the tolerance, and
    /// no single token can then sit further out than the other
    /// side's combined slack.
    #[test]
    fn converges_within_trade_bound((n, snapshot) in sized_basket()) {
        let cfg = config();
        let plan = plan(&snapshot, &cfg).unwrap();
        prop_assert!(plan.trades.len() <= n - 1, "{} trades for {n} assets", plan.trades.len());

        let total = snapshot.total_value();
        let mut residual: Vec<f64> = snapshot
            .assets
            .iter()
            .map(|a| {
                let weight = snapshot
                    .targets
                    .iter()
                    .find(|t| t.symbol == a.symbol)
                    .map_or(0.0, |t| t.weight);
                a.balance as f64 * a.price - weight * total
            })
            .collect();

        let index = |token: Token| {
            snapshot
                .assets
                .iter()
                .position(|a| Token::new(&a.symbol) == token)
                .unwrap()
        };
        for t in &plan.trades {
            prop_assert!(t.value > 0.0);
            prop_assert_ne!(t.sell, t.buy);
            residual[index(t.sell)] -= t.value;
            residual[index(t.buy)] += t.value;
        }

        let floor = cfg.tolerance * total;
        let slack = total * 1e-9;
        let max_surplus = residual.iter().fold(0.0f64, |m, &v| m.max(v));
        let max_deficit = residual.iter().fold(0.0f64, |m, &v| m.max(-v));

        // Convergence: no surplus/deficit pair both clear the floor.
        prop_assert!(
            max_surplus <= floor + slack || max_deficit <= floor + slack,
            "tradeable pair left: surplus {max_surplus}, deficit {max_deficit}, floor {floor}"
        );
        // The imbalances sum to zero, so the exhausted side caps every
        // residual at (n-1) tolerances of total value.
        for (i, r) in residual.iter().enumerate() {
            prop_assert!(
                r.abs() <= (n as f64 - 1.0) * floor + slack,
                "asset {i} residual {r} vs floor {floor}"
            );
        }
    }

    /// A basket already at its target plans zero trades.
    #[test]
    fn at_target_plans_nothing((_, snapshot) in sized_basket()) {
        // Rebuild the balances at a fixed large notional so integer
        // truncation (at most one token per asset) stays far below
        // the tolerance floor.
        const TOTAL: f64 = 1e10;
        let weights: Vec<f64> = snapshot
            .assets
            .iter()
            .map(|a| {
                snapshot
                    .targets
                    .iter()
                    .find(|t| t.symbol == a.symbol)
                    .map_or(0.0, |t| t.weight)
            })
            .collect();
        let mut aligned = snapshot;
        for (a, w) in aligned.assets.iter_mut().zip(&weights) {
            a.balance = (w * TOTAL / a.price) as u128;
        }

        let plan = plan(&aligned, &config()).unwrap();
        prop_assert!(plan.trades.is_empty(), "{} trades", plan.trades.len());
    }
}
