//! Basket snapshot (snapshot.json) loading and validation.
//!
//! A snapshot captures what the basket holds right now and what
//! governance wants it to hold: per-token balances and market prices
//! on one side, target weights on the other. Assets carried but not
//! listed in `targets` are sold out entirely.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};

/// A point-in-time view of the basket plus its target composition.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    /// Total share supply backing the basket.
    pub supply: u128,
    pub assets: Vec<AssetState>,
    pub targets: Vec<TargetWeight>,
}

/// One held (or about-to-be-held) token.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetState {
    pub symbol: String,
    /// Raw token balance currently in the basket.
    pub balance: u128,
    /// Market price in the unit of account.
    pub price: f64,
    /// Relative price uncertainty, e.g. 0.01 for ±1%. Falls back to
    /// the configured default when omitted.
    #[serde(default)]
    pub uncertainty: Option<f64>,
}

/// A single target: symbol + fraction of basket value.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetWeight {
    pub symbol: String,
    pub weight: f64,
}

impl Snapshot {
    /// Load and validate a snapshot.json file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::SnapshotRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Validate the snapshot.
    fn validate(&self) -> Result<()> {
        if self.supply == 0 {
            return Err(Error::Snapshot("share supply is zero".into()));
        }
        if self.assets.is_empty() {
            return Err(Error::Snapshot("assets list is empty".into()));
        }
        if self.targets.is_empty() {
            return Err(Error::Snapshot("targets list is empty".into()));
        }

        // Check for duplicate symbols
        let mut seen = std::collections::HashSet::new();
        for a in &self.assets {
            if !seen.insert(&a.symbol) {
                return Err(Error::Snapshot(format!("duplicate asset: {}", a.symbol)));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for t in &self.targets {
            if !seen.insert(&t.symbol) {
                return Err(Error::Snapshot(format!("duplicate target: {}", t.symbol)));
            }
        }

        // Validate each symbol fits the engine's Token (max 8 bytes)
        for symbol in self
            .assets
            .iter()
            .map(|a| &a.symbol)
            .chain(self.targets.iter().map(|t| &t.symbol))
        {
            if symbol.is_empty() {
                return Err(Error::Snapshot("empty symbol".into()));
            }
            if symbol.len() > 8 {
                return Err(Error::Snapshot(format!("symbol '{symbol}' exceeds 8 bytes")));
            }
        }

        // Every target must have a priced asset entry, even at zero
        // balance, or the engine cannot open an auction into it.
        for t in &self.targets {
            if !self.assets.iter().any(|a| a.symbol == t.symbol) {
                return Err(Error::Snapshot(format!(
                    "target '{}' has no asset entry",
                    t.symbol
                )));
            }
        }

        for a in &self.assets {
            if !a.price.is_finite() || a.price <= 0.0 {
                return Err(Error::Snapshot(format!(
                    "price for {} ({}) must be finite and positive",
                    a.symbol, a.price
                )));
            }
            if let Some(u) = a.uncertainty {
                if !u.is_finite() || !(0.0..=0.9).contains(&u) {
                    return Err(Error::Snapshot(format!(
                        "uncertainty for {} ({u}) must be in [0.0, 0.9]",
                        a.symbol
                    )));
                }
            }
        }

        for t in &self.targets {
            if !t.weight.is_finite() || t.weight <= 0.0 || t.weight > 1.0 {
                return Err(Error::Snapshot(format!(
                    "weight for {} ({}) must be in (0.0, 1.0] — omit to sell out",
                    t.symbol, t.weight
                )));
            }
        }

        let sum: f64 = self.targets.iter().map(|t| t.weight).sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::Snapshot(format!(
                "target weights sum to {sum:.6} (expected 1.0)"
            )));
        }

        Ok(())
    }

    /// Total basket value in the unit of account.
    pub fn total_value(&self) -> f64 {
        self.assets
            .iter()
            .map(|a| a.balance as f64 * a.price)
            .sum()
    }

    /// Target weight for `symbol`; zero when absent from targets.
    pub fn target_weight(&self, symbol: &str) -> f64 {
        self.targets
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.weight)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> &'static str {
        r#"{
            "timestamp": "2026-08-30T12:00:00Z",
            "supply": 1000000,
            "assets": [
                { "symbol": "USDC", "balance": 1000000, "price": 1.0 },
                { "symbol": "WETH", "balance": 0, "price": 2000.0, "uncertainty": 0.01 }
            ],
            "targets": [
                { "symbol": "WETH", "weight": 1.0 }
            ]
        }"#
    }

    #[test]
    fn parse_valid_snapshot() {
        let s = Snapshot::from_json(valid_json()).unwrap();
        assert_eq!(s.supply, 1_000_000);
        assert_eq!(s.assets.len(), 2);
        assert_eq!(s.assets[1].uncertainty, Some(0.01));
        assert_eq!(s.targets[0].weight, 1.0);
    }

    #[test]
    fn total_value_sums_assets() {
        let s = Snapshot::from_json(valid_json()).unwrap();
        assert_eq!(s.total_value(), 1_000_000.0);
    }

    #[test]
    fn target_weight_defaults_to_zero() {
        let s = Snapshot::from_json(valid_json()).unwrap();
        assert_eq!(s.target_weight("WETH"), 1.0);
        assert_eq!(s.target_weight("USDC"), 0.0);
    }

    #[test]
    fn reject_zero_supply() {
        let json = valid_json().replace("\"supply\": 1000000", "\"supply\": 0");
        assert!(Snapshot::from_json(&json).is_err());
    }

    #[test]
    fn reject_duplicate_assets() {
        let json = r#"{
            "timestamp": "2026-01-01T00:00:00Z",
            "supply": 1,
            "assets": [
                { "symbol": "USDC", "balance": 1, "price": 1.0 },
                { "symbol": "USDC", "balance": 2, "price": 1.0 }
            ],
            "targets": [ { "symbol": "USDC", "weight": 1.0 } ]
        }"#;
        assert!(Snapshot::from_json(json).is_err());
    }

    #[test]
    fn reject_target_without_asset() {
        let json = r#"{
            "timestamp": "2026-01-01T00:00:00Z",
            "supply": 1,
            "assets": [ { "symbol": "USDC", "balance": 1, "price": 1.0 } ],
            "targets": [ { "symbol": "WETH", "weight": 1.0 } ]
        }"#;
        assert!(Snapshot::from_json(json).is_err());
    }

    #[test]
    fn reject_long_symbol() {
        let json = valid_json().replace("WETH", "TOOLONGNAME");
        assert!(Snapshot::from_json(&json).is_err());
    }

    #[test]
    fn reject_negative_price() {
        let json = valid_json().replace("\"price\": 2000.0", "\"price\": -1.0");
        assert!(Snapshot::from_json(&json).is_err());
    }

    #[test]
    fn reject_weights_not_summing_to_one() {
        let json = valid_json().replace("\"weight\": 1.0", "\"weight\": 0.5");
        assert!(Snapshot::from_json(&json).is_err());
    }

    #[test]
    fn reject_zero_weight() {
        let json = r#"{
            "timestamp": "2026-01-01T00:00:00Z",
            "supply": 1,
            "assets": [ { "symbol": "USDC", "balance": 1, "price": 1.0 } ],
            "targets": [ { "symbol": "USDC", "weight": 0.0 } ]
        }"#;
        assert!(Snapshot::from_json(json).is_err());
    }

    #[test]
    fn reject_oversized_uncertainty() {
        let json = valid_json().replace("\"uncertainty\": 0.01", "\"uncertainty\": 0.95");
        assert!(Snapshot::from_json(&json).is_err());
    }
}
