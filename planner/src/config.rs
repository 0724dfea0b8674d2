//! TOML configuration loading and validation.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub planner: PlannerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Residual value below this fraction of the basket is treated
    /// as balanced and left alone.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Price uncertainty applied to assets that do not carry their
    /// own estimate.
    #[serde(default = "default_uncertainty")]
    pub default_uncertainty: f64,
    #[serde(default = "default_auction_length")]
    pub auction_length_secs: u64,
    #[serde(default = "default_exclusivity")]
    pub exclusivity_secs: u64,
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

fn default_tolerance() -> f64 {
    0.001
}
fn default_uncertainty() -> f64 {
    0.01
}
fn default_auction_length() -> u64 {
    600
}
fn default_exclusivity() -> u64 {
    3_600
}
fn default_ttl() -> u64 {
    86_400
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            default_uncertainty: default_uncertainty(),
            auction_length_secs: default_auction_length(),
            exclusivity_secs: default_exclusivity(),
            ttl_secs: default_ttl(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        let p = &self.planner;
        if !p.tolerance.is_finite() || !(0.0..1.0).contains(&p.tolerance) {
            return Err(Error::Config("tolerance must be in [0.0, 1.0)".into()));
        }
        if !p.default_uncertainty.is_finite() || !(0.0..=0.9).contains(&p.default_uncertainty) {
            return Err(Error::Config(
                "default_uncertainty must be in [0.0, 0.9]".into(),
            ));
        }
        if p.auction_length_secs == 0 {
            return Err(Error::Config("auction_length_secs must be > 0".into()));
        }
        if p.ttl_secs < p.exclusivity_secs + dutchbook::RESTRICTED_AUCTION_BUFFER {
            return Err(Error::Config(
                "ttl_secs must cover exclusivity_secs plus the quiet-period buffer".into(),
            ));
        }
        Ok(())
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> std::path::PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[planner]
tolerance = 0.001
default_uncertainty = 0.01
auction_length_secs = 600
exclusivity_secs = 3600
ttl_secs = 86400

[logging]
dir = "./logs"
audit_file = "audit.jsonl"
"#
    }

    #[test]
    fn parse_example_config() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        assert_eq!(config.planner.tolerance, 0.001);
        assert_eq!(config.planner.auction_length_secs, 600);
        assert_eq!(config.logging.audit_file, "audit.jsonl");
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let config: Config = toml::from_str("[planner]\n").unwrap();
        assert_eq!(config.planner.tolerance, 0.001);
        assert_eq!(config.planner.ttl_secs, 86_400);
        assert_eq!(config.logging.dir, "./logs");
    }

    #[test]
    fn validate_catches_bad_tolerance() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.planner.tolerance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_short_ttl() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.planner.ttl_secs = config.planner.exclusivity_secs;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_zero_auction_length() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.planner.auction_length_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn audit_path() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        assert_eq!(
            config.audit_path(),
            std::path::PathBuf::from("./logs/audit.jsonl")
        );
    }
}
