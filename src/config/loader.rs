//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::MarketKind;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    markets = config.markets.len(),
    max_fee_fraction = config.fees.schedule().max_fraction(),
    max_retries = config.executor.max_retries,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Fee rates in [0, 1) with a combined maximum below 1
/// - Positive pool reserves and weights in (0, 1)
/// - Unique market ids and sane pseudo-numeric ranges
fn validate_config(config: &AppConfig) -> Result<()> {
  // Fee validation
  let fees = &config.fees;
  for (name, rate) in [
    ("flat_rate", fees.flat_rate),
    ("platform_rate", fees.platform_rate),
    ("creator_rate", fees.creator_rate),
    ("liquidity_rate", fees.liquidity_rate),
  ] {
    anyhow::ensure!(
      (0.0..1.0).contains(&rate),
      "Fee {} must be in [0, 1), got {}",
      name,
      rate
    );
  }
  let max_fraction = fees.schedule().max_fraction();
  anyhow::ensure!(
    max_fraction < 1.0,
    "Combined fee rates must stay below 1, got {}",
    max_fraction
  );

  // Executor validation
  anyhow::ensure!(
    config.executor.max_retries > 0,
    "executor.max_retries must be at least 1"
  );

  // Market validation
  let mut seen = HashSet::new();
  for (i, market) in config.markets.iter().enumerate() {
    anyhow::ensure!(!market.id.is_empty(), "Market {} has empty id", i);
    anyhow::ensure!(
      seen.insert(market.id.as_str()),
      "Duplicate market id: {}",
      market.id
    );
    anyhow::ensure!(
      market.pool_yes > 0.0 && market.pool_no > 0.0,
      "Market {} pool reserves must be positive, got YES={} NO={}",
      market.id,
      market.pool_yes,
      market.pool_no
    );
    anyhow::ensure!(
      market.p > 0.0 && market.p < 1.0,
      "Market {} weight p must be in (0, 1), got {}",
      market.id,
      market.p
    );
    if let MarketKind::PseudoNumeric { min, max, is_log_scale } = market.kind {
      anyhow::ensure!(
        min < max,
        "Market {} needs min < max, got min={} max={}",
        market.id,
        min,
        max
      );
      anyhow::ensure!(
        !is_log_scale || min >= 0.0,
        "Market {} log scale requires min >= 0, got {}",
        market.id,
        min
      );
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const VALID: &str = r#"
[engine]
name = "test"

[fees]
platform_rate = 0.01
creator_rate = 0.04
liquidity_rate = 0.02

[executor]
max_retries = 3

[[markets]]
id = "will-it-rain"
pool_yes = 100.0
pool_no = 100.0

[[markets]]
id = "temperature"
pool_yes = 50.0
pool_no = 80.0
p = 0.4
kind = { type = "pseudo_numeric", min = 0.0, max = 40.0 }
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_parse_valid_config() {
    let config = parse_config(VALID).unwrap();
    assert_eq!(config.engine.log_level, "info");
    assert_eq!(config.executor.max_retries, 3);
    assert_eq!(config.markets.len(), 2);
    assert_eq!(config.markets[0].kind, MarketKind::Binary);
    assert_eq!(config.markets[0].p, 0.5);
    assert!(config.markets[1].kind.is_pseudo_numeric());
    assert!(config.persistence.trade_log_enabled);
  }

  #[test]
  fn test_rejects_duplicate_market_ids() {
    let toml = r#"
[engine]
name = "dup"

[[markets]]
id = "a"
pool_yes = 1.0
pool_no = 1.0

[[markets]]
id = "a"
pool_yes = 1.0
pool_no = 1.0
"#;
    let err = parse_config(toml).unwrap_err();
    assert!(err.to_string().contains("Duplicate market id"));
  }

  #[test]
  fn test_rejects_excessive_fees() {
    let toml = r#"
[engine]
name = "greedy"

[fees]
flat_rate = 0.5
platform_rate = 0.5
creator_rate = 0.0
liquidity_rate = 0.0
"#;
    assert!(parse_config(toml).is_err());
  }

  #[test]
  fn test_rejects_boundary_weight() {
    let toml = r#"
[engine]
name = "bad-p"

[[markets]]
id = "m"
pool_yes = 10.0
pool_no = 10.0
p = 1.0
"#;
    let err = parse_config(toml).unwrap_err();
    assert!(err.to_string().contains("weight p"));
  }
}
