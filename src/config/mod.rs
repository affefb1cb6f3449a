//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Fee rates, retry policy and the initial market set are
//! externalized here - nothing is hardcoded in the domain layer.

pub mod loader;

use serde::Deserialize;

use crate::domain::{CpmmState, FeeSchedule, MarketKind};

/// Top-level configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any market is opened.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Engine identity and logging.
  pub engine: EngineConfig,
  /// Taker fee schedule.
  #[serde(default)]
  pub fees: FeeConfig,
  /// Optimistic retry policy.
  #[serde(default)]
  pub executor: ExecutorConfig,
  /// Persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
  /// Markets seeded into the store at startup.
  #[serde(default)]
  pub markets: Vec<MarketConfig>,
}

/// Engine identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Fee rates applied to pool fills.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
  /// Flat fraction of every bet.
  #[serde(default)]
  pub flat_rate: f64,
  /// Probability-weighted platform fee.
  #[serde(default = "default_platform_rate")]
  pub platform_rate: f64,
  /// Probability-weighted creator fee.
  #[serde(default = "default_creator_rate")]
  pub creator_rate: f64,
  /// Probability-weighted liquidity fee.
  #[serde(default = "default_liquidity_rate")]
  pub liquidity_rate: f64,
}

impl Default for FeeConfig {
  fn default() -> Self {
    Self {
      flat_rate: 0.0,
      platform_rate: default_platform_rate(),
      creator_rate: default_creator_rate(),
      liquidity_rate: default_liquidity_rate(),
    }
  }
}

impl FeeConfig {
  /// Build the domain fee schedule.
  pub fn schedule(&self) -> FeeSchedule {
    FeeSchedule::new(
      self.flat_rate,
      self.platform_rate,
      self.creator_rate,
      self.liquidity_rate,
    )
  }
}

/// Read-compute-write retry policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
  /// Attempts before giving up on a contended market.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Backoff step between attempts (milliseconds, multiplied by attempt).
  #[serde(default = "default_retry_backoff")]
  pub retry_backoff_ms: u64,
}

impl Default for ExecutorConfig {
  fn default() -> Self {
    Self {
      max_retries: default_max_retries(),
      retry_backoff_ms: default_retry_backoff(),
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for JSONL trade logs.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
  /// Whether executed trades are appended to the trade log.
  #[serde(default = "default_true")]
  pub trade_log_enabled: bool,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      trade_log_enabled: true,
    }
  }
}

/// Individual market configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
  /// Market identifier.
  pub id: String,
  /// Market question (informational).
  #[serde(default)]
  pub question: String,
  /// Binary or pseudo-numeric.
  #[serde(default)]
  pub kind: MarketKind,
  /// Initial YES reserve.
  pub pool_yes: f64,
  /// Initial NO reserve.
  pub pool_no: f64,
  /// Initial weight.
  #[serde(default = "default_p")]
  pub p: f64,
}

impl MarketConfig {
  /// Initial pool state for this market.
  pub fn state(&self) -> CpmmState {
    CpmmState::new(self.pool_yes, self.pool_no, self.p)
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_platform_rate() -> f64 {
  0.01
}

fn default_creator_rate() -> f64 {
  0.04
}

fn default_liquidity_rate() -> f64 {
  0.02
}

fn default_max_retries() -> u32 {
  5
}

fn default_retry_backoff() -> u64 {
  10
}

fn default_data_dir() -> String {
  "data".to_string()
}

fn default_p() -> f64 {
  0.5
}
