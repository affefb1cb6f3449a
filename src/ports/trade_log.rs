//! Trade Log Port - Audit Trail Interface
//!
//! Defines the trait for recording executed trades. The log is
//! append-only and informational: it is written after the market
//! commit and never consulted by the matcher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Fees, MarketId, OrderId, Outcome};

/// Direction of a logged trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
  /// Bought shares with currency.
  Buy,
  /// Sold shares back for currency.
  Sell,
  /// Added liquidity to the pool.
  Liquidity,
}

/// A single executed trade for persistence and auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
  /// Unique trade identifier.
  pub id: String,
  /// Market this trade belongs to.
  pub market_id: MarketId,
  /// Trader (empty for anonymous sales/liquidity).
  pub user_id: String,
  /// Buy / sell / liquidity.
  pub kind: TradeKind,
  /// Outcome traded.
  pub outcome: Option<Outcome>,
  /// Currency moved (paid for buys, received for sales).
  pub amount: f64,
  /// Shares moved.
  pub shares: f64,
  /// Taker limit, if any.
  pub limit_prob: Option<f64>,
  /// Pool fees charged.
  pub fees: Fees,
  /// YES probability before the trade.
  pub prob_before: f64,
  /// YES probability after the trade.
  pub prob_after: f64,
  /// Resting orders matched.
  pub matched_orders: Vec<OrderId>,
  /// Store version produced by the commit.
  pub version: u64,
  /// Timestamp (Unix ms).
  pub timestamp_ms: i64,
}

/// Trait for trade log providers.
#[async_trait]
pub trait TradeLog: Send + Sync + 'static {
  /// Append a trade record to the log.
  async fn append(&self, record: &TradeRecord) -> anyhow::Result<()>;

  /// Load all trade records (for recovery/analysis).
  async fn load_all(&self) -> anyhow::Result<Vec<TradeRecord>>;

  /// Check if the log is writable.
  async fn is_healthy(&self) -> bool;
}
