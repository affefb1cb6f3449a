//! Market Store Port - Versioned Market State Interface
//!
//! Defines the trait the executor uses to read a consistent market
//! snapshot (pool + resting orders) and to commit a trade's effects as a
//! single atomic write.
//!
//! Key design decisions:
//! - Optimistic concurrency: every snapshot carries a version, and a
//!   commit only succeeds if the stored version still matches
//! - Pool replacement, maker-fill increments and the new taker order are
//!   applied together or not at all

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CpmmState, LimitOrder, MakerFill, MarketId, MarketKind};

/// A consistent read of one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
  /// Market identifier.
  pub market_id: MarketId,
  /// Binary or pseudo-numeric presentation.
  pub kind: MarketKind,
  /// Current pool state.
  pub state: CpmmState,
  /// All orders on the book (open and closed).
  pub orders: Vec<LimitOrder>,
  /// Version observed by this read.
  pub version: u64,
}

impl MarketSnapshot {
  /// Orders still eligible for matching.
  pub fn open_orders(&self) -> Vec<LimitOrder> {
    self.orders.iter().filter(|o| o.is_open()).cloned().collect()
  }
}

/// Everything one trade changes, applied atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeCommit {
  /// Market being written.
  pub market_id: MarketId,
  /// Version the trade was computed against.
  pub expected_version: u64,
  /// Replacement pool state.
  pub state: CpmmState,
  /// Increments to apply to resting orders.
  pub maker_fills: Vec<MakerFill>,
  /// Taker's own order, if it should be recorded on the book.
  pub new_order: Option<LimitOrder>,
}

/// Errors owned by the store, distinct from engine errors.
#[derive(Debug, Error)]
pub enum StoreError {
  /// Another trade committed between our read and our write.
  #[error("version conflict on market {market_id}: expected {expected}, found {actual}")]
  Conflict {
    /// Market being written.
    market_id: MarketId,
    /// Version the write was based on.
    expected: u64,
    /// Version currently stored.
    actual: u64,
  },
  /// No market with this identifier.
  #[error("market not found: {0}")]
  MarketNotFound(MarketId),
  /// Maker fill references an order the market does not hold.
  #[error("order {order_id} not found on market {market_id}")]
  OrderNotFound {
    /// Market being written.
    market_id: MarketId,
    /// Missing order.
    order_id: String,
  },
  /// Underlying storage failure.
  #[error(transparent)]
  Backend(#[from] anyhow::Error),
}

impl StoreError {
  /// Whether re-reading and recomputing may succeed.
  pub fn is_conflict(&self) -> bool {
    matches!(self, Self::Conflict { .. })
  }
}

/// Trait for market state providers.
///
/// Implementations must guarantee that two concurrent commits based on
/// the same version cannot both succeed.
#[async_trait]
pub trait MarketStore: Send + Sync + 'static {
  /// Read the current snapshot of a market.
  async fn load(&self, market_id: &str) -> Result<MarketSnapshot, StoreError>;

  /// Apply a trade atomically; returns the new version.
  async fn commit(&self, commit: &TradeCommit) -> Result<u64, StoreError>;

  /// Check if the store is reachable.
  async fn is_healthy(&self) -> bool;
}
