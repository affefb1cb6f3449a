//! In-Memory Market Store - Versioned MarketStore Adapter
//!
//! Holds every market behind a single `tokio::sync::RwLock`. Reads clone
//! a snapshot; commits take the write lock, compare versions, and apply
//! the pool replacement, maker increments and new order together.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::MarketConfig;
use crate::domain::{CpmmState, LimitOrder, MarketKind};
use crate::ports::market_store::{MarketSnapshot, MarketStore, StoreError, TradeCommit};

/// Stored state of one market.
#[derive(Debug, Clone)]
struct MarketEntry {
    kind: MarketKind,
    state: CpmmState,
    orders: Vec<LimitOrder>,
    version: u64,
}

/// Process-local market store with optimistic version checks.
#[derive(Debug, Default)]
pub struct InMemoryMarketStore {
    markets: RwLock<HashMap<String, MarketEntry>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from configured markets.
    pub async fn from_config(markets: &[MarketConfig]) -> Self {
        let store = Self::new();
        for market in markets {
            store
                .insert_market(&market.id, market.kind, market.state())
                .await;
        }
        info!(markets = markets.len(), "Market store seeded");
        store
    }

    /// Create (or replace) a market at version 0.
    pub async fn insert_market(&self, market_id: &str, kind: MarketKind, state: CpmmState) {
        self.markets.write().await.insert(
            market_id.to_string(),
            MarketEntry {
                kind,
                state,
                orders: Vec::new(),
                version: 0,
            },
        );
    }

    /// Place a resting order directly on the book, bumping the version.
    pub async fn add_order(&self, market_id: &str, order: LimitOrder) -> Result<u64, StoreError> {
        let mut markets = self.markets.write().await;
        let entry = markets
            .get_mut(market_id)
            .ok_or_else(|| StoreError::MarketNotFound(market_id.to_string()))?;
        entry.orders.push(order);
        entry.version += 1;
        Ok(entry.version)
    }

    /// Market ids currently held.
    pub async fn market_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.markets.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl MarketStore for InMemoryMarketStore {
    async fn load(&self, market_id: &str) -> Result<MarketSnapshot, StoreError> {
        let markets = self.markets.read().await;
        let entry = markets
            .get(market_id)
            .ok_or_else(|| StoreError::MarketNotFound(market_id.to_string()))?;
        Ok(MarketSnapshot {
            market_id: market_id.to_string(),
            kind: entry.kind,
            state: entry.state,
            orders: entry.orders.clone(),
            version: entry.version,
        })
    }

    #[instrument(skip(self, commit), fields(market = %commit.market_id, expected = commit.expected_version))]
    async fn commit(&self, commit: &TradeCommit) -> Result<u64, StoreError> {
        let mut markets = self.markets.write().await;
        let entry = markets
            .get_mut(&commit.market_id)
            .ok_or_else(|| StoreError::MarketNotFound(commit.market_id.clone()))?;

        if entry.version != commit.expected_version {
            warn!(actual = entry.version, "Stale commit rejected");
            return Err(StoreError::Conflict {
                market_id: commit.market_id.clone(),
                expected: commit.expected_version,
                actual: entry.version,
            });
        }

        // Validate every increment before touching anything.
        for fill in &commit.maker_fills {
            if !entry.orders.iter().any(|o| o.id == fill.order_id) {
                return Err(StoreError::OrderNotFound {
                    market_id: commit.market_id.clone(),
                    order_id: fill.order_id.clone(),
                });
            }
        }

        for fill in &commit.maker_fills {
            if let Some(order) = entry.orders.iter_mut().find(|o| o.id == fill.order_id) {
                order.apply_fill(fill.amount, fill.shares);
            }
        }
        if let Some(order) = &commit.new_order {
            entry.orders.push(order.clone());
        }
        entry.state = commit.state;
        entry.version += 1;

        debug!(
            version = entry.version,
            maker_fills = commit.maker_fills.len(),
            "Commit applied"
        );
        Ok(entry.version)
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
