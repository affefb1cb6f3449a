//! Trade Executor - Optimistic Read-Compute-Write Loop
//!
//! Runs every market-mutating operation as:
//! 1. Load a versioned snapshot from the `MarketStore`
//! 2. Compute the trade with the pure domain engine
//! 3. Commit pool + maker fills + taker order against that version
//! 4. On a version conflict, back off and start again from step 1
//!
//! Previews run steps 1-2 only, with the exact same engine call, so the
//! numbers shown before a trade match what execution produces.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::ExecutorConfig;
use crate::domain::{
    calculate_sale, match_order, resolve_sell_quantity, EngineError, FeeSchedule, Fees,
    LimitOrder, LiquidityChange, MarketId, MarketKind, OrderId, Outcome, RangeOrder,
    RangePreview, SaleResult, TradeRequest, TradeResult,
};
use crate::ports::market_store::{MarketSnapshot, MarketStore, StoreError, TradeCommit};
use crate::ports::trade_log::{TradeKind, TradeLog, TradeRecord};

/// Errors surfaced by the executor.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Rejected by the engine (bad input or corrupt market state).
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Store failure other than a retryable conflict.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Every attempt lost the race to a concurrent writer.
    #[error("gave up on market {market_id} after {attempts} conflicting attempts")]
    RetriesExhausted { market_id: MarketId, attempts: u32 },
}

/// Current price of a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub market_id: MarketId,
    pub kind: MarketKind,
    pub probability: f64,
    /// Probability mapped to the market's display value.
    pub value: f64,
    pub open_orders: usize,
    pub version: u64,
}

/// A committed buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedTrade {
    pub trade_id: String,
    pub market_id: MarketId,
    /// Id of the taker's resting order (limit orders only).
    pub order_id: Option<OrderId>,
    pub result: TradeResult,
    pub version: u64,
}

/// A committed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedSale {
    pub trade_id: String,
    pub market_id: MarketId,
    pub result: SaleResult,
    pub version: u64,
}

/// A committed liquidity deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityProvided {
    pub trade_id: String,
    pub market_id: MarketId,
    pub amount: f64,
    pub change: LiquidityChange,
    pub version: u64,
}

/// Executes trades against a `MarketStore` with optimistic retries.
pub struct TradeExecutor<S: MarketStore> {
    /// Market state port.
    store: Arc<S>,
    /// Taker fee schedule.
    fees: FeeSchedule,
    /// Attempts per operation.
    max_retries: u32,
    /// Backoff step, multiplied by the attempt number.
    retry_backoff: Duration,
    /// Optional audit log.
    trade_log: Option<Arc<dyn TradeLog>>,
}

impl<S: MarketStore> TradeExecutor<S> {
    /// Create an executor over `store`.
    pub fn new(store: Arc<S>, fees: FeeSchedule, config: &ExecutorConfig) -> Self {
        Self {
            store,
            fees,
            max_retries: config.max_retries.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            trade_log: None,
        }
    }

    /// Attach an audit log written after every commit.
    pub fn with_trade_log(mut self, trade_log: Arc<dyn TradeLog>) -> Self {
        self.trade_log = Some(trade_log);
        self
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Current probability and display value of a market.
    pub async fn quote(&self, market_id: &str) -> Result<MarketQuote, ExecutorError> {
        let snapshot = self.store.load(market_id).await?;
        snapshot.state.validate()?;
        let probability = snapshot.state.probability();
        Ok(MarketQuote {
            market_id: snapshot.market_id.clone(),
            kind: snapshot.kind,
            probability,
            value: snapshot.kind.prob_to_value(probability),
            open_orders: snapshot.open_orders().len(),
            version: snapshot.version,
        })
    }

    /// Compute a bet without committing it.
    pub async fn preview_bet(
        &self,
        market_id: &str,
        request: &TradeRequest,
    ) -> Result<TradeResult, ExecutorError> {
        let snapshot = self.store.load(market_id).await?;
        Ok(match_order(
            request,
            &snapshot.state,
            &snapshot.open_orders(),
            &self.fees,
        )?)
    }

    /// Compute a sale without committing it.
    pub async fn preview_sale(
        &self,
        market_id: &str,
        outcome: Outcome,
        requested: f64,
        owned: f64,
    ) -> Result<SaleResult, ExecutorError> {
        let quantity = resolve_sell_quantity(requested, owned)?;
        let snapshot = self.store.load(market_id).await?;
        Ok(calculate_sale(
            &snapshot.state,
            quantity,
            outcome,
            &snapshot.open_orders(),
            &self.fees,
        )?)
    }

    /// Match both legs of a range order against the current book
    /// without committing.
    pub async fn preview_range(
        &self,
        market_id: &str,
        range: &RangeOrder,
    ) -> Result<RangePreview, ExecutorError> {
        let snapshot = self.store.load(market_id).await?;
        Ok(range.preview(&snapshot.state, &snapshot.open_orders(), &self.fees)?)
    }

    /// Match and commit a bet. A limit order's unfilled remainder is
    /// recorded on the book as a new resting order.
    #[instrument(
        skip(self, request),
        fields(market = %market_id, outcome = %request.outcome, amount = request.amount)
    )]
    pub async fn place_bet(
        &self,
        market_id: &str,
        user_id: &str,
        request: &TradeRequest,
    ) -> Result<ExecutedTrade, ExecutorError> {
        request.validate()?;

        // Stable across retries.
        let trade_id = Uuid::new_v4().to_string();
        let order_id = request.limit_prob.map(|_| Uuid::new_v4().to_string());
        let created_time = Utc::now().timestamp_millis();

        let (result, version) = self
            .with_retry(market_id, |snapshot| {
                let result = match_order(
                    request,
                    &snapshot.state,
                    &snapshot.open_orders(),
                    &self.fees,
                )?;
                let new_order = match (&order_id, request.limit_prob) {
                    (Some(id), Some(limit_prob)) => Some(LimitOrder {
                        id: id.clone(),
                        user_id: user_id.to_string(),
                        outcome: request.outcome,
                        limit_prob,
                        order_amount: request.amount,
                        amount: result.amount,
                        shares: result.shares,
                        created_time,
                        is_filled: result.is_filled,
                        is_cancelled: false,
                    }),
                    _ => None,
                };
                let commit = TradeCommit {
                    market_id: snapshot.market_id.clone(),
                    expected_version: snapshot.version,
                    state: result.state,
                    maker_fills: result.maker_fills.clone(),
                    new_order,
                };
                Ok((commit, result))
            })
            .await?;

        info!(
            trade_id = %trade_id,
            filled = result.amount,
            shares = result.shares,
            fees = result.total_fees(),
            prob_after = result.prob_after,
            version,
            "Bet committed"
        );

        self.log_trade(TradeRecord {
            id: trade_id.clone(),
            market_id: market_id.to_string(),
            user_id: user_id.to_string(),
            kind: TradeKind::Buy,
            outcome: Some(result.outcome),
            amount: result.amount,
            shares: result.shares,
            limit_prob: result.limit_prob,
            fees: result.fees,
            prob_before: result.prob_before,
            prob_after: result.prob_after,
            matched_orders: result
                .maker_fills
                .iter()
                .map(|m| m.order_id.clone())
                .collect(),
            version,
            timestamp_ms: created_time,
        })
        .await;

        Ok(ExecutedTrade {
            trade_id,
            market_id: market_id.to_string(),
            order_id,
            result,
            version,
        })
    }

    /// Validate a range order and place each leg as its own limit order.
    ///
    /// Validation happens up front, so an inverted or out-of-range request
    /// never reaches the store.
    #[instrument(skip(self, range), fields(market = %market_id, amount = range.amount))]
    pub async fn place_range_order(
        &self,
        market_id: &str,
        user_id: &str,
        range: &RangeOrder,
    ) -> Result<Vec<ExecutedTrade>, ExecutorError> {
        let split = range.split()?;
        debug!(
            shares = split.shares,
            yes_amount = split.yes_amount,
            no_amount = split.no_amount,
            "Range order split"
        );

        let mut executed = Vec::with_capacity(2);
        for leg in [split.yes, split.no].into_iter().flatten() {
            executed.push(self.place_bet(market_id, user_id, &leg).await?);
        }
        Ok(executed)
    }

    /// Sell shares back into the market.
    ///
    /// `owned` is the seller's current balance of `outcome` shares; a
    /// request for exactly `floor(owned)` sells the full balance.
    #[instrument(skip(self), fields(market = %market_id))]
    pub async fn sell_shares(
        &self,
        market_id: &str,
        user_id: &str,
        outcome: Outcome,
        requested: f64,
        owned: f64,
    ) -> Result<ExecutedSale, ExecutorError> {
        let quantity = resolve_sell_quantity(requested, owned)?;
        let trade_id = Uuid::new_v4().to_string();

        let (result, version) = self
            .with_retry(market_id, |snapshot| {
                let sale = calculate_sale(
                    &snapshot.state,
                    quantity,
                    outcome,
                    &snapshot.open_orders(),
                    &self.fees,
                )?;
                let commit = TradeCommit {
                    market_id: snapshot.market_id.clone(),
                    expected_version: snapshot.version,
                    state: sale.state,
                    maker_fills: sale.maker_fills.clone(),
                    new_order: None,
                };
                Ok((commit, sale))
            })
            .await?;

        info!(
            trade_id = %trade_id,
            shares = quantity,
            sale_value = result.sale_value,
            prob_after = result.prob_after,
            version,
            "Sale committed"
        );

        self.log_trade(TradeRecord {
            id: trade_id.clone(),
            market_id: market_id.to_string(),
            user_id: user_id.to_string(),
            kind: TradeKind::Sell,
            outcome: Some(outcome),
            amount: result.sale_value,
            shares: quantity,
            limit_prob: None,
            fees: result.fees,
            prob_before: result.prob_before,
            prob_after: result.prob_after,
            matched_orders: result
                .maker_fills
                .iter()
                .map(|m| m.order_id.clone())
                .collect(),
            version,
            timestamp_ms: Utc::now().timestamp_millis(),
        })
        .await;

        Ok(ExecutedSale {
            trade_id,
            market_id: market_id.to_string(),
            result,
            version,
        })
    }

    /// Deposit liquidity without moving the probability.
    #[instrument(skip(self), fields(market = %market_id))]
    pub async fn add_liquidity(
        &self,
        market_id: &str,
        user_id: &str,
        amount: f64,
    ) -> Result<LiquidityProvided, ExecutorError> {
        let trade_id = Uuid::new_v4().to_string();

        let (change, version) = self
            .with_retry(market_id, |snapshot| {
                let change = snapshot.state.add_liquidity(amount)?;
                let commit = TradeCommit {
                    market_id: snapshot.market_id.clone(),
                    expected_version: snapshot.version,
                    state: change.state,
                    maker_fills: Vec::new(),
                    new_order: None,
                };
                Ok((commit, change))
            })
            .await?;

        let probability = change.state.probability();
        info!(trade_id = %trade_id, amount, liquidity = change.liquidity, version, "Liquidity added");

        self.log_trade(TradeRecord {
            id: trade_id.clone(),
            market_id: market_id.to_string(),
            user_id: user_id.to_string(),
            kind: TradeKind::Liquidity,
            outcome: None,
            amount,
            shares: 0.0,
            limit_prob: None,
            fees: Fees::ZERO,
            prob_before: probability,
            prob_after: probability,
            matched_orders: Vec::new(),
            version,
            timestamp_ms: Utc::now().timestamp_millis(),
        })
        .await;

        Ok(LiquidityProvided {
            trade_id,
            market_id: market_id.to_string(),
            amount,
            change,
            version,
        })
    }

    /// Load, compute, commit; retry the whole cycle on version conflicts.
    async fn with_retry<T>(
        &self,
        market_id: &str,
        mut compute: impl FnMut(&MarketSnapshot) -> Result<(TradeCommit, T), EngineError>,
    ) -> Result<(T, u64), ExecutorError> {
        for attempt in 1..=self.max_retries {
            let snapshot = self.store.load(market_id).await?;
            let (commit, output) = compute(&snapshot)?;

            match self.store.commit(&commit).await {
                Ok(version) => return Ok((output, version)),
                Err(e) if e.is_conflict() => {
                    warn!(
                        market = %market_id,
                        attempt,
                        max = self.max_retries,
                        error = %e,
                        "Commit conflict, retrying"
                    );
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_backoff * attempt).await;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ExecutorError::RetriesExhausted {
            market_id: market_id.to_string(),
            attempts: self.max_retries,
        })
    }

    async fn log_trade(&self, record: TradeRecord) {
        let Some(log) = &self.trade_log else {
            return;
        };
        // The trade is already committed; a log failure must not undo it.
        if let Err(e) = log.append(&record).await {
            warn!(trade_id = %record.id, error = %e, "Failed to append trade log");
        }
    }
}
