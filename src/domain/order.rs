//! Order, fill, and trade-result types.
//!
//! A `LimitOrder` rests on the book until its committed `order_amount`
//! has been filled. A `TradeRequest` is the taker's ephemeral intent and
//! a `TradeResult` is what the matcher produces for it. All of these are
//! plain values; the store persists them, the engine never holds them.

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::fees::Fees;
use super::market::{CpmmState, Outcome};
use super::search::floating_equal;

/// Lightweight order identifier used at the ports boundary.
pub type OrderId = String;

/// Lightweight market identifier used at the ports boundary.
pub type MarketId = String;

/// Checks that `prob` lies in the open interval (0, 1).
pub fn validate_limit_prob(prob: f64) -> Result<(), EngineError> {
    if prob > 0.0 && prob < 1.0 {
        Ok(())
    } else {
        Err(EngineError::OutOfRange(prob))
    }
}

/// Checks that `amount` is finite and strictly positive.
pub fn validate_amount(amount: f64) -> Result<(), EngineError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidAmount(amount))
    }
}

// ────────────────────────────────────────────
// Resting orders
// ────────────────────────────────────────────

/// An unfilled (or partially filled) limit order resting on the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrder {
    pub id: OrderId,
    pub user_id: String,
    pub outcome: Outcome,
    /// YES probability at which the order is willing to transact.
    pub limit_prob: f64,
    /// Total amount committed.
    pub order_amount: f64,
    /// Amount filled so far; only ever increases.
    pub amount: f64,
    /// Shares acquired so far.
    pub shares: f64,
    /// Creation time in Unix milliseconds (time priority).
    pub created_time: i64,
    #[serde(default)]
    pub is_filled: bool,
    #[serde(default)]
    pub is_cancelled: bool,
}

impl LimitOrder {
    /// Creates a new unfilled order.
    pub fn new(
        id: impl Into<OrderId>,
        user_id: impl Into<String>,
        outcome: Outcome,
        limit_prob: f64,
        order_amount: f64,
        created_time: i64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            outcome,
            limit_prob,
            order_amount,
            amount: 0.0,
            shares: 0.0,
            created_time,
            is_filled: false,
            is_cancelled: false,
        }
    }

    /// Amount still available to be matched.
    pub fn remaining(&self) -> f64 {
        (self.order_amount - self.amount).max(0.0)
    }

    /// Whether the order can still be matched.
    pub fn is_open(&self) -> bool {
        !self.is_filled && !self.is_cancelled && !floating_equal(self.amount, self.order_amount)
    }

    /// Records a maker fill against this order.
    pub fn apply_fill(&mut self, amount: f64, shares: f64) {
        self.amount = (self.amount + amount).min(self.order_amount);
        self.shares += shares;
        if floating_equal(self.amount, self.order_amount) {
            self.amount = self.order_amount;
            self.is_filled = true;
        }
    }
}

// ────────────────────────────────────────────
// Taker request
// ────────────────────────────────────────────

/// A taker's trade intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub outcome: Outcome,
    /// Currency committed by the taker.
    pub amount: f64,
    /// Worst YES probability the taker accepts; `None` for a market order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_prob: Option<f64>,
}

impl TradeRequest {
    pub fn market(outcome: Outcome, amount: f64) -> Self {
        Self {
            outcome,
            amount,
            limit_prob: None,
        }
    }

    pub fn limit(outcome: Outcome, amount: f64, limit_prob: f64) -> Self {
        Self {
            outcome,
            amount,
            limit_prob: Some(limit_prob),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        validate_amount(self.amount)?;
        if let Some(prob) = self.limit_prob {
            validate_limit_prob(prob)?;
        }
        Ok(())
    }
}

// ────────────────────────────────────────────
// Fills and results
// ────────────────────────────────────────────

/// One taker-side fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    /// Resting order matched, or `None` for a pool fill.
    pub matched_order_id: Option<OrderId>,
    /// Currency paid (negative for sale proceeds).
    pub amount: f64,
    /// Shares received (negative when shares are sold).
    pub shares: f64,
    #[serde(default)]
    pub is_sale: bool,
}

impl Fill {
    pub fn is_pool_fill(&self) -> bool {
        self.matched_order_id.is_none()
    }
}

/// Fill recorded against a resting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakerFill {
    pub order_id: OrderId,
    /// Amount the maker paid at its own limit price.
    pub amount: f64,
    pub shares: f64,
}

/// Outcome of matching one `TradeRequest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    pub outcome: Outcome,
    /// Amount the taker requested.
    pub order_amount: f64,
    /// Amount actually filled.
    pub amount: f64,
    /// Shares acquired by the taker.
    pub shares: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_prob: Option<f64>,
    pub fills: Vec<Fill>,
    pub maker_fills: Vec<MakerFill>,
    /// Fees summed over all pool fills.
    pub fees: Fees,
    /// Pool state after the trade.
    pub state: CpmmState,
    pub prob_before: f64,
    pub prob_after: f64,
    pub is_filled: bool,
}

impl TradeResult {
    pub fn total_fees(&self) -> f64 {
        self.fees.total()
    }

    /// Part of the order left unfilled (a limit order's resting remainder).
    pub fn unfilled_amount(&self) -> f64 {
        if self.is_filled {
            0.0
        } else {
            (self.order_amount - self.amount).max(0.0)
        }
    }

    /// Whether any part of the trade went through the pool.
    pub fn touched_pool(&self) -> bool {
        self.fills.iter().any(Fill::is_pool_fill)
    }
}

/// Outcome of selling shares back into the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResult {
    /// Outcome whose shares were sold.
    pub outcome: Outcome,
    pub shares: f64,
    /// Currency received.
    pub sale_value: f64,
    pub fills: Vec<Fill>,
    pub maker_fills: Vec<MakerFill>,
    pub fees: Fees,
    pub state: CpmmState,
    pub prob_before: f64,
    pub prob_after: f64,
}
