//! Range orders: "bet when the probability reaches Low and/or High".
//!
//! A range order is two independent limit orders, YES at the low bound
//! and NO at the high bound. With both bounds the amount is split so
//! each leg buys the same number of shares:
//!
//! ```text
//! shares     = min(amount / low, amount / (1 - high))
//! yes_amount = shares * low
//! no_amount  = shares * (1 - high)
//! ```
//!
//! If both legs fill, one of them pays `shares` whichever way the market
//! resolves, so `shares - (yes_amount + no_amount)` is locked-in profit.

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::fees::FeeSchedule;
use super::market::{CpmmState, Outcome};
use super::matching::match_order;
use super::order::{validate_amount, validate_limit_prob, LimitOrder, TradeRequest, TradeResult};

/// A range order request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeOrder {
    pub amount: f64,
    #[serde(default)]
    pub low_limit_prob: Option<f64>,
    #[serde(default)]
    pub high_limit_prob: Option<f64>,
}

/// The two legs a range order decomposes into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSplit {
    pub shares: f64,
    pub yes_amount: f64,
    pub no_amount: f64,
    pub yes: Option<TradeRequest>,
    pub no: Option<TradeRequest>,
}

impl RangeSplit {
    pub fn is_two_sided(&self) -> bool {
        self.yes.is_some() && self.no.is_some()
    }

    /// Guaranteed profit if both legs fill; `None` for one-sided orders.
    pub fn profit_if_both_filled(&self) -> Option<f64> {
        self.is_two_sided()
            .then(|| self.shares - (self.yes_amount + self.no_amount))
    }
}

/// Preview of both legs matched independently against the same state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangePreview {
    pub split: RangeSplit,
    pub yes: Option<TradeResult>,
    pub no: Option<TradeResult>,
}

impl RangeOrder {
    pub fn new(amount: f64, low_limit_prob: Option<f64>, high_limit_prob: Option<f64>) -> Self {
        Self {
            amount,
            low_limit_prob,
            high_limit_prob,
        }
    }

    /// Validates the bounds and splits the amount across the legs.
    pub fn split(&self) -> Result<RangeSplit, EngineError> {
        validate_amount(self.amount)?;
        if let Some(low) = self.low_limit_prob {
            validate_limit_prob(low)?;
        }
        if let Some(high) = self.high_limit_prob {
            validate_limit_prob(high)?;
        }

        let amount = self.amount;
        let shares = match (self.low_limit_prob, self.high_limit_prob) {
            (Some(low), Some(high)) => {
                if low >= high {
                    return Err(EngineError::InvertedRange { low, high });
                }
                (amount / low).min(amount / (1.0 - high))
            }
            (Some(low), None) => amount / low,
            (None, Some(high)) => amount / (1.0 - high),
            (None, None) => return Err(EngineError::MissingLimit),
        };

        let yes_amount = self.low_limit_prob.map_or(0.0, |low| shares * low);
        let no_amount = self.high_limit_prob.map_or(0.0, |high| shares * (1.0 - high));

        Ok(RangeSplit {
            shares,
            yes_amount,
            no_amount,
            yes: self
                .low_limit_prob
                .map(|low| TradeRequest::limit(Outcome::Yes, yes_amount, low)),
            no: self
                .high_limit_prob
                .map(|high| TradeRequest::limit(Outcome::No, no_amount, high)),
        })
    }

    /// Matches each leg independently against the same starting state.
    pub fn preview(
        &self,
        state: &CpmmState,
        resting: &[LimitOrder],
        schedule: &FeeSchedule,
    ) -> Result<RangePreview, EngineError> {
        let split = self.split()?;
        let yes = split
            .yes
            .as_ref()
            .map(|leg| match_order(leg, state, resting, schedule))
            .transpose()?;
        let no = split
            .no
            .as_ref()
            .map(|leg| match_order(leg, state, resting, schedule))
            .transpose()?;
        Ok(RangePreview { split, yes, no })
    }
}
