//! Bet Preview - Display Stats for a Pending Trade
//!
//! Turns a matcher result into the numbers a trader sees before
//! confirming: payout if the bought outcome wins, return on the stake,
//! fees, and whether the displayed probability moves at all.
//! Rounding goes through `rust_decimal` so display values are exact.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::{MarketKind, Outcome, TradeRequest, TradeResult};

/// View-model for one previewed bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetStats {
    pub outcome: Outcome,
    /// Amount staked.
    pub amount: f64,
    /// Currency received if `outcome` wins (one unit per share).
    pub payout: f64,
    /// `(payout - amount) / amount`.
    pub return_fraction: f64,
    pub total_fees: f64,
    pub prob_before: f64,
    pub prob_after: f64,
    /// True when the rounded percentage does not change.
    pub prob_stayed_same: bool,
}

impl BetStats {
    /// Stats for a matched (or previewed) trade.
    pub fn from_trade(result: &TradeResult) -> Self {
        let amount = result.order_amount;
        Self {
            outcome: result.outcome,
            amount,
            payout: result.shares,
            return_fraction: return_fraction(result.shares, amount),
            total_fees: result.total_fees(),
            prob_before: result.prob_before,
            prob_after: result.prob_after,
            prob_stayed_same: format_percent(result.prob_after)
                == format_percent(result.prob_before),
        }
    }

    /// Stats for a limit order assumed to fill entirely at its limit.
    ///
    /// Returns `None` for market orders.
    pub fn at_limit(request: &TradeRequest, prob_now: f64) -> Option<Self> {
        let limit = request.limit_prob?;
        let price = request.outcome.prob_of(limit);
        let payout = request.amount / price;
        Some(Self {
            outcome: request.outcome,
            amount: request.amount,
            payout,
            return_fraction: return_fraction(payout, request.amount),
            total_fees: 0.0,
            prob_before: prob_now,
            prob_after: prob_now,
            prob_stayed_same: true,
        })
    }

    pub fn payout_display(&self) -> String {
        format_money(self.payout)
    }

    pub fn return_display(&self) -> String {
        format_percent(self.return_fraction)
    }

    pub fn fees_display(&self) -> String {
        format_money_with_decimals(self.total_fees)
    }
}

fn return_fraction(payout: f64, amount: f64) -> f64 {
    if amount > 0.0 {
        (payout - amount) / amount
    } else {
        0.0
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Whole currency units, floored and grouped by thousands. Anything that
/// rounds to zero shows `M$0`.
pub fn format_money(amount: f64) -> String {
    let value = to_decimal(amount);
    let shown = if value.round().is_zero() {
        Decimal::ZERO
    } else {
        value.floor()
    };
    format!("M${}", group_thousands(&shown.to_string()))
}

/// Inserts `,` every three digits of a whole-number string.
fn group_thousands(whole: &str) -> String {
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

/// Currency with two decimal places.
pub fn format_money_with_decimals(amount: f64) -> String {
    let value = to_decimal(amount).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("M${value:.2}")
}

/// Percentage of a fraction; one decimal below 2% or above 98% (which
/// includes losses and returns past 98%), else whole.
pub fn format_percent(fraction: f64) -> String {
    let near_edge = fraction < 0.02 || fraction > 0.98;
    let dp = u32::from(near_edge);
    let percent = (to_decimal(fraction) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{percent:.prec$}%", prec = dp as usize)
}

/// Display value of a probability for the given market kind.
pub fn format_mapped_value(kind: &MarketKind, prob: f64) -> String {
    match kind {
        MarketKind::Binary => format_percent(prob),
        MarketKind::PseudoNumeric { .. } => {
            let value = to_decimal(kind.prob_to_value(prob))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize();
            value.to_string()
        }
    }
}

/// Rounds to cents, for callers that need the numeric value back.
pub fn round_money(amount: f64) -> f64 {
    to_decimal(amount)
        .round_dp(2)
        .to_f64()
        .unwrap_or(amount)
}
