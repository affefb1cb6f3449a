//! Market state types: outcomes, pool reserves, and market kinds.
//!
//! A market's automated-maker state is a value (`CpmmState`) that is read
//! before every trade and replaced wholesale afterwards. Pseudo-numeric
//! markets share the binary probability engine; `MarketKind` maps between
//! probability space and the market's displayed value range.

use serde::{Deserialize, Serialize};

use super::error::EngineError;

// ────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────

/// Binary outcome token.
///
/// For pseudo-numeric markets YES means "higher" and NO means "lower".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    /// The other side of the market.
    pub fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    /// Probability of this outcome given the YES probability.
    pub fn prob_of(self, prob_yes: f64) -> f64 {
        match self {
            Self::Yes => prob_yes,
            Self::No => 1.0 - prob_yes,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

// ────────────────────────────────────────────
// Pool state
// ────────────────────────────────────────────

/// Outcome-token reserves held by the market maker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    #[serde(rename = "YES")]
    pub yes: f64,
    #[serde(rename = "NO")]
    pub no: f64,
}

impl Pool {
    pub fn new(yes: f64, no: f64) -> Self {
        Self { yes, no }
    }
}

/// Full constant-product state: reserves plus the weighting parameter `p`.
///
/// `p = 0.5` is the classic unweighted constant product; other values skew
/// the curve so a market can open at a non-50% probability without an
/// unbalanced subsidy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpmmState {
    pub pool: Pool,
    pub p: f64,
}

impl CpmmState {
    pub fn new(yes: f64, no: f64, p: f64) -> Self {
        Self {
            pool: Pool::new(yes, no),
            p,
        }
    }

    /// Checks that reserves are positive and finite and `p` lies in (0, 1).
    pub fn validate(&self) -> Result<(), EngineError> {
        let Pool { yes, no } = self.pool;
        if !(yes.is_finite() && yes > 0.0) {
            return Err(EngineError::DegenerateMarket(format!(
                "YES reserve must be positive, got {yes}"
            )));
        }
        if !(no.is_finite() && no > 0.0) {
            return Err(EngineError::DegenerateMarket(format!(
                "NO reserve must be positive, got {no}"
            )));
        }
        if !(self.p > 0.0 && self.p < 1.0) {
            return Err(EngineError::DegenerateMarket(format!(
                "weight p must be in (0, 1), got {}",
                self.p
            )));
        }
        let prob = self.probability();
        if !(prob > 0.0 && prob < 1.0) {
            return Err(EngineError::DegenerateMarket(format!(
                "probability {prob} reached the boundary"
            )));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────
// Market kinds
// ────────────────────────────────────────────

/// How a market's probability is presented to users.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketKind {
    /// Plain YES/NO market; the displayed value is the probability.
    Binary,
    /// Numeric estimate in `[min, max]` mapped onto a binary probability.
    PseudoNumeric {
        min: f64,
        max: f64,
        #[serde(default)]
        is_log_scale: bool,
    },
}

impl MarketKind {
    /// Maps a YES probability to the market's display value.
    pub fn prob_to_value(&self, prob: f64) -> f64 {
        match *self {
            Self::Binary => prob,
            Self::PseudoNumeric {
                min,
                max,
                is_log_scale,
            } => {
                if is_log_scale {
                    let log_value = prob * (max - min + 1.0).log10();
                    10f64.powf(log_value) + min - 1.0
                } else {
                    prob * (max - min) + min
                }
            }
        }
    }

    /// Maps a display value back to a YES probability, clamping values
    /// outside `[min, max]` to 0 and 1.
    pub fn value_to_prob(&self, value: f64) -> f64 {
        match *self {
            Self::Binary => value,
            Self::PseudoNumeric {
                min,
                max,
                is_log_scale,
            } => {
                if value < min {
                    0.0
                } else if value > max {
                    1.0
                } else if is_log_scale {
                    (value - min + 1.0).log10() / (max - min + 1.0).log10()
                } else {
                    (value - min) / (max - min)
                }
            }
        }
    }

    pub fn is_pseudo_numeric(&self) -> bool {
        matches!(self, Self::PseudoNumeric { .. })
    }
}

impl Default for MarketKind {
    fn default() -> Self {
        Self::Binary
    }
}
