//! Engine error taxonomy.
//!
//! Every error is detected synchronously before or during a computation
//! and returned to the immediate caller. Nothing here is retried inside
//! the engine; conflict retries belong to the store/executor layer.

use thiserror::Error;

/// Errors produced by the pricing engine and order matcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Bet amount or share quantity was zero, negative, or not finite.
    #[error("invalid amount: {0} (must be a finite value > 0)")]
    InvalidAmount(f64),

    /// Limit probability outside the open interval (0, 1).
    #[error("limit probability {0} is out of range (0, 1)")]
    OutOfRange(f64),

    /// Range order whose low bound is not below its high bound.
    #[error("inverted range: low limit {low} must be less than high limit {high}")]
    InvertedRange { low: f64, high: f64 },

    /// Range order with neither a low nor a high bound.
    #[error("range order needs a low and/or high limit")]
    MissingLimit,

    /// Seller asked for more shares than they hold.
    #[error("cannot sell {requested} shares, only {owned} owned")]
    InsufficientShares { requested: f64, owned: f64 },

    /// Fees or book depth leave a sale unable to buy back the full
    /// quantity of opposite shares.
    #[error("cannot sell {requested} shares, only {filled} can be bought back")]
    UnfillableSale { requested: f64, filled: f64 },

    /// Pool state at or beyond the boundary. Indicates corrupt
    /// caller-supplied state, never a user error.
    #[error("degenerate market: {0}")]
    DegenerateMarket(String),
}

impl EngineError {
    /// Whether the error was caused by user input (as opposed to an
    /// invariant violation in the supplied market state).
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::DegenerateMarket(_))
    }
}
