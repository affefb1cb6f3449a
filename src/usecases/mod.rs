//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the pure domain engine with the store and log ports.
//!
//! Use cases:
//! - `TradeExecutor`: Optimistic read-compute-write trade execution
//! - `BetStats`: Display stats for a previewed bet
//! - `ReplayRunner`: JSON command driver used by the CLI

pub mod bet_preview;
pub mod replay;
pub mod trade_executor;

pub use bet_preview::BetStats;
pub use replay::{ReplayCommand, ReplayRunner};
pub use trade_executor::{ExecutorError, TradeExecutor};
