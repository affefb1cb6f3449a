//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MarketStore`: Versioned pool + order book reads and atomic commits
//! - `TradeLog`: Append-only audit trail of executed trades

pub mod market_store;
pub mod trade_log;
