//! Persistence Adapters - Market State and Trade Log Storage
//!
//! Implements the `MarketStore` port with a versioned in-memory store
//! and the `TradeLog` port with append-only JSONL files.

pub mod memory_store;
pub mod trades;

pub use memory_store::InMemoryMarketStore;
pub use trades::TradeLogger;
