//! Adapters Layer - Concrete Port Implementations
//!
//! - `persistence`: in-memory versioned market store, JSONL trade log

pub mod persistence;
