//! Domain layer - Core pricing and matching logic.
//!
//! Pure, synchronous, side-effect-free code (hexagonal architecture
//! inner ring). Every function takes its market snapshot by reference and
//! returns new values; nothing here performs I/O or holds state between
//! calls, so it is safe to call concurrently from any thread.

pub mod cpmm;
pub mod error;
pub mod fees;
pub mod market;
pub mod matching;
pub mod order;
pub mod range;
pub mod search;

// Re-export core types for convenience
pub use cpmm::{LiquidityChange, Purchase};
pub use error::EngineError;
pub use fees::{FeeSchedule, Fees};
pub use market::{CpmmState, MarketKind, Outcome, Pool};
pub use matching::{amount_to_buy_shares, calculate_sale, match_order, resolve_sell_quantity};
pub use order::{
    Fill, LimitOrder, MakerFill, MarketId, OrderId, SaleResult, TradeRequest, TradeResult,
};
pub use range::{RangeOrder, RangePreview, RangeSplit};
