//! Core data types for the HYPE/FLOP engine
//!
//! ## Types
//!
//! - [`Order`]: a resting or incoming limit order
//! - [`Side`], [`Asset`], [`OrderStatus`]: order classification and lifecycle
//! - [`Trade`]: one fill between a taker and a maker
//! - [`LimitOutcome`], [`MarketBuyReceipt`], [`MarketSellReceipt`]: typed
//!   results of each engine operation
//! - [`OrderRecord`]: fixed-point SSZ projection used for the state root
//!
//! ## Numbers
//!
//! Prices, shares and notionals are `rust_decimal::Decimal`. See [`price`]
//! for the rounding rules.

mod order;
mod trade;
mod receipt;
pub mod price;
pub mod record;

// Re-export all types at module level
pub use order::{Asset, Order, OrderStatus, Side};
pub use trade::{Trade, TradeKind};
pub use receipt::{LimitOutcome, LimitReceipt, MarketBuyReceipt, MarketSellReceipt};
pub use record::OrderRecord;
