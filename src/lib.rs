//! # HYPE/FLOP Matching Engine
//!
//! Order matching for a two-outcome prediction market. HYPE and FLOP are
//! complementary assets priced in (0, 1]: a HYPE price `p` is a FLOP
//! price `1 - p`.
//!
//! ## Architecture
//!
//! - **Types**: Order, Trade, receipts and the decimal price helpers
//! - **OrderBook**: slab-backed book with per-(asset, side) price levels
//! - **Engine**: limit crossing, market sweeps and the cross-asset hedge
//! - **Adapter**: JSON requests in, status code and JSON body out
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical requests produce identical trades and state roots
//! 2. **No Floating Point**: all quantities are exact decimals
//! 3. **Pre-allocated Memory**: slab allocation for O(1) order operations
//! 4. **All-or-Nothing Market Orders**: a failed sweep leaves the book unchanged

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Trade, receipts
pub mod types;

/// Order book: slab-based storage with sorted price levels
pub mod orderbook;

/// Matching engine: limit, market and cross-asset execution
pub mod engine;

/// Engine error taxonomy
pub mod error;

/// JSON request layer
pub mod adapter;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use types::{
    Asset, LimitOutcome, LimitReceipt, MarketBuyReceipt, MarketSellReceipt, Order, OrderStatus,
    Side, Trade, TradeKind,
};
pub use orderbook::{Book, DepthLevel};
pub use engine::{EngineConfig, MatchingEngine};
pub use error::{EngineError, Result};
