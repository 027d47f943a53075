//! Error types for the matching engine
//!
//! All failures are terminal for the request that raised them. A failed
//! market operation leaves the book exactly as it was.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::Asset;

/// Engine error taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Price outside (0, 1] or off the 0.01 grid
    #[error("Invalid price: {price} (must be in (0, 1] in steps of 0.01)")]
    InvalidPrice { price: Decimal },

    /// Non-positive, oversized or dust notional or share count
    #[error("Invalid quantity: {quantity} (must be positive and at most 10000000000)")]
    InvalidQuantity { quantity: Decimal },

    /// Book liquidity ran out before the request was satisfied
    #[error("Insufficient liquidity for {asset}: requested {requested}, available {available}")]
    InsufficientLiquidity {
        asset: Asset,
        requested: Decimal,
        available: Decimal,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;
