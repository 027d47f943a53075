//! Trade type representing one fill between a taker and a resting order.
//!
//! ## Terminology
//!
//! - **Maker**: the resting order that was already in the book
//! - **Taker**: the incoming limit or market order
//!
//! ## Pricing
//!
//! A direct trade executes at the maker's price. A cross trade fills a HYPE
//! buy against a resting FLOP buy (or the reverse); the taker pays the
//! synthetic price `1 - maker_price`.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::order::Asset;
use crate::types::price;

/// How a trade was sourced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    /// Against the opposite side of the same asset
    Direct,
    /// Against the complementary asset's buy side
    Cross,
}

/// A single fill.
///
/// ## Example
///
/// ```
/// use hypeflop::types::{Asset, Trade, TradeKind};
/// use rust_decimal::Decimal;
///
/// let trade = Trade::direct(1, 10, 11, Asset::Hype, Decimal::new(40, 2), Decimal::from(5));
/// assert_eq!(trade.value, Decimal::new(200, 2));
/// assert_eq!(trade.kind, TradeKind::Direct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Unique trade identifier (assigned by the book)
    pub id: u64,

    /// Resting (maker) order id
    pub maker_order_id: u64,

    /// Incoming (taker) order id
    pub taker_order_id: u64,

    /// Asset of the maker order
    pub maker_asset: Asset,

    /// Price per share paid or received by the taker
    pub price: Decimal,

    /// The maker's own resting price
    pub maker_price: Decimal,

    /// Executed shares
    pub shares: Decimal,

    /// Notional transferred, `round(shares × price, 2)`
    pub value: Decimal,

    pub kind: TradeKind,
}

impl Trade {
    /// A same-asset fill at the maker's price
    pub fn direct(
        id: u64,
        maker_order_id: u64,
        taker_order_id: u64,
        asset: Asset,
        price: Decimal,
        shares: Decimal,
    ) -> Self {
        Self {
            id,
            maker_order_id,
            taker_order_id,
            maker_asset: asset,
            price,
            maker_price: price,
            shares,
            value: price::notional(shares, price),
            kind: TradeKind::Direct,
        }
    }

    /// A complementary-asset fill; the taker pays `1 - maker_price`
    pub fn cross(
        id: u64,
        maker_order_id: u64,
        taker_order_id: u64,
        maker_asset: Asset,
        maker_price: Decimal,
        shares: Decimal,
    ) -> Self {
        let price = price::complement(maker_price);
        Self {
            id,
            maker_order_id,
            taker_order_id,
            maker_asset,
            price,
            maker_price,
            shares,
            value: price::notional(shares, price),
            kind: TradeKind::Cross,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
