//! Order types for the HYPE/FLOP matching engine.
//!
//! ## Derived Fields
//!
//! An order stores only its price and remaining shares. The notional
//! (`amount`) and, for sells, the `potentialGain` are computed on read as
//! `round(shares × price, 2)`, so they can never drift from the share count.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::price::{self, to_fixed};
use crate::types::record::OrderRecord;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 in the SSZ record:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order (bid)
    #[default]
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// Asset enum
// ============================================================================

/// One of the two complementary outcome assets.
///
/// A HYPE price of `p` is economically a FLOP price of `1 - p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    #[default]
    Hype,
    Flop,
}

impl Asset {
    /// Both assets, in book index order
    pub const ALL: [Asset; 2] = [Asset::Hype, Asset::Flop];

    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Asset::Hype => 0,
            Asset::Flop => 1,
        }
    }

    /// The complementary asset (HYPE <-> FLOP)
    pub fn complement(self) -> Self {
        match self {
            Asset::Hype => Asset::Flop,
            Asset::Flop => Asset::Hype,
        }
    }

    /// Index into per-asset storage
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.to_u8() as usize
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::Hype => f.write_str("HYPE"),
            Asset::Flop => f.write_str("FLOP"),
        }
    }
}

// ============================================================================
// OrderStatus enum
// ============================================================================

/// Lifecycle state of an order.
///
/// Transitions: `Open -> Partial -> Executed` or `Open -> Executed`.
/// `Executed` is terminal and executed orders never rest in the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Open,
    Partial,
    Executed,
}

impl OrderStatus {
    pub fn to_u8(self) -> u8 {
        match self {
            OrderStatus::Open => 0,
            OrderStatus::Partial => 1,
            OrderStatus::Executed => 2,
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A limit order, resting or incoming.
///
/// ## Example
///
/// ```
/// use hypeflop::types::{Asset, Order, OrderStatus};
/// use rust_decimal::Decimal;
///
/// // Buy HYPE at 0.40 with 2.00 of capital -> 5 shares
/// let order = Order::limit_buy(1, Asset::Hype, Decimal::new(40, 2), Decimal::new(200, 2));
/// assert_eq!(order.shares, Decimal::from(5));
/// assert_eq!(order.notional(), Decimal::new(200, 2));
/// assert_eq!(order.status, OrderStatus::Open);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Unique order identifier (assigned by the book, monotonic)
    pub id: u64,

    pub side: Side,

    pub asset: Asset,

    /// Limit price in (0, 1]
    pub price: Decimal,

    /// Remaining shares. Never negative, never increases.
    pub shares: Decimal,

    /// Shares at creation
    pub original_shares: Decimal,

    pub status: OrderStatus,
}

impl Order {
    /// Create a new open order for `shares` at `price`
    pub fn new(id: u64, side: Side, asset: Asset, price: Decimal, shares: Decimal) -> Self {
        Self {
            id,
            side,
            asset,
            price,
            shares,
            original_shares: shares,
            status: OrderStatus::Open,
        }
    }

    /// Create a buy order committing `notional` of capital at `price`
    ///
    /// Shares are derived as `round(notional / price, 4)`.
    pub fn limit_buy(id: u64, asset: Asset, price: Decimal, notional: Decimal) -> Self {
        Self::new(id, Side::Buy, asset, price, price::shares_for(notional, price))
    }

    /// Create a sell order offering `shares` at `price`
    pub fn limit_sell(id: u64, asset: Asset, price: Decimal, shares: Decimal) -> Self {
        Self::new(id, Side::Sell, asset, price, price::round_shares(shares))
    }

    /// Remaining notional: committed capital for buys, potential proceeds for sells
    #[inline]
    pub fn notional(&self) -> Decimal {
        price::notional(self.shares, self.price)
    }

    /// Potential proceeds of a sell order; `None` for buys
    #[inline]
    pub fn potential_gain(&self) -> Option<Decimal> {
        match self.side {
            Side::Sell => Some(self.notional()),
            Side::Buy => None,
        }
    }

    /// Shares consumed so far
    #[inline]
    pub fn filled_shares(&self) -> Decimal {
        self.original_shares - self.shares
    }

    #[inline]
    pub fn is_executed(&self) -> bool {
        self.status == OrderStatus::Executed
    }

    /// Consume up to `shares` from this order
    ///
    /// # Returns
    ///
    /// The shares actually consumed (clamped to what remains). A zero or
    /// negative request leaves the order untouched.
    pub fn fill(&mut self, shares: Decimal) -> Decimal {
        if shares <= Decimal::ZERO || self.is_executed() {
            return Decimal::ZERO;
        }

        let actual = shares.min(self.shares);
        self.shares -= actual;
        self.status = if self.shares.is_zero() {
            OrderStatus::Executed
        } else {
            OrderStatus::Partial
        };
        actual
    }

    /// Fixed-point SSZ projection used for state hashing
    ///
    /// Returns `None` if the price or share count cannot be encoded exactly
    /// at 10^8 scale. The book only admits orders that can.
    pub fn to_record(&self) -> Option<OrderRecord> {
        Some(OrderRecord {
            id: self.id,
            side_raw: self.side.to_u8(),
            asset_raw: self.asset.to_u8(),
            status_raw: self.status.to_u8(),
            price: to_fixed(self.price)?,
            shares: to_fixed(self.shares)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderView<'a> {
    id: u64,
    side: Side,
    asset: Asset,
    price: &'a Decimal,
    shares: &'a Decimal,
    amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    potential_gain: Option<Decimal>,
    status: OrderStatus,
}

impl Serialize for Order {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OrderView {
            id: self.id,
            side: self.side,
            asset: self.asset,
            price: &self.price,
            shares: &self.shares,
            amount: self.notional(),
            potential_gain: self.potential_gain(),
            status: self.status,
        }
        .serialize(serializer)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_side_conversion() {
        assert_eq!(Side::Buy.to_u8(), 0);
        assert_eq!(Side::Sell.to_u8(), 1);
        assert_eq!(Side::Buy.opposite(), Side::Sell);
    }

    #[test]
    fn test_asset_complement() {
        assert_eq!(Asset::Hype.complement(), Asset::Flop);
        assert_eq!(Asset::Flop.complement(), Asset::Hype);
        assert_eq!(Asset::Flop.to_u8(), 1);
        assert_eq!(Asset::Hype.to_string(), "HYPE");
    }

    #[test]
    fn test_limit_buy_derives_shares() {
        let order = Order::limit_buy(1, Asset::Hype, d("0.30"), d("1.00"));
        assert_eq!(order.shares, d("3.3333"));
        assert_eq!(order.notional(), d("1.00"));
        assert_eq!(order.potential_gain(), None);
    }

    #[test]
    fn test_limit_sell_potential_gain() {
        let order = Order::limit_sell(1, Asset::Hype, d("0.40"), d("10"));
        assert_eq!(order.potential_gain(), Some(d("4.00")));
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[test]
    fn test_order_fill_transitions() {
        let mut order = Order::limit_sell(1, Asset::Hype, d("0.40"), d("10"));

        assert_eq!(order.fill(d("4")), d("4"));
        assert_eq!(order.status, OrderStatus::Partial);
        assert_eq!(order.notional(), d("2.40"));
        assert_eq!(order.filled_shares(), d("4"));

        assert_eq!(order.fill(d("100")), d("6"));
        assert_eq!(order.status, OrderStatus::Executed);
        assert!(order.shares.is_zero());
    }

    #[test]
    fn test_zero_fill_is_noop() {
        let mut order = Order::limit_sell(1, Asset::Flop, d("0.50"), d("2"));
        assert_eq!(order.fill(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[test]
    fn test_executed_order_takes_no_fill() {
        let mut order = Order::limit_sell(1, Asset::Flop, d("0.50"), d("2"));
        order.fill(d("2"));
        assert_eq!(order.fill(d("1")), Decimal::ZERO);
        assert_eq!(order.status, OrderStatus::Executed);
    }

    #[test]
    fn test_order_json_view() {
        let order = Order::limit_sell(7, Asset::Hype, d("0.40"), d("10"));
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["side"], "sell");
        assert_eq!(json["asset"], "HYPE");
        assert_eq!(json["status"], "open");
        assert_eq!(json["amount"], "4.00");
        assert_eq!(json["potentialGain"], "4.00");

        let buy = Order::limit_buy(8, Asset::Flop, d("0.50"), d("1.00"));
        let json = serde_json::to_value(&buy).unwrap();
        assert!(json.get("potentialGain").is_none());
    }

    #[test]
    fn test_order_to_record() {
        let order = Order::limit_sell(1, Asset::Hype, d("0.40"), d("10"));
        let record = order.to_record().unwrap();
        assert_eq!(record.price, 40_000_000);
        assert_eq!(record.shares, 1_000_000_000);

        assert_eq!(record.side_raw, 1);
        assert_eq!(record.status_raw, 0);
    }

    #[test]
    fn test_oversized_order_has_no_record() {
        let order = Order::limit_sell(1, Asset::Hype, d("0.50"), d("200000000000"));
        assert!(order.to_record().is_none());
    }
}
