//! Execution receipts returned by the matching engine.
//!
//! Each operation has its own typed receipt instead of a bag of optional
//! fields:
//!
//! - [`LimitOutcome`]: a limit order either rests untouched or matches
//! - [`LimitReceipt`]: fills, average price and the unfilled remainder
//! - [`MarketBuyReceipt`]: shares bought, final price and price impact
//! - [`MarketSellReceipt`]: shares sold, revenue and average price

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::order::Order;
use crate::types::trade::{Trade, TradeKind};

/// Result of crossing an incoming limit order against the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitReceipt {
    /// Id of the incoming order
    pub order_id: u64,

    /// Shares filled, `original - remaining`
    pub executed_shares: Decimal,

    /// Value-weighted fill price rounded to 4 places, 0 without fills
    pub average_price: Decimal,

    pub trades: Vec<Trade>,

    /// Unfilled residue, status `partial`, resting in the book.
    /// `None` when the incoming order was fully executed.
    pub remainder: Option<Order>,
}

impl LimitReceipt {
    /// Check if the incoming order was completely filled
    #[inline]
    pub fn is_fully_filled(&self) -> bool {
        self.remainder.is_none()
    }
}

/// What happened to a limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum LimitOutcome {
    /// No counter-order crossed; the order rests with status `open`
    Resting(Order),
    /// At least one fill occurred
    Matched(LimitReceipt),
}

impl LimitOutcome {
    pub fn trades(&self) -> &[Trade] {
        match self {
            LimitOutcome::Resting(_) => &[],
            LimitOutcome::Matched(receipt) => &receipt.trades,
        }
    }

    /// The order left resting in the book, if any
    pub fn resting_order(&self) -> Option<&Order> {
        match self {
            LimitOutcome::Resting(order) => Some(order),
            LimitOutcome::Matched(receipt) => receipt.remainder.as_ref(),
        }
    }
}

/// Result of a market buy (direct sweep or cross hedge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketBuyReceipt {
    pub order_id: u64,

    /// Which liquidity filled the order
    pub route: TradeKind,

    pub total_shares: Decimal,

    /// Price of the last order touched
    pub final_price: Decimal,

    /// `final_price - best ask at start`, 0 when there was no ask
    pub price_impact: Decimal,

    /// Value-weighted price per share rounded to 4 places
    pub average_price: Decimal,

    pub trades: Vec<Trade>,
}

/// Result of a market sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSellReceipt {
    pub order_id: u64,

    pub executed_shares: Decimal,

    /// Proceeds rounded to 2 places
    pub total_revenue: Decimal,

    /// Revenue per share rounded to 4 places
    pub average_price: Decimal,

    pub trades: Vec<Trade>,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::order::Asset;

    #[test]
    fn test_resting_outcome() {
        let order = Order::limit_sell(1, Asset::Hype, Decimal::new(40, 2), Decimal::from(10));
        let outcome = LimitOutcome::Resting(order.clone());

        assert!(outcome.trades().is_empty());
        assert_eq!(outcome.resting_order(), Some(&order));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "resting");
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn test_matched_outcome_without_remainder() {
        let receipt = LimitReceipt {
            order_id: 2,
            executed_shares: Decimal::from(5),
            average_price: Decimal::new(40, 2),
            trades: Vec::new(),
            remainder: None,
        };
        assert!(receipt.is_fully_filled());

        let outcome = LimitOutcome::Matched(receipt);
        assert!(outcome.resting_order().is_none());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "matched");
        assert_eq!(json["executedShares"], "5");
        assert!(json["remainder"].is_null());
    }
}
