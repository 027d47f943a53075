//! Limit order crossing.
//!
//! ## Matching Rules
//!
//! - An incoming **buy** crosses resting sells of the same asset priced at or
//!   below its limit, lowest first
//! - An incoming **sell** crosses resting buys priced at or above its limit,
//!   highest first
//! - Equal prices fill oldest first
//! - Each fill executes at the **maker's** price, size for size
//!
//! The incoming order is never inserted here. Its unfilled residue comes back
//! as the receipt's `remainder` and the caller decides whether to rest it.

use rust_decimal::Decimal;

use crate::engine::plan::FillPlan;
use crate::orderbook::Book;
use crate::types::{LimitReceipt, Order, Side, TradeKind};

/// Does a resting price satisfy the incoming order's limit?
#[inline]
fn crosses(incoming: &Order, resting_price: Decimal) -> bool {
    match incoming.side {
        Side::Buy => resting_price <= incoming.price,
        Side::Sell => resting_price >= incoming.price,
    }
}

/// Plan the fills for `incoming` without touching the book
pub fn plan_limit(book: &Book, incoming: &Order) -> FillPlan {
    let mut plan = FillPlan::new(TradeKind::Direct);
    let mut remaining = incoming.shares;

    for (key, resting) in book.iter_side(incoming.asset, incoming.side.opposite()) {
        if remaining <= Decimal::ZERO || !crosses(incoming, resting.price) {
            break;
        }

        let executed = remaining.min(resting.shares);
        plan.push(key, resting, executed);
        remaining -= executed;
    }

    plan
}

/// Cross `incoming` against the opposite side of the book
///
/// Consumed makers are updated in place: exhausted ones are evicted as
/// `executed`, the last one touched may be left `partial`.
///
/// ## Example
///
/// ```
/// use hypeflop::engine::matcher::match_limit;
/// use hypeflop::orderbook::Book;
/// use hypeflop::types::{Asset, Order, OrderStatus};
/// use rust_decimal::Decimal;
///
/// let mut book = Book::new();
/// let id = book.next_order_id();
/// book.insert(Order::limit_sell(id, Asset::Hype, Decimal::new(40, 2), Decimal::from(10)));
///
/// let id = book.next_order_id();
/// let buy = Order::limit_buy(id, Asset::Hype, Decimal::new(40, 2), Decimal::new(200, 2));
/// let receipt = match_limit(&mut book, buy);
///
/// assert_eq!(receipt.executed_shares, Decimal::from(5));
/// assert!(receipt.remainder.is_none());
/// assert_eq!(book.get_by_id(1).unwrap().status, OrderStatus::Partial);
/// ```
pub fn match_limit(book: &mut Book, mut incoming: Order) -> LimitReceipt {
    let plan = plan_limit(book, &incoming);
    let trades = plan.commit(book, incoming.id);

    let before = incoming.shares;
    incoming.fill(plan.total_shares);

    LimitReceipt {
        order_id: incoming.id,
        executed_shares: before - incoming.shares,
        average_price: plan.average_price(),
        trades,
        remainder: if incoming.is_executed() { None } else { Some(incoming) },
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Asset, OrderStatus};
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rest(book: &mut Book, side: Side, price: &str, shares: &str) -> u64 {
        let id = book.next_order_id();
        book.insert(Order::new(id, side, Asset::Hype, d(price), d(shares)));
        id
    }

    fn incoming(book: &mut Book, side: Side, price: &str, shares: &str) -> Order {
        let id = book.next_order_id();
        Order::new(id, side, Asset::Hype, d(price), d(shares))
    }

    #[test]
    fn test_no_cross_leaves_book_untouched() {
        let mut book = Book::new();
        rest(&mut book, Side::Sell, "0.50", "10");
        let root = book.state_root();

        let buy = incoming(&mut book, Side::Buy, "0.40", "5");
        let receipt = match_limit(&mut book, buy);

        assert!(receipt.trades.is_empty());
        assert!(receipt.executed_shares.is_zero());
        assert!(receipt.average_price.is_zero());
        assert_eq!(receipt.remainder.unwrap().status, OrderStatus::Open);
        assert_eq!(book.state_root(), root);
    }

    #[test]
    fn test_buy_sweeps_best_price_first_at_maker_price() {
        let mut book = Book::new();
        let expensive = rest(&mut book, Side::Sell, "0.45", "10");
        let cheap = rest(&mut book, Side::Sell, "0.35", "10");

        let buy = incoming(&mut book, Side::Buy, "0.50", "15");
        let receipt = match_limit(&mut book, buy);

        assert_eq!(receipt.trades.len(), 2);
        assert_eq!(receipt.trades[0].maker_order_id, cheap);
        assert_eq!(receipt.trades[0].price, d("0.35"));
        assert_eq!(receipt.trades[1].maker_order_id, expensive);
        assert_eq!(receipt.trades[1].shares, d("5"));
        assert_eq!(receipt.executed_shares, d("15"));
        // (10 × 0.35 + 5 × 0.45) / 15
        assert_eq!(receipt.average_price, d("0.3833"));
        assert!(receipt.remainder.is_none());

        assert!(!book.contains(cheap));
        assert_eq!(book.get_by_id(expensive).unwrap().shares, d("5"));
    }

    #[test]
    fn test_buy_stops_at_limit() {
        let mut book = Book::new();
        rest(&mut book, Side::Sell, "0.30", "5");
        let above = rest(&mut book, Side::Sell, "0.60", "5");

        let buy = incoming(&mut book, Side::Buy, "0.50", "8");
        let receipt = match_limit(&mut book, buy);

        assert_eq!(receipt.executed_shares, d("5"));
        let remainder = receipt.remainder.unwrap();
        assert_eq!(remainder.shares, d("3"));
        assert_eq!(remainder.status, OrderStatus::Partial);
        assert_eq!(remainder.notional(), d("1.50"));
        assert_eq!(book.get_by_id(above).unwrap().status, OrderStatus::Open);
    }

    #[test]
    fn test_sell_sweeps_highest_bid_first() {
        let mut book = Book::new();
        let low = rest(&mut book, Side::Buy, "0.30", "10");
        let high = rest(&mut book, Side::Buy, "0.40", "4");

        let sell = incoming(&mut book, Side::Sell, "0.30", "6");
        let receipt = match_limit(&mut book, sell);

        assert_eq!(receipt.trades[0].maker_order_id, high);
        assert_eq!(receipt.trades[0].price, d("0.40"));
        assert_eq!(receipt.trades[1].maker_order_id, low);
        assert_eq!(receipt.trades[1].shares, d("2"));
        assert!(receipt.remainder.is_none());

        let low_order = book.get_by_id(low).unwrap();
        assert_eq!(low_order.shares, d("8"));
        assert_eq!(low_order.status, OrderStatus::Partial);
    }

    #[test]
    fn test_sell_remainder_potential_gain_tracks_residue() {
        let mut book = Book::new();
        rest(&mut book, Side::Buy, "0.50", "4");

        let sell = incoming(&mut book, Side::Sell, "0.50", "10");
        let receipt = match_limit(&mut book, sell);

        let remainder = receipt.remainder.unwrap();
        assert_eq!(remainder.shares, d("6"));
        assert_eq!(remainder.potential_gain(), Some(d("3.00")));
    }

    #[test]
    fn test_equal_prices_fill_oldest_first() {
        let mut book = Book::new();
        let first = rest(&mut book, Side::Sell, "0.40", "3");
        let second = rest(&mut book, Side::Sell, "0.40", "3");

        let buy = incoming(&mut book, Side::Buy, "0.40", "4");
        let receipt = match_limit(&mut book, buy);

        assert_eq!(receipt.trades[0].maker_order_id, first);
        assert_eq!(receipt.trades[1].maker_order_id, second);
        assert_eq!(book.get_by_id(second).unwrap().shares, d("2"));
    }

    #[test]
    fn test_other_asset_is_ignored() {
        let mut book = Book::new();
        let id = book.next_order_id();
        book.insert(Order::limit_sell(id, Asset::Flop, d("0.10"), d("10")));

        let buy = incoming(&mut book, Side::Buy, "0.90", "5");
        let receipt = match_limit(&mut book, buy);

        assert!(receipt.trades.is_empty());
    }

    #[test]
    fn test_trade_shares_sum_to_executed() {
        let mut book = Book::new();
        for price in ["0.31", "0.32", "0.33", "0.34"] {
            rest(&mut book, Side::Sell, price, "2.5");
        }

        let buy = incoming(&mut book, Side::Buy, "0.33", "100");
        let receipt = match_limit(&mut book, buy);

        let summed: Decimal = receipt.trades.iter().map(|t| t.shares).sum();
        assert_eq!(summed, receipt.executed_shares);
        assert_eq!(receipt.executed_shares, d("7.5"));
    }
}
