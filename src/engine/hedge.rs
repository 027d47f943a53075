//! Cross-asset hedge for market buys.
//!
//! HYPE and FLOP are complementary: a resting FLOP buy at `q` is willing to
//! take the other side of a HYPE purchase at `1 - q`. A HYPE market buy can
//! therefore be filled by consuming resting **FLOP buys** (and a FLOP buy by
//! consuming HYPE buys), each priced at its synthetic price `1 - q`.
//!
//! Candidates are taken in book order for the complementary asset's bids,
//! highest bid first, which is also lowest synthetic price first.

use rust_decimal::Decimal;

use crate::engine::plan::FillPlan;
use crate::engine::sweep::settle_buy;
use crate::error::{EngineError, Result};
use crate::orderbook::Book;
use crate::types::price::{complement, shares_for};
use crate::types::{Asset, MarketBuyReceipt, Side, TradeKind};

/// Plan a purchase of `target` worth `budget` out of the complementary
/// asset's resting buys
pub fn plan_cross_buy(book: &Book, target: Asset, budget: Decimal) -> Result<FillPlan> {
    let mut plan = FillPlan::new(TradeKind::Cross);
    let mut remaining = budget;
    let counter = target.complement();

    for (key, bid) in book.iter_side(counter, Side::Buy) {
        if remaining <= Decimal::ZERO {
            break;
        }

        // A bid at 1.00 offers the target for free: nothing to buy there
        let synth_price = complement(bid.price);
        if synth_price <= Decimal::ZERO {
            continue;
        }

        let required = shares_for(remaining, synth_price);
        if required.is_zero() {
            remaining = Decimal::ZERO;
            break;
        }

        if bid.shares >= required {
            plan.push(key, bid, required);
            remaining = Decimal::ZERO;
            break;
        }

        plan.push(key, bid, bid.shares);
        remaining -= bid.shares * synth_price;
    }

    // Liquidity was there but the budget cannot buy a single share tick
    if plan.is_empty() && remaining <= Decimal::ZERO {
        return Err(EngineError::InvalidQuantity { quantity: budget });
    }

    if remaining > Decimal::ZERO || plan.is_empty() {
        let available = book
            .iter_side(counter, Side::Buy)
            .map(|(_, bid)| bid.shares * complement(bid.price))
            .sum();

        return Err(EngineError::InsufficientLiquidity {
            asset: target,
            requested: budget,
            available,
        });
    }

    Ok(plan)
}

/// Spend `budget` on `target` using only complementary-asset buy liquidity
///
/// ## Example
///
/// ```
/// use hypeflop::engine::hedge::cross_buy;
/// use hypeflop::orderbook::Book;
/// use hypeflop::types::{Asset, Order, Side};
/// use rust_decimal::Decimal;
///
/// let mut book = Book::new();
/// let id = book.next_order_id();
/// book.insert(Order::new(id, Side::Buy, Asset::Flop, Decimal::new(70, 2), Decimal::from(100)));
///
/// let receipt = cross_buy(&mut book, Asset::Hype, Decimal::from(15)).unwrap();
/// assert_eq!(receipt.total_shares, Decimal::from(50));
/// assert_eq!(receipt.final_price, Decimal::new(30, 2));
/// ```
pub fn cross_buy(book: &mut Book, target: Asset, budget: Decimal) -> Result<MarketBuyReceipt> {
    let best_ask = book.best_ask(target);
    let plan = plan_cross_buy(book, target, budget)?;
    Ok(settle_buy(book, plan, best_ask))
}

// ============================================================================
// Unit Tests
// ============================================================================
