//! Same-asset market order sweeps.
//!
//! - A **market buy** spends a notional budget against resting sells of the
//!   asset, lowest price first. Each order's remaining notional is consumed
//!   whole, or the budget converts to shares at that order's price.
//! - A **market sell** sells a share count into resting buys of the asset,
//!   highest price first, share for share.
//!
//! Both are all-or-nothing: if the side runs dry before the request is
//! satisfied the call fails with `InsufficientLiquidity` and the book is left
//! unchanged.

use rust_decimal::Decimal;

use crate::engine::plan::FillPlan;
use crate::error::{EngineError, Result};
use crate::orderbook::Book;
use crate::types::price::{round_notional, shares_for};
use crate::types::{Asset, MarketBuyReceipt, MarketSellReceipt, Side, TradeKind};

/// Plan a market buy of `budget` against resting sells of `asset`
pub fn plan_market_buy(book: &Book, asset: Asset, budget: Decimal) -> Result<FillPlan> {
    let mut plan = FillPlan::new(TradeKind::Direct);
    let mut remaining = budget;

    for (key, ask) in book.iter_side(asset, Side::Sell) {
        if remaining <= Decimal::ZERO {
            break;
        }

        let available = ask.notional();
        if available <= remaining {
            plan.push(key, ask, ask.shares);
            remaining -= available;
            continue;
        }

        let shares = shares_for(remaining, ask.price).min(ask.shares);
        if !shares.is_zero() {
            plan.push(key, ask, shares);
        }
        // The budget runs out inside this order; any residue is dust
        remaining = Decimal::ZERO;
    }

    // Liquidity was there but the budget cannot buy a single share tick
    if plan.is_empty() && remaining <= Decimal::ZERO {
        return Err(EngineError::InvalidQuantity { quantity: budget });
    }

    if remaining > Decimal::ZERO || plan.is_empty() {
        return Err(EngineError::InsufficientLiquidity {
            asset,
            requested: budget,
            available: book.side_notional(asset, Side::Sell),
        });
    }

    Ok(plan)
}

/// Plan a market sell of `shares` into resting buys of `asset`
pub fn plan_market_sell(book: &Book, asset: Asset, shares: Decimal) -> Result<FillPlan> {
    let mut plan = FillPlan::new(TradeKind::Direct);
    let mut remaining = shares;

    for (key, bid) in book.iter_side(asset, Side::Buy) {
        if remaining <= Decimal::ZERO {
            break;
        }

        let executed = remaining.min(bid.shares);
        plan.push(key, bid, executed);
        remaining -= executed;
    }

    if remaining > Decimal::ZERO {
        return Err(EngineError::InsufficientLiquidity {
            asset,
            requested: shares,
            available: plan.total_shares,
        });
    }

    Ok(plan)
}

/// Commit a buy plan and build its receipt
///
/// `best_ask` is the target asset's best ask observed before planning; the
/// price impact is measured against it.
pub fn settle_buy(book: &mut Book, plan: FillPlan, best_ask: Option<Decimal>) -> MarketBuyReceipt {
    let order_id = book.next_order_id();
    let trades = plan.commit(book, order_id);

    MarketBuyReceipt {
        order_id,
        route: plan.kind,
        total_shares: plan.total_shares,
        final_price: plan.final_price,
        average_price: plan.average_price(),
        price_impact: best_ask.map_or(Decimal::ZERO, |ask| plan.final_price - ask),
        trades,
    }
}

/// Spend `budget` on `asset` using same-asset sell liquidity only
pub fn market_buy(book: &mut Book, asset: Asset, budget: Decimal) -> Result<MarketBuyReceipt> {
    let best_ask = book.best_ask(asset);
    let plan = plan_market_buy(book, asset, budget)?;
    Ok(settle_buy(book, plan, best_ask))
}

/// Sell `shares` of `asset` into resting buys
pub fn market_sell(book: &mut Book, asset: Asset, shares: Decimal) -> Result<MarketSellReceipt> {
    let plan = plan_market_sell(book, asset, shares)?;
    let order_id = book.next_order_id();
    let trades = plan.commit(book, order_id);

    Ok(MarketSellReceipt {
        order_id,
        executed_shares: plan.total_shares,
        total_revenue: round_notional(plan.total_value),
        average_price: plan.average_price(),
        trades,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
