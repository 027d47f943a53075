//! Matching engine for the HYPE/FLOP market.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: the same request sequence always produces the same
//!    trades, ids and state root
//! 2. **Exact Decimal Math**: no floating-point operations
//! 3. **Synchronous Execution**: every operation takes `&mut self`, so one
//!    writer at a time is enforced by the borrow checker
//! 4. **Price-Time Priority**: best price first, then FIFO
//!
//! ## Operations
//!
//! - **Limit orders** cross the opposite side of the same asset and rest any
//!   remainder
//! - **Market buys** spend a notional budget through the cheaper of two
//!   routes: same-asset sells, or complementary-asset buys at `1 - price`
//! - **Market sells** sell shares into same-asset buys
//!
//! ## Example
//!
//! ```
//! use hypeflop::engine::MatchingEngine;
//! use hypeflop::types::{Asset, LimitOutcome};
//! use rust_decimal::Decimal;
//!
//! let mut engine = MatchingEngine::new();
//!
//! // 10 HYPE offered at 0.40
//! let outcome = engine
//!     .place_limit_sell(Asset::Hype, Decimal::new(40, 2), Decimal::from(10))
//!     .unwrap();
//! assert!(matches!(outcome, LimitOutcome::Resting(_)));
//!
//! // A 2.00 buy at 0.40 takes 5 of them
//! let outcome = engine
//!     .place_limit_buy(Asset::Hype, Decimal::new(40, 2), Decimal::new(200, 2))
//!     .unwrap();
//! assert_eq!(outcome.trades().len(), 1);
//! assert!(outcome.resting_order().is_none());
//! ```

pub mod plan;
pub mod matcher;
pub mod sweep;
pub mod hedge;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::orderbook::{Book, DepthLevel};
use crate::types::price::{
    is_valid_notional, is_valid_price, is_valid_shares, round_shares, shares_for,
};
use crate::types::{
    Asset, LimitOutcome, MarketBuyReceipt, MarketSellReceipt, Order, Side,
};

/// Default pre-allocated order capacity
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Engine construction parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of resting orders the book pre-allocates room for
    pub capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Owns the book and validates every request before it reaches the
/// matching algorithms
#[derive(Debug)]
pub struct MatchingEngine {
    book: Book,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            book: Book::with_capacity(config.capacity),
        }
    }

    /// Read-only view of the book
    #[inline]
    pub fn book(&self) -> &Book {
        &self.book
    }

    // ========================================================================
    // Limit Orders
    // ========================================================================

    /// Commit `notional` of capital to buy `asset` at up to `price`
    ///
    /// # Errors
    ///
    /// - `InvalidPrice` if `price` is outside (0, 1] or off the 0.01 grid
    /// - `InvalidQuantity` if `notional` is not positive, exceeds
    ///   [`MAX_NOTIONAL`](crate::types::price::MAX_NOTIONAL), or buys no
    ///   shares or more than [`MAX_SHARES`](crate::types::price::MAX_SHARES)
    pub fn place_limit_buy(
        &mut self,
        asset: Asset,
        price: Decimal,
        notional: Decimal,
    ) -> Result<LimitOutcome> {
        validate_price(price)?;
        validate_notional(notional)?;

        if !is_valid_shares(shares_for(notional, price)) {
            return Err(EngineError::InvalidQuantity { quantity: notional });
        }

        let id = self.book.next_order_id();
        self.place_limit(Order::limit_buy(id, asset, price, notional))
    }

    /// Offer `shares` of `asset` at `price` or better
    ///
    /// # Errors
    ///
    /// - `InvalidPrice` if `price` is outside (0, 1] or off the 0.01 grid
    /// - `InvalidQuantity` if `shares` rounds to zero or below, or exceeds
    ///   [`MAX_SHARES`](crate::types::price::MAX_SHARES)
    pub fn place_limit_sell(
        &mut self,
        asset: Asset,
        price: Decimal,
        shares: Decimal,
    ) -> Result<LimitOutcome> {
        validate_price(price)?;
        validate_shares(shares)?;

        let id = self.book.next_order_id();
        self.place_limit(Order::limit_sell(id, asset, price, shares))
    }

    fn place_limit(&mut self, order: Order) -> Result<LimitOutcome> {
        let receipt = matcher::match_limit(&mut self.book, order.clone());

        if receipt.trades.is_empty() {
            self.book.insert(order.clone());
            info!(
                order_id = order.id,
                side = ?order.side,
                asset = %order.asset,
                price = %order.price,
                shares = %order.shares,
                "order resting"
            );
            return Ok(LimitOutcome::Resting(order));
        }

        if let Some(remainder) = &receipt.remainder {
            self.book.insert(remainder.clone());
        }

        info!(
            order_id = receipt.order_id,
            side = ?order.side,
            asset = %order.asset,
            trades = receipt.trades.len(),
            executed = %receipt.executed_shares,
            resting = receipt.remainder.is_some(),
            "limit order matched"
        );
        Ok(LimitOutcome::Matched(receipt))
    }

    // ========================================================================
    // Market Orders
    // ========================================================================

    /// Spend `budget` on `asset` through the cheaper route
    ///
    /// Both the direct sweep and the cross hedge are planned against the
    /// current book; the one with the lower final price is executed, the
    /// direct sweep winning ties. If neither route can absorb the whole
    /// budget the book is left unchanged.
    ///
    /// A budget too small to buy one share tick on either route is an
    /// `InvalidQuantity`, not a liquidity failure.
    pub fn market_buy(&mut self, asset: Asset, budget: Decimal) -> Result<MarketBuyReceipt> {
        validate_notional(budget)?;

        let best_ask = self.book.best_ask(asset);
        let direct = sweep::plan_market_buy(&self.book, asset, budget);
        let cross = hedge::plan_cross_buy(&self.book, asset, budget);

        let plan = match (direct, cross) {
            (Ok(direct), Ok(cross)) => {
                if cross.final_price < direct.final_price {
                    cross
                } else {
                    direct
                }
            }
            (Ok(direct), Err(_)) => direct,
            (Err(_), Ok(cross)) => cross,
            (Err(direct), Err(cross)) => {
                let err = match cross {
                    EngineError::InvalidQuantity { .. } => cross,
                    _ => direct,
                };
                warn!(%asset, %budget, error = %err, "market buy rejected");
                return Err(err);
            }
        };

        let receipt = sweep::settle_buy(&mut self.book, plan, best_ask);
        info!(
            order_id = receipt.order_id,
            %asset,
            route = ?receipt.route,
            shares = %receipt.total_shares,
            final_price = %receipt.final_price,
            "market buy filled"
        );
        Ok(receipt)
    }

    /// Spend `budget` on `asset` using only complementary-asset buys
    pub fn cross_buy(&mut self, asset: Asset, budget: Decimal) -> Result<MarketBuyReceipt> {
        validate_notional(budget)?;

        hedge::cross_buy(&mut self.book, asset, budget).map_err(|err| {
            warn!(%asset, %budget, error = %err, "cross buy rejected");
            err
        })
    }

    /// Sell `shares` of `asset` into resting buys
    pub fn market_sell(&mut self, asset: Asset, shares: Decimal) -> Result<MarketSellReceipt> {
        let rounded = validate_shares(shares)?;

        match sweep::market_sell(&mut self.book, asset, rounded) {
            Ok(receipt) => {
                info!(
                    order_id = receipt.order_id,
                    %asset,
                    shares = %receipt.executed_shares,
                    revenue = %receipt.total_revenue,
                    "market sell filled"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(%asset, shares = %rounded, error = %err, "market sell rejected");
                Err(err)
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every resting order: sells by ascending price, then buys by
    /// descending price, id breaking ties
    pub fn list_open_orders(&self) -> Vec<Order> {
        self.book.open_orders()
    }

    pub fn order(&self, order_id: u64) -> Option<&Order> {
        self.book.get_by_id(order_id)
    }

    pub fn depth(&self, asset: Asset, side: Side, levels: usize) -> Vec<DepthLevel> {
        self.book.depth(asset, side, levels)
    }

    pub fn best_bid(&self, asset: Asset) -> Option<Decimal> {
        self.book.best_bid(asset)
    }

    pub fn best_ask(&self, asset: Asset) -> Option<Decimal> {
        self.book.best_ask(asset)
    }

    /// SHA-256 digest of the resting orders
    pub fn state_root(&self) -> [u8; 32] {
        self.book.state_root()
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_price(price: Decimal) -> Result<()> {
    if is_valid_price(price) {
        Ok(())
    } else {
        Err(EngineError::InvalidPrice { price })
    }
}

fn validate_notional(notional: Decimal) -> Result<()> {
    if is_valid_notional(notional) {
        Ok(())
    } else {
        Err(EngineError::InvalidQuantity { quantity: notional })
    }
}

/// Round `shares` to the share tick and bound it, reporting the raw request
fn validate_shares(shares: Decimal) -> Result<Decimal> {
    let rounded = round_shares(shares);
    if is_valid_shares(rounded) {
        Ok(rounded)
    } else {
        Err(EngineError::InvalidQuantity { quantity: shares })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::{MAX_NOTIONAL, MAX_SHARES};
    use crate::types::{OrderStatus, TradeKind};
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_config_default() {
        assert_eq!(EngineConfig::default().capacity, DEFAULT_CAPACITY);
        let engine = MatchingEngine::with_config(EngineConfig { capacity: 16 });
        assert!(engine.book().capacity() >= 16);
    }

    #[test]
    fn test_rejects_bad_prices() {
        let mut engine = MatchingEngine::new();

        for price in ["0", "-0.10", "1.01", "0.405"] {
            let err = engine.place_limit_buy(Asset::Hype, d(price), d("10")).unwrap_err();
            assert_eq!(err, EngineError::InvalidPrice { price: d(price) });
        }
        assert!(engine.book().is_empty());
        assert_eq!(engine.book().peek_next_order_id(), 1);
    }

    #[test]
    fn test_rejects_bad_quantities() {
        let mut engine = MatchingEngine::new();

        assert!(matches!(
            engine.place_limit_buy(Asset::Hype, d("0.50"), d("0")),
            Err(EngineError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            engine.place_limit_buy(Asset::Hype, d("0.50"), d("0.00001")),
            Err(EngineError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            engine.place_limit_sell(Asset::Hype, d("0.50"), d("0.00001")),
            Err(EngineError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            engine.market_buy(Asset::Hype, d("-1")),
            Err(EngineError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            engine.market_sell(Asset::Hype, d("0")),
            Err(EngineError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_quantities() {
        let mut engine = MatchingEngine::new();
        let huge = Decimal::MAX;

        assert_eq!(
            engine.place_limit_buy(Asset::Hype, d("0.01"), huge).unwrap_err(),
            EngineError::InvalidQuantity { quantity: huge }
        );
        // Within the notional bound but buys 10^12 shares
        assert_eq!(
            engine.place_limit_buy(Asset::Hype, d("0.01"), MAX_NOTIONAL).unwrap_err(),
            EngineError::InvalidQuantity { quantity: MAX_NOTIONAL }
        );
        for _ in 0..2 {
            assert_eq!(
                engine.place_limit_sell(Asset::Hype, d("0.50"), d("50000000000000000000000000000")).unwrap_err(),
                EngineError::InvalidQuantity { quantity: d("50000000000000000000000000000") }
            );
        }
        assert!(matches!(
            engine.market_buy(Asset::Hype, huge),
            Err(EngineError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            engine.cross_buy(Asset::Hype, MAX_NOTIONAL + d("0.01")),
            Err(EngineError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            engine.market_sell(Asset::Hype, MAX_SHARES + Decimal::ONE),
            Err(EngineError::InvalidQuantity { .. })
        ));

        assert!(engine.book().is_empty());
        assert_eq!(engine.book().peek_next_order_id(), 1);
    }

    #[test]
    fn test_accepts_quantities_at_the_bound() {
        let mut engine = MatchingEngine::new();

        engine.place_limit_sell(Asset::Hype, d("0.50"), MAX_SHARES).unwrap();
        engine.place_limit_sell(Asset::Hype, d("0.50"), MAX_SHARES).unwrap();
        engine.place_limit_buy(Asset::Flop, d("1.00"), MAX_NOTIONAL).unwrap();

        assert_eq!(engine.book().side_shares(Asset::Hype, Side::Sell), MAX_SHARES * d("2"));
        assert_eq!(engine.book().side_shares(Asset::Flop, Side::Buy), MAX_SHARES);
    }

    #[test]
    fn test_state_root_tracks_large_sizes() {
        let mut small = MatchingEngine::new();
        let mut large = MatchingEngine::new();

        small.place_limit_sell(Asset::Hype, d("0.50"), d("2000000000")).unwrap();
        large.place_limit_sell(Asset::Hype, d("0.50"), d("3000000000")).unwrap();

        assert_ne!(small.state_root(), large.state_root());
    }

    #[test]
    fn test_market_buy_dust_budget_is_invalid_quantity() {
        let dust = d("0.00001");

        // Direct route has asks, cross route has nothing
        let mut engine = MatchingEngine::new();
        engine.place_limit_sell(Asset::Hype, d("0.50"), d("10")).unwrap();
        let root = engine.state_root();
        assert_eq!(
            engine.market_buy(Asset::Hype, dust).unwrap_err(),
            EngineError::InvalidQuantity { quantity: dust }
        );
        assert_eq!(engine.state_root(), root);

        // Only the cross route has liquidity
        let mut engine = MatchingEngine::new();
        engine.place_limit_buy(Asset::Flop, d("0.70"), d("70")).unwrap();
        assert_eq!(
            engine.market_buy(Asset::Hype, dust).unwrap_err(),
            EngineError::InvalidQuantity { quantity: dust }
        );
        assert_eq!(engine.book().peek_next_order_id(), 2);
    }

    #[test]
    fn test_limit_buy_rests_when_nothing_crosses() {
        let mut engine = MatchingEngine::new();

        let outcome = engine.place_limit_buy(Asset::Hype, d("0.40"), d("10")).unwrap();

        let LimitOutcome::Resting(order) = outcome else {
            panic!("expected a resting order");
        };
        assert_eq!(order.shares, d("25"));
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(engine.order(order.id), Some(&order));
        assert_eq!(engine.best_bid(Asset::Hype), Some(d("0.40")));
    }

    #[test]
    fn test_limit_remainder_rests_as_partial() {
        let mut engine = MatchingEngine::new();
        engine.place_limit_sell(Asset::Hype, d("0.40"), d("5")).unwrap();

        let outcome = engine.place_limit_buy(Asset::Hype, d("0.40"), d("4.00")).unwrap();

        let remainder = outcome.resting_order().unwrap().clone();
        assert_eq!(remainder.shares, d("5"));
        assert_eq!(remainder.status, OrderStatus::Partial);
        assert_eq!(engine.order(remainder.id), Some(&remainder));
        assert!(engine.best_ask(Asset::Hype).is_none());
    }

    #[test]
    fn test_market_buy_prefers_cheaper_cross_route() {
        let mut engine = MatchingEngine::new();
        engine.place_limit_sell(Asset::Hype, d("0.50"), d("100")).unwrap();
        engine.place_limit_buy(Asset::Flop, d("0.70"), d("70")).unwrap();

        let receipt = engine.market_buy(Asset::Hype, d("15")).unwrap();

        assert_eq!(receipt.route, TradeKind::Cross);
        assert_eq!(receipt.final_price, d("0.30"));
        assert_eq!(receipt.total_shares, d("50"));
        // Measured against the HYPE ask that was not used
        assert_eq!(receipt.price_impact, d("-0.20"));
        // The HYPE ask is untouched
        assert_eq!(engine.book().side_shares(Asset::Hype, Side::Sell), d("100"));
    }

    #[test]
    fn test_market_buy_tie_goes_direct() {
        let mut engine = MatchingEngine::new();
        engine.place_limit_sell(Asset::Hype, d("0.30"), d("100")).unwrap();
        engine.place_limit_buy(Asset::Flop, d("0.70"), d("70")).unwrap();

        let receipt = engine.market_buy(Asset::Hype, d("3")).unwrap();

        assert_eq!(receipt.route, TradeKind::Direct);
        assert_eq!(engine.book().side_shares(Asset::Flop, Side::Buy), d("100"));
    }

    #[test]
    fn test_market_buy_falls_back_to_available_route() {
        let mut engine = MatchingEngine::new();
        engine.place_limit_buy(Asset::Flop, d("0.60"), d("60")).unwrap();

        let receipt = engine.market_buy(Asset::Hype, d("8")).unwrap();

        assert_eq!(receipt.route, TradeKind::Cross);
        assert_eq!(receipt.total_shares, d("20"));
        assert!(receipt.price_impact.is_zero());
    }

    #[test]
    fn test_market_buy_without_liquidity_fails_cleanly() {
        let mut engine = MatchingEngine::new();
        engine.place_limit_sell(Asset::Hype, d("0.50"), d("2")).unwrap();
        let root = engine.state_root();

        let err = engine.market_buy(Asset::Hype, d("100")).unwrap_err();

        assert!(matches!(err, EngineError::InsufficientLiquidity { .. }));
        assert_eq!(engine.state_root(), root);
    }

    #[test]
    fn test_market_sell_rounds_shares() {
        let mut engine = MatchingEngine::new();
        engine.place_limit_buy(Asset::Hype, d("0.50"), d("5")).unwrap();

        let receipt = engine.market_sell(Asset::Hype, d("2.00004")).unwrap();

        assert_eq!(receipt.executed_shares, d("2"));
        assert_eq!(receipt.total_revenue, d("1.00"));
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut engine = MatchingEngine::new();
        let a = engine.place_limit_sell(Asset::Hype, d("0.60"), d("1")).unwrap();
        let b = engine.place_limit_sell(Asset::Flop, d("0.60"), d("1")).unwrap();

        assert_eq!(a.resting_order().unwrap().id, 1);
        assert_eq!(b.resting_order().unwrap().id, 2);
    }
}
