//! Two-phase execution: plan against a read-only book, then commit.
//!
//! Every algorithm first walks the book immutably and records the fills it
//! would make in a [`FillPlan`]. Only a plan that satisfies the request is
//! committed, so a failed market order never leaves partial effects behind.

use rust_decimal::Decimal;
use tracing::debug;

use crate::orderbook::Book;
use crate::types::price::{self, round_price};
use crate::types::{Asset, Order, Trade, TradeKind};

/// One fill the plan intends to make against a resting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFill {
    /// Slab key of the maker; valid until the book is next mutated
    pub key: usize,
    pub maker_order_id: u64,
    pub maker_asset: Asset,
    pub maker_price: Decimal,
    pub shares: Decimal,
}

/// An ordered list of fills plus running totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPlan {
    pub kind: TradeKind,
    pub fills: Vec<PlannedFill>,

    pub total_shares: Decimal,

    /// Σ shares × execution price, unrounded
    pub total_value: Decimal,

    /// Execution price of the last fill, 0 for an empty plan
    pub final_price: Decimal,
}

impl FillPlan {
    pub fn new(kind: TradeKind) -> Self {
        Self {
            kind,
            fills: Vec::new(),
            total_shares: Decimal::ZERO,
            total_value: Decimal::ZERO,
            final_price: Decimal::ZERO,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Price per share seen by the taker for a fill against `maker`
    #[inline]
    pub fn execution_price(&self, maker: &Order) -> Decimal {
        match self.kind {
            TradeKind::Direct => maker.price,
            TradeKind::Cross => price::complement(maker.price),
        }
    }

    /// Record a fill of `shares` against `maker` (stored at slab `key`)
    pub fn push(&mut self, key: usize, maker: &Order, shares: Decimal) {
        let execution_price = self.execution_price(maker);

        self.fills.push(PlannedFill {
            key,
            maker_order_id: maker.id,
            maker_asset: maker.asset,
            maker_price: maker.price,
            shares,
        });
        self.total_shares += shares;
        self.total_value += shares * execution_price;
        self.final_price = execution_price;
    }

    /// `total_value / total_shares` rounded to 4 places, 0 without fills
    pub fn average_price(&self) -> Decimal {
        if self.total_shares.is_zero() {
            Decimal::ZERO
        } else {
            round_price(self.total_value / self.total_shares)
        }
    }

    /// Apply every fill to the book and emit the trades
    ///
    /// Must run against the same, unmodified book the plan was built from.
    ///
    /// # Panics
    ///
    /// Panics if a planned maker is no longer in the book
    pub fn commit(&self, book: &mut Book, taker_order_id: u64) -> Vec<Trade> {
        let mut trades = Vec::with_capacity(self.fills.len());

        for fill in &self.fills {
            let maker = book
                .fill(fill.key, fill.shares)
                .expect("fill plan committed against a stale book");
            debug_assert_eq!(maker.id, fill.maker_order_id);

            let trade_id = book.next_trade_id();
            let trade = match self.kind {
                TradeKind::Direct => Trade::direct(
                    trade_id,
                    fill.maker_order_id,
                    taker_order_id,
                    fill.maker_asset,
                    fill.maker_price,
                    fill.shares,
                ),
                TradeKind::Cross => Trade::cross(
                    trade_id,
                    fill.maker_order_id,
                    taker_order_id,
                    fill.maker_asset,
                    fill.maker_price,
                    fill.shares,
                ),
            };

            debug!(
                trade_id,
                maker = fill.maker_order_id,
                taker = taker_order_id,
                asset = %fill.maker_asset,
                price = %trade.price,
                shares = %fill.shares,
                maker_status = ?maker.status,
                "fill"
            );
            trades.push(trade);
        }

        trades
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
