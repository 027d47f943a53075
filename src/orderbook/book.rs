//! The live book of resting HYPE and FLOP orders.
//!
//! ## Architecture
//!
//! - **Slab**: pre-allocated storage for every resting order
//! - **BTreeMap per (asset, side)**: sorted price levels
//! - **HashMap**: order id to slab key
//!
//! ## Price Ordering
//!
//! - **Bids** (buy orders): high-to-low, best bid first
//! - **Asks** (sell orders): low-to-high, best ask first
//!
//! Within a level, orders keep their arrival order. The ordering is carried
//! by the structure itself, so inserting an order or a remainder never needs
//! a re-sort.
//!
//! ## Invariants
//!
//! - No executed order is ever stored; a fill that exhausts an order evicts
//!   it in the same call.
//! - Every level's `total_shares` equals the sum of its orders' shares.
//!
//! ## Example
//!
//! ```
//! use hypeflop::orderbook::Book;
//! use hypeflop::types::{Asset, Order, Side};
//! use rust_decimal::Decimal;
//!
//! let mut book = Book::with_capacity(1_000);
//!
//! let id = book.next_order_id();
//! book.insert(Order::limit_sell(id, Asset::Hype, Decimal::new(40, 2), Decimal::from(10)));
//! let id = book.next_order_id();
//! book.insert(Order::limit_buy(id, Asset::Hype, Decimal::new(35, 2), Decimal::from(7)));
//!
//! assert_eq!(book.best_ask(Asset::Hype), Some(Decimal::new(40, 2)));
//! assert_eq!(book.best_bid(Asset::Hype), Some(Decimal::new(35, 2)));
//! assert_eq!(book.spread(Asset::Hype), Some(Decimal::new(5, 2)));
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use slab::Slab;

use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::price::{is_valid_shares, MAX_PRICE};
use crate::types::record::{compute_state_root, OrderRecord};
use crate::types::{Asset, Order, Side};

/// Bids and asks for one asset
#[derive(Debug, Default)]
struct AssetBook {
    /// Keyed by Reverse(price) so iteration is best (highest) first
    bids: BTreeMap<Reverse<Decimal>, PriceLevel>,

    /// Keyed by price so iteration is best (lowest) first
    asks: BTreeMap<Decimal, PriceLevel>,

    bid_count: usize,
    ask_count: usize,
}

impl AssetBook {
    fn level_mut(&mut self, side: Side, price: Decimal) -> Option<&mut PriceLevel> {
        match side {
            Side::Buy => self.bids.get_mut(&Reverse(price)),
            Side::Sell => self.asks.get_mut(&price),
        }
    }

    fn levels(&self, side: Side) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match side {
            Side::Buy => Box::new(self.bids.values()),
            Side::Sell => Box::new(self.asks.values()),
        }
    }
}

/// Aggregated shares at one price
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthLevel {
    pub price: Decimal,
    pub shares: Decimal,
    pub order_count: usize,
}

/// The order book for the HYPE/FLOP market
#[derive(Debug)]
pub struct Book {
    /// Key: slab index, Value: OrderNode
    orders: Slab<OrderNode>,

    /// Indexed by `Asset::index()`
    books: [AssetBook; 2],

    /// Order ID to slab key mapping
    order_index: HashMap<u64, usize>,

    next_order_id: u64,

    next_trade_id: u64,
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Book {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with pre-allocated capacity
    ///
    /// ```
    /// use hypeflop::orderbook::Book;
    ///
    /// let book = Book::with_capacity(10_000);
    /// assert!(book.capacity() >= 10_000);
    /// ```
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            books: [AssetBook::default(), AssetBook::default()],
            order_index: HashMap::with_capacity(order_capacity),
            next_order_id: 1,
            next_trade_id: 1,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Total number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn bid_count(&self, asset: Asset) -> usize {
        self.books[asset.index()].bid_count
    }

    #[inline]
    pub fn ask_count(&self, asset: Asset) -> usize {
        self.books[asset.index()].ask_count
    }

    #[inline]
    pub fn bid_levels(&self, asset: Asset) -> usize {
        self.books[asset.index()].bids.len()
    }

    #[inline]
    pub fn ask_levels(&self, asset: Asset) -> usize {
        self.books[asset.index()].asks.len()
    }

    // ========================================================================
    // ID Generation
    // ========================================================================

    /// Allocate the next order ID
    #[inline]
    pub fn next_order_id(&mut self) -> u64 {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    /// Get the current next order ID (without incrementing)
    #[inline]
    pub fn peek_next_order_id(&self) -> u64 {
        self.next_order_id
    }

    /// Allocate the next trade ID
    #[inline]
    pub fn next_trade_id(&mut self) -> u64 {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        id
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Rest an order at the tail of its price level
    ///
    /// An order with id 0 gets the next id. Executed or empty orders are
    /// refused, so the book never holds a terminal order. So are share
    /// counts above [`MAX_SHARES`](crate::types::price::MAX_SHARES) and prices outside (0, 1], which keeps
    /// every resting order exactly encodable for the state root.
    ///
    /// # Returns
    ///
    /// The slab key, or `None` if the order was refused
    pub fn insert(&mut self, mut order: Order) -> Option<usize> {
        if order.is_executed()
            || !is_valid_shares(order.shares)
            || order.price <= Decimal::ZERO
            || order.price > MAX_PRICE
        {
            return None;
        }

        if order.id == 0 {
            order.id = self.next_order_id();
        }

        let order_id = order.id;
        let price = order.price;
        let side = order.side;
        let asset_book = &mut self.books[order.asset.index()];

        let key = self.orders.insert(OrderNode::new(order));
        self.order_index.insert(order_id, key);

        match side {
            Side::Buy => {
                asset_book
                    .bids
                    .entry(Reverse(price))
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(key, &mut self.orders);
                asset_book.bid_count += 1;
            }
            Side::Sell => {
                asset_book
                    .asks
                    .entry(price)
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(key, &mut self.orders);
                asset_book.ask_count += 1;
            }
        }

        Some(key)
    }

    /// Remove an order by slab key
    ///
    /// # Returns
    ///
    /// The removed order, or None if not found
    pub fn remove(&mut self, key: usize) -> Option<Order> {
        let node = self.orders.get(key)?;
        let order_id = node.order_id();
        let price = node.price();
        let side = node.order.side;
        let asset_book = &mut self.books[node.order.asset.index()];

        match side {
            Side::Buy => {
                if let Some(level) = asset_book.bids.get_mut(&Reverse(price)) {
                    level.remove(key, &mut self.orders);
                    asset_book.bid_count -= 1;

                    if level.is_empty() {
                        asset_book.bids.remove(&Reverse(price));
                    }
                }
            }
            Side::Sell => {
                if let Some(level) = asset_book.asks.get_mut(&price) {
                    level.remove(key, &mut self.orders);
                    asset_book.ask_count -= 1;

                    if level.is_empty() {
                        asset_book.asks.remove(&price);
                    }
                }
            }
        }

        self.order_index.remove(&order_id);

        Some(self.orders.remove(key).order)
    }

    /// Consume `shares` from a resting order
    ///
    /// The order moves to `partial`, or to `executed` and is evicted in the
    /// same call.
    ///
    /// # Returns
    ///
    /// A copy of the order after the fill, or None if the key is unknown
    pub fn fill(&mut self, key: usize, shares: Decimal) -> Option<Order> {
        let node = self.orders.get_mut(key)?;
        let filled = node.fill(shares);
        let order = node.order.clone();

        if let Some(level) = self.books[order.asset.index()].level_mut(order.side, order.price) {
            level.reduce_shares(filled);
        }

        if order.is_executed() {
            self.remove(key);
        }

        Some(order)
    }

    /// Get an order by slab key
    #[inline]
    pub fn get(&self, key: usize) -> Option<&Order> {
        self.orders.get(key).map(|node| &node.order)
    }

    /// Get an order by its id
    pub fn get_by_id(&self, order_id: u64) -> Option<&Order> {
        self.key_of(order_id).and_then(|key| self.get(key))
    }

    /// Get the slab key for an order ID
    #[inline]
    pub fn key_of(&self, order_id: u64) -> Option<usize> {
        self.order_index.get(&order_id).copied()
    }

    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    // ========================================================================
    // Best Bid/Ask
    // ========================================================================

    /// Highest resting buy price for `asset`
    #[inline]
    pub fn best_bid(&self, asset: Asset) -> Option<Decimal> {
        self.books[asset.index()].bids.keys().next().map(|r| r.0)
    }

    /// Lowest resting sell price for `asset`
    #[inline]
    pub fn best_ask(&self, asset: Asset) -> Option<Decimal> {
        self.books[asset.index()].asks.keys().next().copied()
    }

    /// `best_ask - best_bid`, or None if either side is empty or crossed
    pub fn spread(&self, asset: Asset) -> Option<Decimal> {
        match (self.best_bid(asset), self.best_ask(asset)) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    // ========================================================================
    // Ordered Views (for the matching engine)
    // ========================================================================

    /// Resting orders of one (asset, side), best price first, oldest first
    /// within a price
    pub fn iter_side(&self, asset: Asset, side: Side) -> impl Iterator<Item = (usize, &Order)> + '_ {
        self.books[asset.index()]
            .levels(side)
            .flat_map(move |level| level.iter(&self.orders))
            .filter_map(move |key| self.get(key).map(|order| (key, order)))
    }

    /// Total resting shares on one (asset, side)
    pub fn side_shares(&self, asset: Asset, side: Side) -> Decimal {
        self.books[asset.index()]
            .levels(side)
            .map(|level| level.total_shares)
            .sum()
    }

    /// Total resting notional on one (asset, side)
    pub fn side_notional(&self, asset: Asset, side: Side) -> Decimal {
        self.iter_side(asset, side).map(|(_, order)| order.notional()).sum()
    }

    /// Aggregated shares for the best `levels` prices of one (asset, side)
    pub fn depth(&self, asset: Asset, side: Side, levels: usize) -> Vec<DepthLevel> {
        self.books[asset.index()]
            .levels(side)
            .take(levels)
            .map(|level| DepthLevel {
                price: level.price,
                shares: level.total_shares,
                order_count: level.order_count,
            })
            .collect()
    }

    /// Every resting order: all sells ascending by price, then all buys
    /// descending by price, arrival order within a price
    pub fn open_orders(&self) -> Vec<Order> {
        let mut sells: Vec<Order> = Vec::with_capacity(self.orders.len());
        let mut buys: Vec<Order> = Vec::with_capacity(self.orders.len());

        for node in self.orders.iter().map(|(_, node)| node) {
            match node.order.side {
                Side::Sell => sells.push(node.order.clone()),
                Side::Buy => buys.push(node.order.clone()),
            }
        }

        sells.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
        buys.sort_by(|a, b| b.price.cmp(&a.price).then(a.id.cmp(&b.id)));

        sells.extend(buys);
        sells
    }

    // ========================================================================
    // State Root
    // ========================================================================

    /// SHA-256 over the SSZ records of every resting order, in
    /// [`open_orders`](Self::open_orders) order
    pub fn state_root(&self) -> [u8; 32] {
        let records: Vec<OrderRecord> = self
            .open_orders()
            .iter()
            .map(|order| order.to_record().expect("resting order within MAX_SHARES"))
            .collect();
        compute_state_root(&records)
    }

    /// Clear all orders from the book. Id counters keep running.
    pub fn clear(&mut self) {
        self.orders.clear();
        self.books = [AssetBook::default(), AssetBook::default()];
        self.order_index.clear();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
