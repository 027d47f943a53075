//! Price level management for orders at the same price.
//!
//! ## Design
//!
//! A `PriceLevel` holds every resting order at one price for one
//! (asset, side). Orders form a doubly-linked FIFO list threaded through the
//! slab, so insertion order is the tie-break among equal prices.
//!
//! ## Queue Structure
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! - New orders and remainders are appended at the tail
//! - Matching consumes orders from the head
//! - Any order can be unlinked in O(1) using its slab key

use rust_decimal::Decimal;
use slab::Slab;

use crate::orderbook::OrderNode;

/// A price level containing orders at a single price.
///
/// The order data lives in the slab; this struct only holds queue metadata.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: Decimal,

    /// Total remaining shares at this level
    pub total_shares: Decimal,

    /// Head of the order queue (oldest order, slab key)
    pub head: Option<usize>,

    /// Tail of the order queue (newest order, slab key)
    pub tail: Option<usize>,

    pub order_count: usize,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            total_shares: Decimal::ZERO,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append an order to the tail of the queue
    ///
    /// # Panics
    ///
    /// Panics if the key doesn't exist in the slab
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let node = slab.get_mut(key).expect("Invalid slab key");
        let shares = node.shares();

        node.prev = self.tail;
        node.next = None;

        if let Some(tail_key) = self.tail {
            let tail_node = slab.get_mut(tail_key).expect("Invalid tail key");
            tail_node.next = Some(key);
        } else {
            // Empty list - this is also the head
            self.head = Some(key);
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_shares += shares;
    }

    /// Unlink an order from the queue by slab key
    ///
    /// # Returns
    ///
    /// The remaining shares of the unlinked order
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Decimal {
        let node = slab.get(key).expect("Invalid slab key");
        let shares = node.shares();
        let prev_key = node.prev;
        let next_key = node.next;

        if let Some(prev) = prev_key {
            let prev_node = slab.get_mut(prev).expect("Invalid prev key");
            prev_node.next = next_key;
        } else {
            self.head = next_key;
        }

        if let Some(next) = next_key {
            let next_node = slab.get_mut(next).expect("Invalid next key");
            next_node.prev = prev_key;
        } else {
            self.tail = prev_key;
        }

        let node = slab.get_mut(key).expect("Invalid slab key");
        node.prev = None;
        node.next = None;

        self.order_count -= 1;
        self.total_shares = (self.total_shares - shares).max(Decimal::ZERO);

        shares
    }

    /// Update the total after a partial fill
    pub fn reduce_shares(&mut self, filled: Decimal) {
        self.total_shares = (self.total_shares - filled).max(Decimal::ZERO);
    }

    /// Walk the queue from head to tail
    pub fn iter<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            slab,
            cursor: self.head,
        }
    }
}

/// Iterator over the slab keys of one price level, oldest first.
pub struct LevelIter<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let key = self.cursor?;
        self.cursor = self.slab.get(key).and_then(|node| node.next);
        Some(key)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
