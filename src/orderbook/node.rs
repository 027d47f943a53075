//! Order node for slab-based storage.
//!
//! ## Design
//!
//! `OrderNode` wraps an `Order` with doubly-linked list pointers so it can
//! be unlinked from its price level in O(1) once the slab key is known.
//!
//! ## Linked List
//!
//! Orders at the same price level form a doubly-linked list:
//! - `next`: the next (newer) order in the price level
//! - `prev`: the previous (older) order in the price level

use rust_decimal::Decimal;

use crate::types::Order;

/// Order node stored in the slab.
///
/// The pointers are slab keys (`usize`), not references.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The actual order data
    pub order: Order,

    /// Next order in the price level queue (slab key)
    /// None if this is the tail (newest order)
    pub next: Option<usize>,

    /// Previous order in the price level queue (slab key)
    /// None if this is the head (oldest order)
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Create a new order node (not yet linked)
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    #[inline]
    pub fn price(&self) -> Decimal {
        self.order.price
    }

    /// Remaining shares
    #[inline]
    pub fn shares(&self) -> Decimal {
        self.order.shares
    }

    /// Consume up to `shares`, returning what was actually consumed
    #[inline]
    pub fn fill(&mut self, shares: Decimal) -> Decimal {
        self.order.fill(shares)
    }

    #[inline]
    pub fn is_executed(&self) -> bool {
        self.order.is_executed()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
