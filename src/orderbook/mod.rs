//! Order book for the HYPE/FLOP market.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **Price levels**: one `BTreeMap` per (asset, side)
//! - **Price-time priority**: FIFO ordering at each price level
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus linked-list pointers for its price level
//! - [`PriceLevel`]: the FIFO queue of orders at one price
//! - [`Book`]: both assets, both sides
//!
//! ## Performance
//!
//! | Operation                 | Complexity |
//! |---------------------------|------------|
//! | Insert order / remainder  | O(log n)   |
//! | Fill or evict by key      | O(log n)   |
//! | Best bid/ask              | O(log n)   |
//! | Walk one side in priority | O(k)       |

pub mod node;
pub mod level;
pub mod book;

pub use node::OrderNode;
pub use level::{LevelIter, PriceLevel};
pub use book::{Book, DepthLevel};
