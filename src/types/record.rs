//! Fixed-point order records and the book state root.
//!
//! ## SSZ Serialization
//!
//! Records derive `SimpleSerialize` from ssz_rs. Every field is a basic type,
//! so the encoding is a fixed-size little-endian concatenation and identical
//! books always produce identical bytes.
//!
//! ## State Root
//!
//! The state root is the SHA-256 of the concatenated record encodings, in the
//! order the book lists its resting orders.

use ssz_rs::prelude::*;
use sha2::{Digest, Sha256};

/// Fixed-point order record.
///
/// ## SSZ Layout
///
/// 8 (id) + 1 + 1 + 1 (side/asset/status) + 8 (price) + 8 (shares) = 27 bytes
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct OrderRecord {
    pub id: u64,
    pub side_raw: u8,
    pub asset_raw: u8,
    pub status_raw: u8,
    /// Price scaled by 10^8
    pub price: u64,
    /// Remaining shares scaled by 10^8
    pub shares: u64,
}

/// SHA-256 over the SSZ encoding of each record, in iteration order.
///
/// A record that fails to encode contributes nothing; with fixed-size basic
/// fields this does not happen in practice.
pub fn compute_state_root<'a, I>(records: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut hasher = Sha256::new();
    for record in records {
        if let Ok(bytes) = ssz_rs::serialize(record) {
            hasher.update(&bytes);
        }
    }

    let mut root = [0u8; 32];
    root.copy_from_slice(&hasher.finalize());
    root
}

// ============================================================================
// Unit Tests
// ============================================================================
