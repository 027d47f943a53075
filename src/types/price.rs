//! Price, share and notional arithmetic.
//!
//! ## Overview
//!
//! Every quantity in the engine is a [`Decimal`]. Floating point never
//! enters the matching path, so identical inputs produce identical fills on
//! every machine.
//!
//! ## Rounding
//!
//! | Quantity         | Places | Helper              |
//! |------------------|--------|---------------------|
//! | Shares           | 4      | [`round_shares`]    |
//! | Notional/revenue | 2      | [`round_notional`]  |
//! | Average price    | 4      | [`round_price`]     |
//!
//! Rounding is half-away-from-zero (`0.00005 -> 0.0001`), not banker's.
//!
//! ## Fixed-Point Bridge
//!
//! The state root encodes orders as `u64` scaled by 10^8. [`to_fixed`] and
//! [`from_fixed`] convert between the two representations.
//!
//! ```
//! use hypeflop::types::price::{to_fixed, from_fixed, round_shares};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let price = Decimal::from_str("0.35").unwrap();
//! assert_eq!(to_fixed(price), Some(35_000_000));
//! assert_eq!(from_fixed(35_000_000), price);
//!
//! let shares = Decimal::from_str("3.33335").unwrap();
//! assert_eq!(round_shares(shares), Decimal::from_str("3.3334").unwrap());
//! ```

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

/// Scaling factor for fixed-point encoding: 10^8
pub const SCALE: u64 = 100_000_000;

/// Decimal places kept on share quantities
pub const SHARE_DP: u32 = 4;

/// Decimal places kept on notional amounts
pub const NOTIONAL_DP: u32 = 2;

/// Decimal places kept on reported average prices
pub const PRICE_DP: u32 = 4;

/// Price granularity accepted at the boundary (0.01)
pub const TICK: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Highest valid price. A HYPE/FLOP share never trades above 1.
pub const MAX_PRICE: Decimal = Decimal::ONE;

/// Largest share count an order may carry (10^10). Keeps every resting
/// quantity exactly representable in the 10^8 fixed-point record.
pub const MAX_SHARES: Decimal = Decimal::from_parts(0x540B_E400, 2, 0, false, 0);

/// Largest notional a single request may commit (10^10)
pub const MAX_NOTIONAL: Decimal = Decimal::from_parts(0x540B_E400, 2, 0, false, 0);

// ============================================================================
// Rounding
// ============================================================================

#[inline]
fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a share quantity to 4 decimal places
#[inline]
pub fn round_shares(value: Decimal) -> Decimal {
    round_half_up(value, SHARE_DP)
}

/// Round a notional amount to 2 decimal places
#[inline]
pub fn round_notional(value: Decimal) -> Decimal {
    round_half_up(value, NOTIONAL_DP)
}

/// Round a derived (average/final) price to 4 decimal places
#[inline]
pub fn round_price(value: Decimal) -> Decimal {
    round_half_up(value, PRICE_DP)
}

/// Notional value of `shares` at `price`, rounded to 2 places
#[inline]
pub fn notional(shares: Decimal, price: Decimal) -> Decimal {
    round_notional(shares * price)
}

/// Shares bought by spending `amount` at `price`, rounded to 4 places
///
/// Returns zero for a non-positive price rather than dividing by zero.
#[inline]
pub fn shares_for(amount: Decimal, price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_shares(amount / price)
}

/// Price of the complementary outcome: a HYPE price `p` is a FLOP price `1 - p`
#[inline]
pub fn complement(price: Decimal) -> Decimal {
    MAX_PRICE - price
}

// ============================================================================
// Validation
// ============================================================================

/// Check that a price lies in (0, 1] on the 0.01 grid
///
/// ```
/// use hypeflop::types::price::is_valid_price;
/// use rust_decimal::Decimal;
///
/// assert!(is_valid_price(Decimal::new(40, 2)));
/// assert!(is_valid_price(Decimal::ONE));
/// assert!(!is_valid_price(Decimal::ZERO));
/// assert!(!is_valid_price(Decimal::new(405, 3)));
/// ```
pub fn is_valid_price(price: Decimal) -> bool {
    price > Decimal::ZERO && price <= MAX_PRICE && (price % TICK).is_zero()
}

/// Check that a share count lies in (0, MAX_SHARES]
#[inline]
pub fn is_valid_shares(shares: Decimal) -> bool {
    shares > Decimal::ZERO && shares <= MAX_SHARES
}

/// Check that a notional amount lies in (0, MAX_NOTIONAL]
#[inline]
pub fn is_valid_notional(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= MAX_NOTIONAL
}

// ============================================================================
// Fixed-Point Bridge
// ============================================================================

/// Convert a Decimal to fixed-point u64 (scaled by 10^8)
///
/// Returns `None` for negative values or values that overflow u64.
pub fn to_fixed(value: Decimal) -> Option<u64> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }

    let scaled = value.checked_mul(Decimal::from(SCALE))?;
    scaled.round_dp(0).to_u64()
}

/// Convert a fixed-point u64 back to a Decimal
pub fn from_fixed(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_tick_constant() {
        assert_eq!(TICK, d("0.01"));
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(round_shares(d("1.00005")), d("1.0001"));
        assert_eq!(round_shares(d("1.00015")), d("1.0002"));
        assert_eq!(round_notional(d("0.125")), d("0.13"));
        assert_eq!(round_notional(d("0.135")), d("0.14"));
        assert_eq!(round_price(d("0.333333")), d("0.3333"));
    }

    #[test]
    fn test_notional() {
        assert_eq!(notional(d("10"), d("0.40")), d("4.00"));
        assert_eq!(notional(d("3.3333"), d("0.30")), d("1.00"));
    }

    #[test]
    fn test_shares_for() {
        assert_eq!(shares_for(d("2.00"), d("0.40")), d("5"));
        assert_eq!(shares_for(d("1.00"), d("0.30")), d("3.3333"));
        assert_eq!(shares_for(d("1.00"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_complement() {
        assert_eq!(complement(d("0.70")), d("0.30"));
        assert_eq!(complement(Decimal::ONE), Decimal::ZERO);
    }

    #[test]
    fn test_price_validation() {
        assert!(is_valid_price(d("0.01")));
        assert!(is_valid_price(d("0.99")));
        assert!(is_valid_price(d("1.00")));
        assert!(!is_valid_price(d("0")));
        assert!(!is_valid_price(d("-0.10")));
        assert!(!is_valid_price(d("1.01")));
        assert!(!is_valid_price(d("0.015")));
    }

    #[test]
    fn test_quantity_bounds() {
        assert_eq!(MAX_SHARES, d("10000000000"));
        assert_eq!(MAX_NOTIONAL, d("10000000000"));

        assert!(is_valid_shares(d("0.0001")));
        assert!(is_valid_shares(MAX_SHARES));
        assert!(!is_valid_shares(Decimal::ZERO));
        assert!(!is_valid_shares(MAX_SHARES + d("0.0001")));
        assert!(!is_valid_notional(d("-1")));
        assert!(!is_valid_notional(Decimal::MAX));

        // The largest share count still encodes exactly
        assert_eq!(to_fixed(MAX_SHARES), Some(1_000_000_000_000_000_000));
    }

    #[test]
    fn test_fixed_roundtrip() {
        assert_eq!(to_fixed(d("1")), Some(SCALE));
        assert_eq!(to_fixed(d("0.0001")), Some(10_000));
        assert_eq!(to_fixed(d("-1")), None);
        assert_eq!(from_fixed(to_fixed(d("12.3456")).unwrap()), d("12.3456"));
    }
}
