//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  subtotal * 0.11 in floating point drifts as soon as the subtotal is    │
//! │  not a round number, and the drift ends up persisted on the sale row.   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + basis-point tax rates              │
//! │    56000 × 1100 bps = 6160 exactly, rounded half-up when it is not     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vorca_core::money::Money;
//!
//! let price = Money::from_minor(28_000);
//! let line = price.checked_mul_quantity(2).unwrap();
//! assert_eq!(line.minor(), 56_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of the store currency.
///
/// ## Design Decisions
/// - **i64 (signed)**: a sale total may legitimately go negative when the
///   discount exceeds subtotal + tax, so the type must carry a sign
/// - **Transparent**: serialises as a bare integer and is stored as INTEGER
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use vorca_core::money::Money;
    ///
    /// let americano = Money::from_minor(28_000);
    /// assert_eq!(americano.minor(), 28_000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax at a flat rate, rounding half-up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, widened to i128 so that
    /// large subtotals cannot overflow mid-calculation.
    ///
    /// ## Example
    /// ```rust
    /// use vorca_core::money::Money;
    /// use vorca_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_minor(56_000);
    /// assert_eq!(subtotal.calculate_tax(TaxRate::from_bps(1100)).minor(), 6_160);
    ///
    /// // 12_345 × 11% = 1357.95 → 1358
    /// assert_eq!(Money::from_minor(12_345).calculate_tax(TaxRate::from_bps(1100)).minor(), 1_358);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(tax as i64)
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Rupiah-style display with `.` thousands separators (debugging and logs).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "{}Rp {}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_minor(62_160).to_string(), "Rp 62.160");
        assert_eq!(Money::from_minor(500).to_string(), "Rp 500");
        assert_eq!(Money::from_minor(-1_250_000).to_string(), "-Rp 1.250.000");
        assert_eq!(Money::zero().to_string(), "Rp 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }

    #[test]
    fn test_flat_eleven_percent_tax() {
        let rate = TaxRate::from_bps(1100);
        assert_eq!(Money::from_minor(56_000).calculate_tax(rate).minor(), 6_160);
        // 50 × 11% = 5.5 → rounds half-up to 6
        assert_eq!(Money::from_minor(50).calculate_tax(rate).minor(), 6);
        assert_eq!(Money::zero().calculate_tax(rate).minor(), 0);
    }

    #[test]
    fn test_checked_operations_detect_overflow() {
        assert_eq!(
            Money::from_minor(28_000).checked_mul_quantity(3),
            Some(Money::from_minor(84_000))
        );
        assert!(Money::from_minor(i64::MAX).checked_mul_quantity(2).is_none());
        assert!(Money::from_minor(i64::MAX)
            .checked_add(Money::from_minor(1))
            .is_none());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_minor(1).is_positive());
        assert!(Money::from_minor(-1).is_negative());
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_minor(62_160)).unwrap();
        assert_eq!(json, "62160");
    }
}
