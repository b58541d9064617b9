//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                   │
//! │                                                               │
//! │  In floating point:  0.1 + 0.2 = 0.30000000000000004          │
//! │                                                               │
//! │  OUR SOLUTION: Integer Cents                                  │
//! │    S/ 4.50 is stored as 450. Every monetary column in the     │
//! │    store, every total on a receipt, is an i64 cent count.     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::money::Money;
//!
//! let price = Money::from_cents(450); // S/ 4.50
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.cents(), 900);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (céntimos).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and stock corrections can produce
///   intermediate negative values; clamping happens at the rule sites
/// - **Single-field tuple struct**: zero-cost abstraction over i64
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (soles and céntimos).
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -S/ 5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity (line totals).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Subtracts `other` and clamps the result at zero.
    ///
    /// This is the `max(0, a - b)` rule the sale-commit totals use:
    /// `total = max(0, subtotal - discount)` and
    /// `change = max(0, payment - total)`.
    #[inline]
    pub const fn sub_clamped(&self, other: Money) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display for logs and debugging; external renderers do their own
/// localized formatting from the cent count.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}S/ {}.{:02}", sign, self.major().abs(), self.minor())
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

impl std::iter::Sum for Money {
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
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(4, 50).cents(), 450);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(450)), "S/ 4.50");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-S/ 5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "S/ 0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_sub_clamped_floors_at_zero() {
        let total = Money::from_cents(500);
        let discount = Money::from_cents(900);

        // Discount larger than subtotal never drives the total negative.
        assert_eq!(total.sub_clamped(discount), Money::zero());
        assert_eq!(
            Money::from_cents(2000).sub_clamped(Money::from_cents(100)).cents(),
            1900
        );
    }

    #[test]
    fn test_sum() {
        let total: Money = [450, 450, 1100]
            .iter()
            .map(|c| Money::from_cents(*c))
            .sum();
        assert_eq!(total.cents(), 2000);
    }
}
