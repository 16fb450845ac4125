//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In binary floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  Worse, rounding intermediate results compounds:                    │
//! │    subtotal → round → discount → round → tax → round                │
//! │    Each step can drift the total by a cent.                         │
//! │                                                                     │
//! │  OUR SOLUTION: exact decimals, one rounding point                   │
//! │    All arithmetic runs at full precision (rust_decimal).            │
//! │    Banker's rounding to 2 decimal places is applied exactly once,   │
//! │    when a value is formatted for display.                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! let price: Money = "10.99".parse().unwrap();
//! let line_total = price * 3;
//! assert_eq!(line_total.to_string(), "32.97");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::types::Percentage;

/// Decimal places carried by every displayed/persisted-for-display amount.
pub const CURRENCY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value, exact to arbitrary decimal precision.
///
/// ## Design Decisions
/// - **Newtype over `Decimal`**: every monetary value in the system flows
///   through this type, so unit mix-ups (quantity × quantity) can't compile
/// - **Signed**: negative values appear for refunds and change calculations
/// - **No rounding in arithmetic**: `rounded()` is for the display boundary
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a raw decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_major(100); // 100.00
    /// assert_eq!(price.to_string(), "100.00");
    /// ```
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Returns the raw, full-precision amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns the amount rounded to [`CURRENCY_SCALE`] decimal places using
    /// banker's rounding (round half to even).
    ///
    /// ## Banker's Rounding
    /// Standard rounding always rounds 0.5 up, which over many transactions
    /// introduces a systematic upward bias. Round-half-to-even alternates
    /// (0.125 → 0.12, 0.135 → 0.14) and cancels the bias out. This is the
    /// single rounding rule of the whole system, and it is applied only here
    /// and in the [`crate::format`] functions built on top of it.
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointNearestEven)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let unit_price: Money = "2.99".parse().unwrap();
    /// assert_eq!(unit_price.multiply_quantity(3).to_string(), "8.97");
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns the given percentage of this amount, at full precision.
    ///
    /// Used for cart-level discount and tax math: the result is NOT rounded,
    /// so `subtotal - discount + tax` stays exact across the whole chain.
    #[inline]
    pub fn percentage_of(&self, pct: Percentage) -> Self {
        Money(self.0 * pct.fraction())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the amount rounded to two decimal places, without a currency
/// label ("330.75"). Use [`crate::format::format_currency`] for labelled,
/// digit-grouped output.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Parses a bare decimal amount ("10.99"). No currency label, no grouping.
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
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

/// Multiplication by quantity (line totals).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(money("10.99").to_string(), "10.99");
        assert_eq!(money("5").to_string(), "5.00");
        assert_eq!(money("-5.5").to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_is_exact() {
        // The classic float failure: 0.1 + 0.2
        assert_eq!(money("0.1") + money("0.2"), money("0.3"));

        let a = money("10.00");
        let b = money("5.00");
        assert_eq!((a + b).to_string(), "15.00");
        assert_eq!((a - b).to_string(), "5.00");
        assert_eq!((a * 3).to_string(), "30.00");
    }

    #[test]
    fn test_display_uses_bankers_rounding() {
        // Midpoints round to the even neighbour
        assert_eq!(money("0.125").to_string(), "0.12");
        assert_eq!(money("0.135").to_string(), "0.14");
        // Non-midpoints round normally
        assert_eq!(money("0.126").to_string(), "0.13");
    }

    #[test]
    fn test_full_precision_survives_arithmetic() {
        // Display rounds, the underlying amount does not
        let third = money("10.00").percentage_of(Percentage::new(Decimal::from(33)).unwrap());
        assert_eq!(third.amount().to_string(), "3.3000");
        assert_eq!(third.to_string(), "3.30");
    }

    #[test]
    fn test_percentage_of() {
        let subtotal = money("350.00");
        let pct = Percentage::new(Decimal::from(10)).unwrap();
        assert_eq!(subtotal.percentage_of(pct), money("35.00"));
    }

    #[test]
    fn test_sum() {
        let total: Money = [money("1.10"), money("2.20"), money("3.30")]
            .into_iter()
            .sum();
        assert_eq!(total, money("6.60"));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_positive());
        assert!(!Money::zero().is_negative());
        assert!(money("0.01").is_positive());
        assert!(money("-0.01").is_negative());
        assert_eq!(money("-5.50").abs(), money("5.50"));
    }
}
