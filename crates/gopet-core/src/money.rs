//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A grooming package priced $45.99 × 2 at 8.5% tax:                      │
//! │    91.98 * 0.085 = 7.818299999999999  → which cent is the tax?          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    9198 cents × 850 bps = 7818300 → rounds to 782 cents, exactly once  │
//! │    Every rounding decision happens in ONE place, explicitly            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gopet_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(4599); // $45.99
//!
//! // Arithmetic operations
//! let line = price * 2;                       // $91.98
//! let with_fee = line + Money::from_cents(500); // $96.98
//!
//! // NEVER do this:
//! // let bad = Money::from_float(45.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and discrepancies
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CartLine.unit_price ──► line_total ──► Cart subtotal                  │
/// │                                              │                          │
/// │                      discount resolution ◄───┤                          │
/// │                                              ▼                          │
/// │  Register balance ◄── Transaction.total ◄── tax on discounted subtotal │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use gopet_core::money::Money;
    ///
    /// let price = Money::from_cents(4599); // Represents $45.99
    /// assert_eq!(price.cents(), 4599);
    /// ```
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use cents.
    /// Only the UI converts to dollars for display.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use gopet_core::money::Money;
    ///
    /// let price = Money::from_major_minor(45, 99); // $45.99
    /// assert_eq!(price.cents(), 4599);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the smaller of two Money values.
    ///
    /// Used by the discount resolver to clamp a fixed discount to the
    /// cart subtotal so a $20-off coupon on a $15 nail trim never drives
    /// the taxable base negative.
    #[inline]
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Subtracts, clamping the result at zero.
    ///
    /// ## Example
    /// ```rust
    /// use gopet_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(1500);
    /// let discount = Money::from_cents(2000);
    /// assert_eq!(subtotal.saturating_sub(discount).cents(), 0);
    /// ```
    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// ## Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  Integer math: (amount_cents * bps + 5000) / 10000                  │
    /// │                                                                     │
    /// │  The +5000 rounds the half-cent up (5000/10000 = 0.5), so          │
    /// │  $91.98 at 8.50% = 781.83 cents → 782 cents ($7.82)                │
    /// │                                                                     │
    /// │  One rounding decision, made here, never re-made downstream        │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use gopet_core::money::Money;
    /// use gopet_core::types::TaxRate;
    ///
    /// let base = Money::from_cents(9198); // $91.98
    /// let rate = TaxRate::from_bps(850);  // 8.5%
    ///
    /// assert_eq!(base.calculate_tax(rate).cents(), 782); // $7.82
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 prevents overflow on large amounts
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Returns the given fraction of this amount, in basis points.
    ///
    /// This is the percentage-discount resolver: a 15% discount on a
    /// $91.98 subtotal is `subtotal.percentage(1500)` = $13.80.
    ///
    /// ## Example
    /// ```rust
    /// use gopet_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(10000); // $100.00
    /// assert_eq!(subtotal.percentage(1500).cents(), 1500); // 15% = $15.00
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(part as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use gopet_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(4599); // $45.99 full groom
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 9198);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging. Use frontend formatting for actual UI display
/// to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
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

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
        let money = Money::from_cents(4599);
        assert_eq!(money.cents(), 4599);
        assert_eq!(money.dollars(), 45);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(45, 99);
        assert_eq!(money.cents(), 4599);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(4599)), "$45.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_saturating_sub_clamps_at_zero() {
        let subtotal = Money::from_cents(1500);
        let discount = Money::from_cents(2000);
        assert_eq!(subtotal.saturating_sub(discount).cents(), 0);

        // Normal case is plain subtraction
        assert_eq!(
            Money::from_cents(2000)
                .saturating_sub(Money::from_cents(1500))
                .cents(),
            500
        );
    }

    #[test]
    fn test_min() {
        let a = Money::from_cents(1500);
        let b = Money::from_cents(2000);
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }

    #[test]
    fn test_tax_calculation_basic() {
        // $10.00 at 10% = $1.00
        let amount = Money::from_cents(1000);
        let rate = TaxRate::from_bps(1000);
        assert_eq!(amount.calculate_tax(rate).cents(), 100);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // $91.98 at 8.5% = $7.8183 → $7.82
        let amount = Money::from_cents(9198);
        let rate = TaxRate::from_bps(850);
        assert_eq!(amount.calculate_tax(rate).cents(), 782);
    }

    #[test]
    fn test_percentage() {
        let subtotal = Money::from_cents(10000);
        assert_eq!(subtotal.percentage(1500).cents(), 1500); // 15%
        assert_eq!(subtotal.percentage(0).cents(), 0);
        assert_eq!(subtotal.percentage(10000).cents(), 10000); // 100%
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(4599);
        assert_eq!(unit_price.multiply_quantity(2).cents(), 9198);
    }

    /// Verify that splitting an amount loses cents explicitly, never silently.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_dollars = Money::from_cents(1000);
        let one_third = Money::from_cents(1000 / 3); // 333 cents
        let reconstructed: Money = one_third * 3; // 999 cents

        assert_eq!(reconstructed.cents(), 999);
        let lost = ten_dollars - reconstructed;
        assert_eq!(lost.cents(), 1);
    }
}
