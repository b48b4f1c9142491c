//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                         │
//! │    We KNOW we lost 1 cent, and handle it explicitly                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(5000); // $50.00
//!
//! // Arithmetic operations
//! let line_total = price * 3;                 // $150.00
//! let total = price + Money::from_cents(500); // $55.00
//!
//! // NEVER do this:
//! // let bad = Money::from_float(50.00); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for reversals and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  StockItem.price_cents ──► unit price ──► PurchaseRecord.total_cents   │
/// │                                                                         │
/// │  Purchase totals ──► payout window gross ──► commission ──► Payout     │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(5000); // Represents $50.00
    /// assert_eq!(price.cents(), 5000);
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
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_major_minor(50, 0); // $50.00
    /// assert_eq!(price.cents(), 5000);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -$5.50 (reversal)
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(5000); // $50.00
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 15_000); // $150.00
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Stock: Espresso Beans $50.00
    /// Quantity purchased: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Purchase total: $150.00
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
/// This is for logs and debugging. Client-side formatting should handle
/// localization properly.
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

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
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

/// Multiplication by i64.
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
        let money = Money::from_cents(5099);
        assert_eq!(money.cents(), 5099);
        assert_eq!(money.dollars(), 50);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(50, 99);
        assert_eq!(money.cents(), 5099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(5099)), "$50.99");
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
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(5000);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 15_000);
    }

    /// Critical test: Verify that $10.00 / 3 × 3 behaves as expected
    /// This documents the intentional precision loss
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_dollars = Money::from_cents(1000);
        // If we split $10.00 three ways: $3.33 each
        let one_third = Money::from_cents(1000 / 3); // 333 cents
        let reconstructed: Money = one_third * 3; // 999 cents

        // We intentionally lose 1 cent - this is documented behavior
        assert_eq!(reconstructed.cents(), 999);
        assert_ne!(reconstructed.cents(), ten_dollars.cents());

        // Document: 1 cent was lost
        let lost = ten_dollars - reconstructed;
        assert_eq!(lost.cents(), 1);
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
        assert_eq!(negative.abs().cents(), 100);
    }
}
