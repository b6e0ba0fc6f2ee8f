//! # Money Module
//!
//! Provides the `Money` and `Rate` types that every monetary value and
//! percentage in the system flows through.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  An order total that is off by a cent breaks payment reconciliation:   │
//! │  the balance never reaches exactly zero and the order can never be     │
//! │  confirmed.                                                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    All amounts are i64 cents; every derived quantity is rounded        │
//! │    half-up exactly once, in a fixed order (line totals → subtotal →    │
//! │    discounts → taxable amount → tax → total).                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vega_core::money::{Money, Rate};
//!
//! // Create from cents (preferred)
//! let unit_price = Money::from_cents(10000); // 100.00
//!
//! // Line total = unit price × quantity
//! let line_total = unit_price.multiply_quantity(6); // 600.00
//!
//! // Percentage application, rounded half-up to cents
//! let discount = line_total.apply_rate(Rate::from_bps(500)); // 5.00%
//! assert_eq!(discount.cents(), 3000); // 30.00
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Rounding Helper
// =============================================================================

/// Divides `numer` by `denom`, rounding half away from zero.
///
/// This is the single rounding primitive in the crate; `apply_rate` and
/// `div_round` both delegate here so every derived amount rounds the same
/// way. `denom` must be positive.
fn div_round_half_up(numer: i128, denom: i128) -> i64 {
    let half = denom / 2;
    let adjusted = if numer >= 0 { numer + half } else { numer - half };
    (adjusted / denom) as i64
}

// =============================================================================
// Rate Type
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2000 bps = 20.00% (the platform VAT rate)
/// Promo and loyalty discounts use the same representation, so one
/// application rule covers every percentage in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

/// Displays the rate as a two-decimal percentage, e.g. `20.00%`.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections and reversals
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support (serializes as a plain integer)
///
/// ## Where Money Flows
/// ```text
/// Product.price_cents ──► OrderItem.unit_price × qty ──► line total
///                                                            │
///       subtotal ◄── Σ line totals ◄────────────────────────┘
///           │
///           ├──► loyalty discount ──┐
///           ├──► promo discount ────┤ total discount
///           │                       │
///           └──► taxable = subtotal − total discount
///                    │
///                    ├──► tax = taxable × 20.00%
///                    └──► total = taxable + tax ──► remaining balance
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vega_core::money::Money;
    ///
    /// let price = Money::from_cents(10099); // Represents 100.99
    /// assert_eq!(price.cents(), 10099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use vega_core::money::Money;
    ///
    /// let price = Money::from_major_minor(600, 0); // 600.00
    /// assert_eq!(price.cents(), 60000);
    ///
    /// let correction = Money::from_major_minor(-5, 50); // -5.50
    /// assert_eq!(correction.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50, not -4.50.
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

    /// Multiplies money by a quantity (line total = unit price × quantity).
    ///
    /// ## Example
    /// ```rust
    /// use vega_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(10000); // 100.00
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 30000); // 300.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage and returns the resulting amount, rounded
    /// half-up to cents.
    ///
    /// ## The Two-Step Rounding Rule
    /// The rate is first reduced to a two-decimal factor
    /// (`percentage / 100`, rounded half-up), and only then multiplied in.
    /// A 12.34% rate therefore yields exactly 12%, and sub-cent precision
    /// in the rate never reaches an amount. Whole-percent rates (5%, 10%,
    /// 15%, 20%) are unaffected.
    ///
    /// ## Example
    /// ```rust
    /// use vega_core::money::{Money, Rate};
    ///
    /// let taxable = Money::from_cents(57000); // 570.00
    /// let tax = taxable.apply_rate(Rate::from_bps(2000)); // 20.00%
    /// assert_eq!(tax.cents(), 11400); // 114.00
    ///
    /// // The factor is rounded to two decimals before it is applied:
    /// let odd = Money::from_cents(10000).apply_rate(Rate::from_bps(1234));
    /// assert_eq!(odd.cents(), 1200); // 12%, not 12.34%
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // Step 1: bps → factor in hundredths, rounded half-up.
        let factor_hundredths = ((rate.bps() as i128) + 50) / 100;
        // Step 2: multiply and round half-up to cents.
        // i128 prevents overflow on large amounts.
        let raw = self.0 as i128 * factor_hundredths;
        Money(div_round_half_up(raw, 100))
    }

    /// Divides by an integer count, rounding half-up. Used for averages
    /// (statistics), never inside the pricing sequence.
    ///
    /// ## Example
    /// ```rust
    /// use vega_core::money::Money;
    ///
    /// let sum = Money::from_cents(1001);
    /// assert_eq!(sum.div_round(2).cents(), 501); // 5.005 → 5.01
    /// ```
    ///
    /// ## Panics
    /// Dividing by zero panics, as with built-in integer division.
    pub fn div_round(&self, divisor: i64) -> Money {
        Money(div_round_half_up(self.0 as i128, divisor as i128))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the amount as a plain two-decimal string, e.g. `600.00` or
/// `-5.50`. This is the format business error messages embed.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(10099);
        assert_eq!(money.cents(), 10099);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(100, 99);
        assert_eq!(money.cents(), 10099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(10099)), "100.99");
        assert_eq!(format!("{}", Money::from_cents(36000)), "360.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
        assert_eq!(format!("{}", Money::from_cents(-5)), "-0.05");
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(format!("{}", Rate::from_bps(2000)), "20.00%");
        assert_eq!(format!("{}", Rate::from_bps(505)), "5.05%");
        assert_eq!(format!("{}", Rate::from_bps(0)), "0.00%");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let mut acc = Money::zero();
        acc += a;
        acc += b;
        assert_eq!(acc.cents(), 1500);
        acc -= b;
        assert_eq!(acc.cents(), 1000);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(10000);
        assert_eq!(unit_price.multiply_quantity(6).cents(), 60000);
        assert_eq!(unit_price.multiply_quantity(0).cents(), 0);
    }

    #[test]
    fn test_apply_rate_exact_percentages() {
        // The whole-percent rates used by loyalty tiers and VAT are exact.
        let subtotal = Money::from_cents(60000); // 600.00
        assert_eq!(subtotal.apply_rate(Rate::from_bps(500)).cents(), 3000); // 5%
        assert_eq!(subtotal.apply_rate(Rate::from_bps(1000)).cents(), 6000); // 10%
        assert_eq!(subtotal.apply_rate(Rate::from_bps(1500)).cents(), 9000); // 15%
        assert_eq!(subtotal.apply_rate(Rate::from_bps(2000)).cents(), 12000); // 20%
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // 0.05 × 10% = 0.005 → 0.01
        let tiny = Money::from_cents(5);
        assert_eq!(tiny.apply_rate(Rate::from_bps(1000)).cents(), 1);

        // 0.04 × 10% = 0.004 → 0.00
        let tinier = Money::from_cents(4);
        assert_eq!(tinier.apply_rate(Rate::from_bps(1000)).cents(), 0);
    }

    #[test]
    fn test_apply_rate_two_step_factor_rounding() {
        // The factor is rounded to two decimals before multiplication,
        // so 12.34% behaves as exactly 12%.
        let amount = Money::from_cents(10000);
        assert_eq!(amount.apply_rate(Rate::from_bps(1234)).cents(), 1200);

        // 8.25% rounds down to a 0.08 factor.
        assert_eq!(amount.apply_rate(Rate::from_bps(825)).cents(), 800);

        // 8.50% rounds the factor up to 0.09.
        assert_eq!(amount.apply_rate(Rate::from_bps(850)).cents(), 900);
    }

    #[test]
    fn test_apply_rate_full_and_zero() {
        let amount = Money::from_cents(12345);
        assert_eq!(amount.apply_rate(Rate::from_bps(10000)).cents(), 12345); // 100%
        assert_eq!(amount.apply_rate(Rate::zero()).cents(), 0);
    }

    #[test]
    fn test_apply_rate_negative_amount() {
        // Corrections round half away from zero, mirroring the positive case.
        let correction = Money::from_cents(-5);
        assert_eq!(correction.apply_rate(Rate::from_bps(1000)).cents(), -1);

        let small = Money::from_cents(-4);
        assert_eq!(small.apply_rate(Rate::from_bps(1000)).cents(), 0);
    }

    #[test]
    fn test_div_round() {
        assert_eq!(Money::from_cents(68400).div_round(2).cents(), 34200);
        assert_eq!(Money::from_cents(1000).div_round(3).cents(), 333);
        assert_eq!(Money::from_cents(500).div_round(3).cents(), 167); // 166.67 → 167
        assert_eq!(Money::from_cents(1001).div_round(2).cents(), 501); // .5 → up
        assert_eq!(Money::from_cents(-1001).div_round(2).cents(), -501);
    }

    #[test]
    fn test_zero_and_sign_checks() {
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

    #[test]
    fn test_rate_accessors() {
        let rate = Rate::from_bps(2000);
        assert_eq!(rate.bps(), 2000);
        assert!((rate.percentage() - 20.0).abs() < 0.001);
        assert!(Rate::zero().is_zero());
    }
}
