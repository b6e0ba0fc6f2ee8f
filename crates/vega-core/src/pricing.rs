//! # Pricing Module
//!
//! The pure pricing sequence that turns a cart into an order's financial
//! breakdown. No I/O: the caller resolves the client tier, unit prices,
//! and promo rate first, then this module does all arithmetic.
//!
//! ## The Fixed Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount is rounded half-up to cents exactly once, and each step  │
//! │  consumes the already-rounded output of the previous one:              │
//! │                                                                         │
//! │   1. line totals        = unit price × quantity                        │
//! │   2. subtotal           = Σ line totals                                │
//! │   3. loyalty discount   = tier_discount(tier, subtotal)                │
//! │   4. promo discount     = subtotal × promo rate                        │
//! │   5. total discount     = loyalty + promo                              │
//! │   6. taxable            = subtotal − total discount                    │
//! │   7. tax                = taxable × tax rate                           │
//! │   8. total              = taxable + tax                                │
//! │                                                                         │
//! │  Reordering any two steps changes totals by a cent on real carts.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::loyalty::{tier_discount, LoyaltyTier};
use crate::money::{Money, Rate};

// =============================================================================
// Inputs & Breakdown
// =============================================================================

/// One cart line, already resolved against the catalog.
#[derive(Debug, Clone, Copy)]
pub struct LineItemInput {
    /// Unit price snapshotted from the product.
    pub unit_price: Money,
    /// Units ordered (validated ≥ 1 upstream).
    pub quantity: i64,
}

/// The full financial breakdown of an order, in computation order.
///
/// Field-per-step so callers can persist each figure and tests can pin
/// every intermediate value, not just the total.
#[derive(Debug, Clone)]
pub struct PricingBreakdown {
    /// Line totals, in cart order.
    pub line_totals: Vec<Money>,
    /// Sum of line totals, before any discount.
    pub subtotal: Money,
    /// Discount from the client's loyalty tier.
    pub loyalty_discount: Money,
    /// Discount from the promo code (zero when none applied).
    pub promo_discount: Money,
    /// Loyalty + promo.
    pub total_discount: Money,
    /// Amount after discount - the tax base.
    pub taxable: Money,
    /// Rate used for the tax step.
    pub tax_rate: Rate,
    /// Tax on the taxable amount.
    pub tax: Money,
    /// Grand total (taxable + tax).
    pub total: Money,
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices a cart.
///
/// `promo_rate` is `Some` only when a promo code was supplied, found, and
/// available; the discount applies to the subtotal, not to the
/// loyalty-reduced amount.
///
/// ## Example
/// ```rust
/// use vega_core::loyalty::LoyaltyTier;
/// use vega_core::money::{Money, Rate};
/// use vega_core::pricing::{price_order, LineItemInput};
///
/// let lines = [LineItemInput {
///     unit_price: Money::from_cents(10_000), // 100.00
///     quantity: 6,
/// }];
/// let breakdown = price_order(
///     LoyaltyTier::Silver,
///     &lines,
///     None,
///     Rate::from_bps(2000),
/// );
///
/// assert_eq!(breakdown.subtotal.cents(), 60_000);
/// assert_eq!(breakdown.loyalty_discount.cents(), 3_000); // 5% of 600.00
/// assert_eq!(breakdown.taxable.cents(), 57_000);
/// assert_eq!(breakdown.tax.cents(), 11_400); // 20%
/// assert_eq!(breakdown.total.cents(), 68_400);
/// ```
pub fn price_order(
    tier: LoyaltyTier,
    lines: &[LineItemInput],
    promo_rate: Option<Rate>,
    tax_rate: Rate,
) -> PricingBreakdown {
    // Steps 1-2: line totals, then their sum.
    let line_totals: Vec<Money> = lines
        .iter()
        .map(|line| line.unit_price.multiply_quantity(line.quantity))
        .collect();
    let subtotal = line_totals
        .iter()
        .fold(Money::zero(), |acc, line| acc + *line);

    // Step 3: loyalty discount (zero below the tier minimum).
    let loyalty_discount = tier_discount(tier, subtotal);

    // Step 4: promo discount on the subtotal.
    let promo_discount = match promo_rate {
        Some(rate) => subtotal.apply_rate(rate),
        None => Money::zero(),
    };

    // Steps 5-8.
    let total_discount = loyalty_discount + promo_discount;
    let taxable = subtotal - total_discount;
    let tax = taxable.apply_rate(tax_rate);
    let total = taxable + tax;

    PricingBreakdown {
        line_totals,
        subtotal,
        loyalty_discount,
        promo_discount,
        total_discount,
        taxable,
        tax_rate,
        tax,
        total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VAT: Rate = Rate::from_bps(2000);

    fn line(unit_cents: i64, quantity: i64) -> LineItemInput {
        LineItemInput {
            unit_price: Money::from_cents(unit_cents),
            quantity,
        }
    }

    #[test]
    fn test_silver_below_discount_minimum() {
        // 3 × 100.00 = 300.00: below SILVER's 500.00 floor, no discount.
        let breakdown = price_order(LoyaltyTier::Silver, &[line(10_000, 3)], None, VAT);

        assert_eq!(breakdown.line_totals, vec![Money::from_cents(30_000)]);
        assert_eq!(breakdown.subtotal.cents(), 30_000);
        assert_eq!(breakdown.loyalty_discount.cents(), 0);
        assert_eq!(breakdown.promo_discount.cents(), 0);
        assert_eq!(breakdown.total_discount.cents(), 0);
        assert_eq!(breakdown.taxable.cents(), 30_000);
        assert_eq!(breakdown.tax.cents(), 6_000);
        assert_eq!(breakdown.total.cents(), 36_000);
    }

    #[test]
    fn test_silver_above_discount_minimum() {
        // 6 × 100.00 = 600.00: 5% loyalty discount applies.
        let breakdown = price_order(LoyaltyTier::Silver, &[line(10_000, 6)], None, VAT);

        assert_eq!(breakdown.subtotal.cents(), 60_000);
        assert_eq!(breakdown.loyalty_discount.cents(), 3_000);
        assert_eq!(breakdown.taxable.cents(), 57_000);
        assert_eq!(breakdown.tax.cents(), 11_400);
        assert_eq!(breakdown.total.cents(), 68_400);
    }

    #[test]
    fn test_promo_discount_on_subtotal() {
        // 10% promo on 300.00 → 30.00.
        let breakdown = price_order(
            LoyaltyTier::Basic,
            &[line(10_000, 3)],
            Some(Rate::from_bps(1000)),
            VAT,
        );

        assert_eq!(breakdown.promo_discount.cents(), 3_000);
        assert_eq!(breakdown.loyalty_discount.cents(), 0);
        assert_eq!(breakdown.taxable.cents(), 27_000);
        assert_eq!(breakdown.tax.cents(), 5_400);
        assert_eq!(breakdown.total.cents(), 32_400);
    }

    #[test]
    fn test_loyalty_and_promo_stack_on_subtotal() {
        // Both discounts compute from the same subtotal, then add.
        let breakdown = price_order(
            LoyaltyTier::Silver,
            &[line(10_000, 6)],
            Some(Rate::from_bps(1000)),
            VAT,
        );

        assert_eq!(breakdown.loyalty_discount.cents(), 3_000); // 5% of 600
        assert_eq!(breakdown.promo_discount.cents(), 6_000); // 10% of 600
        assert_eq!(breakdown.total_discount.cents(), 9_000);
        assert_eq!(breakdown.taxable.cents(), 51_000);
        assert_eq!(breakdown.tax.cents(), 10_200);
        assert_eq!(breakdown.total.cents(), 61_200);
    }

    #[test]
    fn test_multi_line_cart() {
        let breakdown = price_order(
            LoyaltyTier::Gold,
            &[line(19_999, 2), line(55_000, 1), line(101, 3)],
            None,
            VAT,
        );

        assert_eq!(
            breakdown.line_totals,
            vec![
                Money::from_cents(39_998),
                Money::from_cents(55_000),
                Money::from_cents(303),
            ]
        );
        // 399.98 + 550.00 + 3.03 = 953.01 → GOLD 10% = 95.30 (95.301 → half-up)
        assert_eq!(breakdown.subtotal.cents(), 95_301);
        assert_eq!(breakdown.loyalty_discount.cents(), 9_530);
        assert_eq!(breakdown.taxable.cents(), 85_771);
        // 20% of 857.71 = 171.542 → 171.54
        assert_eq!(breakdown.tax.cents(), 17_154);
        assert_eq!(breakdown.total.cents(), 102_925);
    }

    #[test]
    fn test_breakdown_identities() {
        // total == taxable + tax and taxable == subtotal − total discount,
        // for a spread of carts and rates.
        let carts: &[&[LineItemInput]] = &[
            &[line(10_000, 3)],
            &[line(10_000, 6)],
            &[line(33, 7), line(999, 2)],
            &[line(123_456, 1), line(1, 99)],
        ];

        for lines in carts {
            for promo in [None, Some(Rate::from_bps(1000)), Some(Rate::from_bps(2500))] {
                for tier in [LoyaltyTier::Basic, LoyaltyTier::Silver, LoyaltyTier::Platinum] {
                    let b = price_order(tier, lines, promo, VAT);
                    assert_eq!(b.total, b.taxable + b.tax);
                    assert_eq!(b.taxable, b.subtotal - b.total_discount);
                    assert_eq!(b.total_discount, b.loyalty_discount + b.promo_discount);
                }
            }
        }
    }

    #[test]
    fn test_empty_cart_prices_to_zero() {
        let breakdown = price_order(LoyaltyTier::Platinum, &[], Some(Rate::from_bps(9999)), VAT);
        assert!(breakdown.line_totals.is_empty());
        assert_eq!(breakdown.subtotal.cents(), 0);
        assert_eq!(breakdown.total.cents(), 0);
    }
}
