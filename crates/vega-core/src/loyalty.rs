//! # Loyalty Module
//!
//! Loyalty tiers and the two rules that depend on them:
//!
//! 1. **Tier discount** — the percentage a client's tier knocks off an
//!    order's subtotal, gated by a per-tier minimum subtotal.
//! 2. **Tier recomputation** — which tier a client's cumulative history
//!    earns. Runs on order confirmation only; nothing else may assign a
//!    tier.
//!
//! ## The Tier Table
//! ```text
//! ┌──────────┬────────────┬──────────────────┬───────────────────────────────┐
//! │ Tier     │ Discount % │ Min subtotal     │ Earned at (orders OR spent)   │
//! ├──────────┼────────────┼──────────────────┼───────────────────────────────┤
//! │ BASIC    │    0       │       n/a        │ default                       │
//! │ SILVER   │   5.00     │     500.00       │ ≥ 3 orders OR ≥ 1000.00       │
//! │ GOLD     │  10.00     │     800.00       │ ≥ 10 orders OR ≥ 5000.00      │
//! │ PLATINUM │  15.00     │    1200.00       │ ≥ 20 orders OR ≥ 15000.00     │
//! └──────────┴────────────┴──────────────────┴───────────────────────────────┘
//! ```
//!
//! The OR in the earning rule is deliberate: a frequent low-value buyer and
//! a rare big spender both qualify.

use serde::{Deserialize, Serialize};

use crate::money::{Money, Rate};

// =============================================================================
// Tier Thresholds
// =============================================================================

/// Discount rates per tier, in basis points.
pub const SILVER_DISCOUNT_BPS: u32 = 500;
pub const GOLD_DISCOUNT_BPS: u32 = 1000;
pub const PLATINUM_DISCOUNT_BPS: u32 = 1500;

/// Minimum order subtotal (cents) for the tier discount to apply.
pub const SILVER_MIN_SUBTOTAL_CENTS: i64 = 50_000;
pub const GOLD_MIN_SUBTOTAL_CENTS: i64 = 80_000;
pub const PLATINUM_MIN_SUBTOTAL_CENTS: i64 = 120_000;

/// Cumulative history needed to earn each tier (orders OR spend).
pub const SILVER_MIN_ORDERS: i64 = 3;
pub const GOLD_MIN_ORDERS: i64 = 10;
pub const PLATINUM_MIN_ORDERS: i64 = 20;
pub const SILVER_MIN_SPENT_CENTS: i64 = 100_000;
pub const GOLD_MIN_SPENT_CENTS: i64 = 500_000;
pub const PLATINUM_MIN_SPENT_CENTS: i64 = 1_500_000;

// =============================================================================
// Loyalty Tier
// =============================================================================

/// A client's loyalty classification.
///
/// Stored on the client row, recomputed from cumulative history on every
/// order confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    /// Entry tier, no discount.
    Basic,
    /// 5.00% off subtotals of 500.00 and up.
    Silver,
    /// 10.00% off subtotals of 800.00 and up.
    Gold,
    /// 15.00% off subtotals of 1200.00 and up.
    Platinum,
}

impl Default for LoyaltyTier {
    fn default() -> Self {
        LoyaltyTier::Basic
    }
}

impl LoyaltyTier {
    /// The discount rate this tier grants (zero for Basic).
    pub const fn discount_rate(&self) -> Rate {
        match self {
            LoyaltyTier::Basic => Rate::zero(),
            LoyaltyTier::Silver => Rate::from_bps(SILVER_DISCOUNT_BPS),
            LoyaltyTier::Gold => Rate::from_bps(GOLD_DISCOUNT_BPS),
            LoyaltyTier::Platinum => Rate::from_bps(PLATINUM_DISCOUNT_BPS),
        }
    }

    /// The minimum subtotal this tier's discount requires.
    pub const fn minimum_subtotal(&self) -> Money {
        match self {
            LoyaltyTier::Basic => Money::zero(),
            LoyaltyTier::Silver => Money::from_cents(SILVER_MIN_SUBTOTAL_CENTS),
            LoyaltyTier::Gold => Money::from_cents(GOLD_MIN_SUBTOTAL_CENTS),
            LoyaltyTier::Platinum => Money::from_cents(PLATINUM_MIN_SUBTOTAL_CENTS),
        }
    }
}

// =============================================================================
// Tier Rules
// =============================================================================

/// Computes the loyalty discount a tier grants on a subtotal.
///
/// Below the tier's minimum subtotal the discount is zero. The result is
/// never negative and, with the table's rates, never exceeds the subtotal.
///
/// ## Example
/// ```rust
/// use vega_core::loyalty::{tier_discount, LoyaltyTier};
/// use vega_core::money::Money;
///
/// // SILVER at 600.00 → 5% = 30.00
/// let discount = tier_discount(LoyaltyTier::Silver, Money::from_cents(60000));
/// assert_eq!(discount.cents(), 3000);
///
/// // SILVER at 499.99 → below minimum, no discount
/// let none = tier_discount(LoyaltyTier::Silver, Money::from_cents(49999));
/// assert_eq!(none.cents(), 0);
/// ```
pub fn tier_discount(tier: LoyaltyTier, subtotal: Money) -> Money {
    if tier == LoyaltyTier::Basic {
        return Money::zero();
    }

    if subtotal < tier.minimum_subtotal() {
        return Money::zero();
    }

    subtotal.apply_rate(tier.discount_rate())
}

/// Recomputes a client's tier from cumulative history.
///
/// Each tier is earned by order count OR cumulative spend, checked from the
/// top down; the highest tier whose threshold is met wins.
///
/// ## Example
/// ```rust
/// use vega_core::loyalty::{recompute_tier, LoyaltyTier};
/// use vega_core::money::Money;
///
/// // 3 orders qualifies for SILVER regardless of spend
/// assert_eq!(recompute_tier(3, Money::zero()), LoyaltyTier::Silver);
///
/// // 15000.00 spent qualifies for PLATINUM regardless of order count
/// assert_eq!(
///     recompute_tier(1, Money::from_cents(1_500_000)),
///     LoyaltyTier::Platinum
/// );
/// ```
pub fn recompute_tier(total_orders: i64, total_spent: Money) -> LoyaltyTier {
    let spent = total_spent.cents();

    if total_orders >= PLATINUM_MIN_ORDERS || spent >= PLATINUM_MIN_SPENT_CENTS {
        LoyaltyTier::Platinum
    } else if total_orders >= GOLD_MIN_ORDERS || spent >= GOLD_MIN_SPENT_CENTS {
        LoyaltyTier::Gold
    } else if total_orders >= SILVER_MIN_ORDERS || spent >= SILVER_MIN_SPENT_CENTS {
        LoyaltyTier::Silver
    } else {
        LoyaltyTier::Basic
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
