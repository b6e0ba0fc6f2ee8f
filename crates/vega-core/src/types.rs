//! # Domain Types
//!
//! Core domain types for the order-processing backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name (unique)  │   │  client_id (FK) │   │  order_id (FK)  │       │
//! │  │  price_cents    │   │  status         │   │  payment_number │       │
//! │  │  stock          │   │  total_cents    │   │  amount_cents   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │   OrderItem     │   │   PromoCode     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  email (unique) │   │  snapshots      │   │  code (unique)  │       │
//! │  │  tier           │   │  quantity       │   │  discount_bps   │       │
//! │  │  totals         │   │  line_total     │   │  available      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Aggregate Boundaries
//! An Order owns its OrderItems and Payments (rows keyed by `order_id`);
//! everything else is referenced by id and looked up through a repository.
//! No type here holds another aggregate by value, which keeps concurrent
//! access safe and ownership unambiguous.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::loyalty::LoyaltyTier;
use crate::money::{Money, Rate};
use crate::{PROMO_CODE_PREFIX, PROMO_CODE_SUFFIX_LEN};

// =============================================================================
// Product
// =============================================================================

/// A catalog product. Stock is mutated only through the stock operations
/// (conditional decrement, restore); nothing else writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name; unique across the catalog.
    pub name: String,

    /// Unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units currently available. Never negative.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks that the requested quantity is in stock.
    ///
    /// This is the read-side availability check; the commit-time decrement
    /// re-validates atomically against the database row.
    pub fn ensure_available(&self, quantity: i64) -> CoreResult<()> {
        if quantity > self.stock {
            return Err(CoreError::InsufficientStock {
                product: self.name.clone(),
                available: self.stock,
                requested: quantity,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer with cumulative loyalty history.
///
/// `tier` is derived data: it is recomputed from `total_orders` and
/// `total_spent_cents` on every order confirmation and never set directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact email; unique across clients.
    pub email: String,

    /// Current loyalty tier (derived, see above).
    pub tier: LoyaltyTier,

    /// Number of confirmed orders.
    pub total_orders: i64,

    /// Cumulative spend across confirmed orders, in cents.
    pub total_spent_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Returns the cumulative spend as Money.
    #[inline]
    pub fn total_spent(&self) -> Money {
        Money::from_cents(self.total_spent_cents)
    }

    /// Average confirmed-order value (half-up), zero when no orders yet.
    pub fn average_order_value(&self) -> Money {
        if self.total_orders == 0 {
            return Money::zero();
        }
        self.total_spent().div_round(self.total_orders)
    }
}

// =============================================================================
// Promo Code
// =============================================================================

/// A single-use promotional code.
///
/// Consumption flips `available` to false; an administrative reactivation
/// can flip it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PromoCode {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The code itself: `PROMO-` + five upper-case alphanumerics. Unique.
    pub code: String,

    /// Discount in basis points (1–10000, i.e. 0.01%–100.00%).
    pub discount_bps: u32,

    /// Whether the code can still be consumed.
    pub available: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromoCode {
    /// Returns the discount as a Rate.
    #[inline]
    pub fn rate(&self) -> Rate {
        Rate::from_bps(self.discount_bps)
    }

    /// Checks that the code can still be consumed.
    pub fn ensure_available(&self) -> CoreResult<()> {
        if !self.available {
            return Err(CoreError::PromoUnavailable {
                code: self.code.clone(),
            });
        }
        Ok(())
    }

    /// Generates a fresh code: `PROMO-` plus the first five hex characters
    /// of a v4 UUID, upper-cased (a subset of the legal alphabet).
    pub fn generate_code() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        let suffix = hex[..PROMO_CODE_SUFFIX_LEN].to_uppercase();
        format!("{PROMO_CODE_PREFIX}{suffix}")
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle state of an order.
///
/// ```text
///             confirm (balance == 0)
///   PENDING ──────────────────────────► CONFIRMED  (terminal)
///      │
///      │     cancel
///      └──────────────────────────────► CANCELED   (terminal)
/// ```
///
/// No transition leaves a terminal state (the administrative `set_status`
/// override is the sole, audited exception).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Priced and awaiting payment.
    Pending,
    /// Fully paid and confirmed.
    Confirmed,
    /// Aborted; stock has been restored.
    Canceled,
}

impl OrderStatus {
    /// Whether this status ends the lifecycle.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Canceled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// Upper-case rendering used in business error messages.
impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Canceled => "CANCELED",
        })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A priced order.
///
/// All monetary fields are fixed at creation by the pricing sequence; only
/// `remaining_cents` (payments), `status` plus the lifecycle timestamps,
/// and `updated_at` change afterwards. Orders are never deleted -
/// cancellation is a status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub status: OrderStatus,

    /// Sum of line totals, before any discount.
    pub subtotal_cents: i64,
    /// Discount granted by the client's loyalty tier.
    pub loyalty_discount_cents: i64,
    /// Discount granted by the applied promo code.
    pub promo_discount_cents: i64,
    /// Total discount (loyalty + promo).
    pub discount_cents: i64,
    /// Amount after discount - the tax base.
    pub taxable_cents: i64,
    /// Tax rate snapshotted at creation, in basis points.
    pub tax_rate_bps: u32,
    /// Tax on the taxable amount.
    pub tax_cents: i64,
    /// Grand total (taxable + tax).
    pub total_cents: i64,
    /// Portion of the total not yet covered by payments.
    pub remaining_cents: i64,

    /// Promo code applied at creation, if any.
    pub promo_code: Option<String>,

    /// Stamped when the order is confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Stamped when the order is canceled.
    pub canceled_at: Option<DateTime<Utc>>,
    /// Free-text reason recorded on cancellation.
    pub cancel_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the total discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Returns the taxable amount (after discount) as Money.
    #[inline]
    pub fn taxable(&self) -> Money {
        Money::from_cents(self.taxable_cents)
    }

    /// Returns the tax amount as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the remaining balance as Money.
    #[inline]
    pub fn remaining(&self) -> Money {
        Money::from_cents(self.remaining_cents)
    }

    /// Returns the snapshotted tax rate.
    #[inline]
    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.tax_rate_bps)
    }

    /// Checks that this order may be confirmed.
    ///
    /// The balance is checked before the status, so a partially paid order
    /// always reports its remainder, whatever its status.
    pub fn ensure_can_confirm(&self) -> CoreResult<()> {
        if self.remaining_cents != 0 {
            return Err(CoreError::NotFullyPaid {
                remaining_cents: self.remaining_cents,
            });
        }
        if self.status != OrderStatus::Pending {
            return Err(CoreError::InvalidStatus {
                action: "confirmed",
                current: self.status,
            });
        }
        Ok(())
    }

    /// Checks that this order may be canceled (PENDING only).
    pub fn ensure_can_cancel(&self) -> CoreResult<()> {
        if self.status != OrderStatus::Pending {
            return Err(CoreError::InvalidStatus {
                action: "canceled",
                current: self.status,
            });
        }
        Ok(())
    }

    /// Checks that a payment of `amount` fits within the remaining balance.
    pub fn ensure_accepts_payment(&self, amount: Money) -> CoreResult<()> {
        if amount.cents() > self.remaining_cents {
            return Err(CoreError::Overpayment {
                amount_cents: amount.cents(),
                remaining_cents: self.remaining_cents,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze product data at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at order time (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at order time (frozen).
    pub unit_price_cents: i64,
    /// Units ordered (≥ 1).
    pub quantity: i64,
    /// Line total (unit price × quantity).
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the snapshotted unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Payment Method & Status
// =============================================================================

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Card payment.
    Card,
    /// Bank transfer.
    BankTransfer,
    /// Check (may carry a due date).
    Check,
}

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting collection (e.g., a post-dated check).
    Pending,
    /// Collected. Recorded payments start here.
    Settled,
    /// Bounced or refused after recording.
    Rejected,
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards an order's balance.
/// An order can carry several partial payments; each gets the next
/// 1-based `payment_number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    /// 1-based sequence number within the order.
    pub payment_number: i64,
    /// Amount paid in cents.
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// External reference (wire id, check number, ...).
    pub reference: Option<String>,
    /// Due date for deferred instruments.
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate order counters for the statistics accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatistics {
    /// Number of CONFIRMED orders.
    pub confirmed_count: i64,
    /// Sum of CONFIRMED order totals, in cents.
    pub confirmed_total_cents: i64,
    /// Number of PENDING orders.
    pub pending_count: i64,
    /// Number of CANCELED orders.
    pub canceled_count: i64,
    /// Average CONFIRMED order total (half-up), zero when none.
    pub average_confirmed_cents: i64,
}

/// Per-client loyalty summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientStatistics {
    pub client_id: String,
    pub tier: LoyaltyTier,
    pub total_orders: i64,
    pub total_spent_cents: i64,
    /// Average confirmed-order value (half-up), zero when no orders.
    pub average_order_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
