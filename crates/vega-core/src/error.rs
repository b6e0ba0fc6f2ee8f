//! # Error Types
//!
//! Domain-specific error types for vega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vega-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vega-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vega-orders errors (separate crate)                                   │
//! │  └── ServiceError     - What callers see (kind + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ServiceError → caller   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include the offending values in error messages (counts, amounts, ids)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// Raised by the pure guards on domain types (stock availability, promo
/// availability, lifecycle transitions, payment limits). The service layer
/// re-checks some of these conditionally at commit time; these variants are
/// the deterministic, read-side failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the product's available stock.
    ///
    /// ## When This Occurs
    /// - An order line asks for more units than the catalog currently holds
    ///
    /// The message carries both counts so the caller can show exactly what
    /// was available at check time.
    #[error("Insufficient stock for product: {product}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Promo code exists but has already been consumed or was deactivated.
    #[error("Promo code {code} is not available")]
    PromoUnavailable { code: String },

    /// Order cannot be confirmed while a balance remains.
    ///
    /// Confirmation requires the remaining balance to be exactly zero; a
    /// partially paid order stays PENDING until the last payment lands.
    #[error("Cannot confirm order, it is not fully paid. Remaining: {}", Money::from_cents(*.remaining_cents))]
    NotFullyPaid { remaining_cents: i64 },

    /// The order's current status does not allow the requested transition.
    ///
    /// ## When This Occurs
    /// - Confirming an order that is already CONFIRMED or CANCELED
    /// - Canceling an order that is not PENDING
    #[error("Order cannot be {action}. Current status: {current}")]
    InvalidStatus {
        action: &'static str,
        current: OrderStatus,
    },

    /// Payment amount exceeds the order's remaining balance.
    #[error("Payment amount ({}) exceeds remaining amount ({})",
        Money::from_cents(*.amount_cents),
        Money::from_cents(*.remaining_cents))]
    Overpayment {
        amount_cents: i64,
        remaining_cents: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed promo code or email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
