//! # vega-core: Pure Business Logic for Vega Commerce
//!
//! This crate is the **heart** of the order-processing backend. It contains
//! all pricing, loyalty, and lifecycle rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vega Commerce Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web Layer (out of scope)                        │   │
//! │  │    order endpoints ──► payment endpoints ──► promo endpoints   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vega-orders (services)                       │   │
//! │  │    create_order, confirm_order, record_payment, etc.           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vega-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │  loyalty  │  │   │
//! │  │   │  Order    │  │   Money   │  │ breakdown │  │   tiers   │  │   │
//! │  │   │  Payment  │  │   Rate    │  │   steps   │  │ discounts │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vega-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Client, Order, Payment, PromoCode)
//! - [`money`] - Money and Rate types with integer arithmetic (no floating point!)
//! - [`pricing`] - The fixed-order pricing breakdown for a cart
//! - [`loyalty`] - Loyalty tiers: discounts and tier recomputation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use vega_core::money::{Money, Rate};
//!
//! // Create money from cents (never from floats!)
//! let subtotal = Money::from_cents(60000); // 600.00
//!
//! // Apply a percentage the way every discount and tax in the system is applied
//! let discount = subtotal.apply_rate(Rate::from_bps(500)); // 5.00%
//! assert_eq!(discount.cents(), 3000); // 30.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod loyalty;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vega_core::Money` instead of
// `use vega_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use loyalty::LoyaltyTier;
pub use money::{Money, Rate};
pub use pricing::{LineItemInput, PricingBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tax rate applied to every order, in basis points (2000 = 20.00%).
///
/// ## Why a constant?
/// The platform currently operates in a single jurisdiction with one VAT
/// rate. Orders snapshot this rate at creation time (`Order::tax_rate_bps`),
/// so a future per-region rate only affects new orders.
pub const DEFAULT_TAX_RATE_BPS: u32 = 2000;

/// Prefix every promo code starts with.
pub const PROMO_CODE_PREFIX: &str = "PROMO-";

/// Number of characters after the prefix (upper-case alphanumerics).
pub const PROMO_CODE_SUFFIX_LEN: usize = 5;
