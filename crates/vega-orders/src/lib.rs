//! # vega-orders: Service Layer for Vega Orders
//!
//! This crate provides the order-processing services a web layer would
//! call: pricing carts into orders, driving the order lifecycle, recording
//! payments, and administering promo codes. It is transport-agnostic - no
//! HTTP types leak in or out.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vega Orders Service Layer                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   OrderService (orders.rs)                       │  │
//! │  │                                                                  │  │
//! │  │  create_order: the full pricing pipeline, committed in one      │  │
//! │  │  transaction (order + items + stock decrements + promo use)     │  │
//! │  │  confirm / cancel / set_status: lifecycle transitions           │  │
//! │  │  reads: get, details, list by client, statistics                │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼──────────────────────┐                 │
//! │         ▼                     ▼                      ▼                  │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ PaymentService │  │PromoCodeService│  │  ServiceError          │    │
//! │  │                │  │                │  │  (error.rs)            │    │
//! │  │ record against │  │ create,        │  │                        │    │
//! │  │ the remaining  │  │ consume,       │  │ Five ErrorKinds:       │    │
//! │  │ balance, and   │  │ reactivate     │  │ NotFound, Validation,  │    │
//! │  │ delete for     │  │                │  │ BusinessRule,          │    │
//! │  │ corrections    │  │                │  │ Duplicate, Internal    │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  Pure rules come from vega-core; the transactional commit paths        │
//! │  live in vega-db. This crate wires them together.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`orders`] - Pricing pipeline and lifecycle (`OrderService`)
//! - [`payments`] - Balance-governed payments (`PaymentService`)
//! - [`promos`] - Promo code administration (`PromoCodeService`)
//! - [`error`] - `ServiceError` and its `ErrorKind` classification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vega_db::{Database, DbConfig};
//! use vega_orders::{NewOrder, NewOrderItem, OrderService};
//!
//! let db = Database::new(DbConfig::new("./vega.db")).await?;
//! let orders = OrderService::new(db.clone());
//!
//! let order = orders
//!     .create_order(NewOrder {
//!         client_id,
//!         items: vec![NewOrderItem { product_id, quantity: 3 }],
//!         promo_code: None,
//!     })
//!     .await?;
//! assert_eq!(order.remaining_cents, order.total_cents);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod orders;
pub mod payments;
pub mod promos;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use orders::{NewOrder, NewOrderItem, OrderDetails, OrderService};
pub use payments::{NewPayment, PaymentService};
pub use promos::{NewPromoCode, PromoCodeService};
