//! # Repository Module
//!
//! Database repository implementations for Vega Commerce.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  OrderService                                                          │
//! │       │                                                                 │
//! │       │  db.orders().get_by_id(order_id)                               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create_order(&self, order, items)   ← single transaction         │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── confirm(&self, id)                  ← guarded status flip        │
//! │  └── cancel(&self, id, reason)           ← restores stock             │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Multi-statement invariants live inside repository transactions      │
//! │  • Services stay free of persistence details                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`client::ClientRepository`] - Client records and loyalty counters
//! - [`product::ProductRepository`] - Catalog lookups and stock adjustments
//! - [`promo_code::PromoCodeRepository`] - Promo code lifecycle
//! - [`order::OrderRepository`] - Order creation, confirmation, cancellation
//! - [`payment::PaymentRepository`] - Payments against an order's balance

pub mod client;
pub mod order;
pub mod payment;
pub mod product;
pub mod promo_code;
