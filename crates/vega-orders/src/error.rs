//! # Service Error Types
//!
//! The error type callers of the service layer see, and its classification.
//!
//! ## Error Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ServiceError → ErrorKind                            │
//! │                                                                         │
//! │  NotFound       client / product / promo / order / payment absent      │
//! │  Validation     malformed input (bad promo pattern, qty ≤ 0, ...)     │
//! │  BusinessRule   insufficient stock, promo unavailable, overpayment,    │
//! │                 illegal state transition, stock changed at commit      │
//! │  Duplicate      promo code already consumed, unique email / name /    │
//! │                 code collisions                                        │
//! │  Internal       storage faults (pool, connection, unexpected query)    │
//! │                                                                         │
//! │  Sources:                                                               │
//! │    ValidationError ──► CoreError ──┐                                   │
//! │                                    ├──► ServiceError ──► caller        │
//! │    DbError ────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The messages come from the source errors unchanged, so the offending
//! values ("Available: 3, Requested: 5") survive to the caller.

use thiserror::Error;

use vega_core::{CoreError, ValidationError};
use vega_db::DbError;

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Machine-readable classification of a service failure.
///
/// What a web layer would switch on to pick a response class; the
/// human-readable detail stays in the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity does not exist. Terminal; never retried.
    NotFound,
    /// Caller input failed validation before any business logic ran.
    Validation,
    /// A business rule rejected an otherwise well-formed request.
    BusinessRule,
    /// The resource was already used or already exists.
    Duplicate,
    /// Storage-level fault not attributable to the request.
    Internal,
}

/// What callers of the service layer see.
///
/// ## Design Principles
/// - Guard failures keep their typed source (`CoreError`, `DbError`) so
///   tests and callers can match on the precise variant
/// - `kind()` collapses every variant into the five-way classification
/// - Messages pass through verbatim from the source
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A looked-up entity is absent. Raised by service-level reads; the
    /// storage layer raises its own `DbError::NotFound` for write paths.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A pure business-rule or validation failure from vega-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage failure from vega-db.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    /// Convenience constructor for missing entities.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Classifies this error for the caller.
    ///
    /// ## Mapping
    /// - `NotFound` (either layer) → `NotFound`
    /// - Core `Validation` → `Validation`
    /// - Other core guards (stock, promo, balance, status) → `BusinessRule`
    /// - Db `UniqueViolation` / `PromoConsumed` → `Duplicate`
    /// - Db `StockChanged` / `Conflict` / `ForeignKeyViolation` →
    ///   `BusinessRule` (the request was well-formed; concurrent state or
    ///   referential rules rejected it)
    /// - Remaining db faults → `Internal`
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound { .. } => ErrorKind::NotFound,

            ServiceError::Core(CoreError::Validation(_)) => ErrorKind::Validation,
            ServiceError::Core(_) => ErrorKind::BusinessRule,

            ServiceError::Db(DbError::NotFound { .. }) => ErrorKind::NotFound,
            ServiceError::Db(DbError::UniqueViolation { .. })
            | ServiceError::Db(DbError::PromoConsumed { .. }) => ErrorKind::Duplicate,
            ServiceError::Db(DbError::StockChanged { .. })
            | ServiceError::Db(DbError::Conflict { .. })
            | ServiceError::Db(DbError::ForeignKeyViolation { .. }) => ErrorKind::BusinessRule,
            ServiceError::Db(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the referenced entity was absent.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns true if a business rule (not input shape) rejected the call.
    pub fn is_business_rule(&self) -> bool {
        self.kind() == ErrorKind::BusinessRule
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
