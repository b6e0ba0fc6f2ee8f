//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceError (vega-orders) ← Classified by ErrorKind                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller decides: surface, retry, or abort                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarded Updates
//! Several writes in this crate are conditional (`UPDATE ... WHERE stock >= ?`,
//! `UPDATE ... WHERE status = 'pending'`). When such an update matches zero
//! rows the repository reports `StockChanged`, `PromoConsumed`, or `Conflict`
//! rather than a generic failure, so callers can tell a lost race apart from
//! a missing row.

use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate promo code
    /// - Duplicate client email or product name
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent client_id or product_id
    /// - Referencing a non-existent order_id
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Stock became insufficient between the availability check and the
    /// commit-time decrement.
    ///
    /// ## When This Occurs
    /// The decrement is a conditional `UPDATE ... WHERE stock >= ?`. A
    /// concurrent order can consume the stock first, in which case the
    /// update matches zero rows and the whole transaction rolls back.
    #[error("Stock changed for product: {name}. Available: {available}, Requested: {requested}")]
    StockChanged {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Promo code was already consumed by another order.
    ///
    /// ## When This Occurs
    /// `consume` flips `available` with a conditional update; a second
    /// consumption of the same code matches zero rows.
    #[error("Promo code {code} has already been consumed")]
    PromoConsumed { code: String },

    /// A guarded update lost a race with a concurrent writer.
    ///
    /// ## When This Occurs
    /// - Two confirmations of the same order
    /// - A cancel racing a confirm
    /// - A payment racing another payment past the remaining balance
    ///
    /// The caller saw a state that satisfied the precondition, but the row
    /// changed before the conditional update ran. Safe to re-read and retry.
    #[error("Concurrent update conflict on {entity}: {id}")]
    Conflict { entity: String, id: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    ///
    /// ## When This Occurs
    /// - Invalid SQL in migration
    /// - Migration version conflict
    /// - Schema incompatibility
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error for a guarded update that matched no rows.
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_changed_message_carries_counts() {
        let err = DbError::StockChanged {
            name: "Standing Desk".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Stock changed for product: Standing Desk. Available: 3, Requested: 5"
        );
    }

    #[test]
    fn promo_consumed_message_names_the_code() {
        let err = DbError::PromoConsumed {
            code: "PROMO-AB12C".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Promo code PROMO-AB12C has already been consumed"
        );
    }

    #[test]
    fn not_found_helper_builds_variant() {
        let err = DbError::not_found("Order", "abc-123");
        assert_eq!(err.to_string(), "Order not found: abc-123");
    }
}
