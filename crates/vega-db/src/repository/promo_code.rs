//! # Promo Code Repository
//!
//! Database operations for single-use promo codes.
//!
//! ## Consumption Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Single-Use Enforcement                                 │
//! │                                                                         │
//! │  Two orders race to use PROMO-AB12C:                                   │
//! │                                                                         │
//! │  Order A: UPDATE ... SET available = 0                                 │
//! │           WHERE code = 'PROMO-AB12C' AND available = 1  → 1 row  ✓    │
//! │  Order B: same statement                                → 0 rows ✗    │
//! │                                                                         │
//! │  Order B gets PromoConsumed and its whole creation rolls back.         │
//! │  The availability read during validation is advisory only.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vega_core::PromoCode;

/// Repository for promo code database operations.
#[derive(Debug, Clone)]
pub struct PromoCodeRepository {
    pool: SqlitePool,
}

impl PromoCodeRepository {
    /// Creates a new PromoCodeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromoCodeRepository { pool }
    }

    /// Gets a promo code by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, code, discount_bps, available, created_at, updated_at
            FROM promo_codes
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    /// Gets a promo code by its code string.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, code, discount_bps, available, created_at, updated_at
            FROM promo_codes
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    /// Lists promo codes, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<PromoCode>> {
        let promos = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, code, discount_bps, available, created_at, updated_at
            FROM promo_codes
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(promos)
    }

    /// Inserts a new promo code.
    ///
    /// ## Returns
    /// * `Ok(())` - Promo code inserted
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, promo: &PromoCode) -> DbResult<()> {
        debug!(code = %promo.code, "Inserting promo code");

        sqlx::query(
            r#"
            INSERT INTO promo_codes (
                id, code, discount_bps, available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&promo.id)
        .bind(&promo.code)
        .bind(promo.discount_bps)
        .bind(promo.available)
        .bind(promo.created_at)
        .bind(promo.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Marks a code as used. Fails if it was already consumed.
    ///
    /// ## Returns
    /// * `Ok(())` - Code consumed
    /// * `Err(DbError::PromoConsumed)` - Code was already used
    /// * `Err(DbError::NotFound)` - Code doesn't exist
    pub async fn consume(&self, code: &str) -> DbResult<()> {
        debug!(code = %code, "Consuming promo code");

        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE promo_codes
            SET available = 0, updated_at = ?2
            WHERE code = ?1 AND available = 1
            "#,
        )
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Zero rows: either the code is unknown or it was already used.
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM promo_codes WHERE code = ?1")
                    .bind(code)
                    .fetch_optional(&self.pool)
                    .await?;

            return Err(match exists {
                Some(_) => DbError::PromoConsumed {
                    code: code.to_string(),
                },
                None => DbError::not_found("PromoCode", code),
            });
        }

        Ok(())
    }

    /// Makes a consumed code available again (administrative reset).
    pub async fn reactivate(&self, code: &str) -> DbResult<()> {
        debug!(code = %code, "Reactivating promo code");

        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE promo_codes
            SET available = 1, updated_at = ?2
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PromoCode", code));
        }

        Ok(())
    }

    /// Counts total promo codes (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM promo_codes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_promo(code: &str, discount_bps: u32) -> PromoCode {
        let now = Utc::now();
        PromoCode {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            discount_bps,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let db = test_db().await;
        let repo = db.promo_codes();

        let promo = sample_promo("PROMO-AB12C", 1000);
        repo.insert(&promo).await.unwrap();

        let loaded = repo.get_by_code("PROMO-AB12C").await.unwrap().unwrap();
        assert_eq!(loaded.discount_bps, 1000);
        assert!(loaded.available);
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let db = test_db().await;
        let repo = db.promo_codes();

        repo.insert(&sample_promo("PROMO-XY99Z", 500)).await.unwrap();
        let err = repo
            .insert(&sample_promo("PROMO-XY99Z", 1500))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn consume_is_single_use() {
        let db = test_db().await;
        let repo = db.promo_codes();

        repo.insert(&sample_promo("PROMO-ONCE1", 1000))
            .await
            .unwrap();

        repo.consume("PROMO-ONCE1").await.unwrap();
        let loaded = repo.get_by_code("PROMO-ONCE1").await.unwrap().unwrap();
        assert!(!loaded.available);

        // Second consumption must fail distinctly.
        let err = repo.consume("PROMO-ONCE1").await.unwrap_err();
        assert!(matches!(err, DbError::PromoConsumed { .. }));
    }

    #[tokio::test]
    async fn reactivate_restores_availability() {
        let db = test_db().await;
        let repo = db.promo_codes();

        repo.insert(&sample_promo("PROMO-BACK1", 750)).await.unwrap();
        repo.consume("PROMO-BACK1").await.unwrap();
        repo.reactivate("PROMO-BACK1").await.unwrap();

        let loaded = repo.get_by_code("PROMO-BACK1").await.unwrap().unwrap();
        assert!(loaded.available);

        // And it can be consumed again after the reset.
        repo.consume("PROMO-BACK1").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_code_reports_not_found() {
        let db = test_db().await;
        let repo = db.promo_codes();

        let err = repo.consume("PROMO-NOPE1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = repo.reactivate("PROMO-NOPE1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
