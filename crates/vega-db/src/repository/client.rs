//! # Client Repository
//!
//! Database operations for client records and their loyalty counters.
//!
//! ## Counter Ownership
//! `total_orders` and `total_spent_cents` are lifetime aggregates that only
//! move when an order is confirmed. The confirmation transaction in
//! [`crate::repository::order`] increments them atomically
//! (`SET total_orders = total_orders + 1`) so that two confirmations for the
//! same client can never lose an update. This repository reads and writes
//! whole client rows; it never recomputes the counters.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vega_core::Client;

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, tier, total_orders, total_spent_cents,
                   created_at, updated_at
            FROM clients
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Gets a client by email (unique).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, tier, total_orders, total_spent_cents,
                   created_at, updated_at
            FROM clients
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Lists clients sorted by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, tier, total_orders, total_spent_cents,
                   created_at, updated_at
            FROM clients
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// Inserts a new client.
    ///
    /// ## Returns
    /// * `Ok(())` - Client inserted
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, client: &Client) -> DbResult<()> {
        debug!(email = %client.email, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, email, tier, total_orders, total_spent_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(client.tier)
        .bind(client.total_orders)
        .bind(client.total_spent_cents)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing client, counters and tier included.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Client doesn't exist
    pub async fn update(&self, client: &Client) -> DbResult<()> {
        debug!(id = %client.id, "Updating client");

        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?2,
                email = ?3,
                tier = ?4,
                total_orders = ?5,
                total_spent_cents = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(client.tier)
        .bind(client.total_orders)
        .bind(client.total_spent_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", &client.id));
        }

        Ok(())
    }

    /// Counts total clients (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
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
    use vega_core::LoyaltyTier;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_client(name: &str, email: &str) -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            tier: LoyaltyTier::Basic,
            total_orders: 0,
            total_spent_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let db = test_db().await;
        let repo = db.clients();

        let client = sample_client("Ada Byron", "ada@example.com");
        repo.insert(&client).await.unwrap();

        let loaded = repo.get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(loaded.email, "ada@example.com");
        assert_eq!(loaded.tier, LoyaltyTier::Basic);
        assert_eq!(loaded.total_orders, 0);

        let by_email = repo.get_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, client.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = test_db().await;
        let repo = db.clients();

        repo.insert(&sample_client("One", "dup@example.com"))
            .await
            .unwrap();
        let err = repo
            .insert(&sample_client("Two", "dup@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn update_persists_tier_and_counters() {
        let db = test_db().await;
        let repo = db.clients();

        let mut client = sample_client("Grace Hopper", "grace@example.com");
        repo.insert(&client).await.unwrap();

        client.tier = LoyaltyTier::Gold;
        client.total_orders = 11;
        client.total_spent_cents = 620_000;
        repo.update(&client).await.unwrap();

        let loaded = repo.get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(loaded.tier, LoyaltyTier::Gold);
        assert_eq!(loaded.total_orders, 11);
        assert_eq!(loaded.total_spent_cents, 620_000);
    }

    #[tokio::test]
    async fn update_missing_client_reports_not_found() {
        let db = test_db().await;
        let repo = db.clients();

        let client = sample_client("Ghost", "ghost@example.com");
        let err = repo.update(&client).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
