//! # Payment Repository
//!
//! Database operations for payments against an order's remaining balance.
//!
//! ## Balance Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Recording a Payment (one transaction)                  │
//! │                                                                         │
//! │  1. UPDATE orders SET remaining_cents = remaining_cents - amount       │
//! │     WHERE id = ? AND remaining_cents >= amount                         │
//! │          │                                                              │
//! │          ├── 0 rows → Conflict (another payment got there first        │
//! │          │            or the amount exceeds what is left)              │
//! │          ▼                                                              │
//! │  2. payment_number = COUNT(payments for order) + 1                     │
//! │          ▼                                                              │
//! │  3. INSERT payment (status 'settled')                                  │
//! │                                                                         │
//! │  The guarded decrement makes overpayment impossible even when two      │
//! │  payments race: the balance never goes below zero.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting a payment is the exact reverse: add the amount back, remove the
//! row. It exists for corrections only; freed payment numbers are not
//! reassigned.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vega_core::{Payment, PaymentMethod, PaymentStatus};

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Gets a payment by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, payment_number, amount_cents, method, status,
                   reference, due_date, created_at
            FROM payments
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Gets all payments for an order, in sequence order.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, payment_number, amount_cents, method, status,
                   reference, due_date, created_at
            FROM payments
            WHERE order_id = ?1
            ORDER BY payment_number
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Gets the total amount paid toward an order.
    pub async fn total_paid(&self, order_id: &str) -> DbResult<i64> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(amount_cents) FROM payments WHERE order_id = ?1")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total.unwrap_or(0))
    }

    /// Records a payment against an order's remaining balance.
    ///
    /// ## What This Does (single transaction)
    /// 1. Subtracts the amount with `WHERE remaining_cents >= amount`
    /// 2. Assigns the next sequence number (existing payments + 1)
    /// 3. Inserts the payment with status SETTLED
    ///
    /// ## Returns
    /// * `Ok(Payment)` - The recorded payment
    /// * `Err(DbError::Conflict)` - Balance moved under the caller: the
    ///   amount no longer fits into what is left
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn record(
        &self,
        order_id: &str,
        amount_cents: i64,
        method: PaymentMethod,
        reference: Option<String>,
        due_date: Option<NaiveDate>,
    ) -> DbResult<Payment> {
        debug!(order_id = %order_id, amount_cents = %amount_cents, "Recording payment");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET remaining_cents = remaining_cents - ?2, updated_at = ?3
            WHERE id = ?1 AND remaining_cents >= ?2
            "#,
        )
        .bind(order_id)
        .bind(amount_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;

            return Err(match exists {
                Some(_) => DbError::conflict("Order", order_id),
                None => DbError::not_found("Order", order_id),
            });
        }

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE order_id = ?1")
                .bind(order_id)
                .fetch_one(&mut *tx)
                .await?;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            payment_number: existing + 1,
            amount_cents,
            method,
            status: PaymentStatus::Settled,
            reference,
            due_date,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, payment_number, amount_cents, method, status,
                reference, due_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.payment_number)
        .bind(payment.amount_cents)
        .bind(payment.method)
        .bind(payment.status)
        .bind(&payment.reference)
        .bind(payment.due_date)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            order_id = %order_id,
            payment_number = payment.payment_number,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Deletes a payment and adds its amount back to the order's balance.
    ///
    /// Correction path only: the payment's sequence number is retired, not
    /// reassigned.
    pub async fn delete(&self, payment_id: &str) -> DbResult<()> {
        debug!(payment_id = %payment_id, "Deleting payment");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT order_id, amount_cents FROM payments WHERE id = ?1")
                .bind(payment_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((order_id, amount_cents)) = row else {
            return Err(DbError::not_found("Payment", payment_id));
        };

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET remaining_cents = remaining_cents + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&order_id)
        .bind(amount_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", &order_id));
        }

        sqlx::query("DELETE FROM payments WHERE id = ?1")
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Updates a payment's status. Everything else about a payment is
    /// immutable once recorded.
    pub async fn update_status(&self, payment_id: &str, status: PaymentStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE payments SET status = ?2 WHERE id = ?1")
            .bind(payment_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payment", payment_id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
