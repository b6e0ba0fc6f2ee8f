//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     └── create_order() → INSERT order + items,                         │
//! │                          guarded stock decrement per item,             │
//! │                          guarded promo consumption                     │
//! │                                                                         │
//! │  2. PAY (see payment repository)                                       │
//! │     └── record() → remaining balance shrinks toward zero               │
//! │                                                                         │
//! │  3a. CONFIRM (one transaction)                                         │
//! │      └── confirm() → guarded status flip (pending + zero balance),     │
//! │                      client counters += , tier recomputed              │
//! │                                                                         │
//! │  3b. CANCEL (one transaction)                                          │
//! │      └── cancel() → guarded status flip (pending only),                │
//! │                     stock restored per item                            │
//! │                                                                         │
//! │  Orders are never deleted; cancellation is a status, not a removal.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every multi-statement operation runs inside a single sqlx transaction.
//! An early return drops the transaction, which rolls back all of it: no
//! partial stock decrement, half-written order, or consumed promo code can
//! survive a failure.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vega_core::loyalty::recompute_tier;
use vega_core::{Money, Order, OrderItem, OrderStatistics, OrderStatus};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, client_id, status,
                   subtotal_cents, loyalty_discount_cents, promo_discount_cents,
                   discount_cents, taxable_cents, tax_rate_bps, tax_cents,
                   total_cents, remaining_cents, promo_code,
                   confirmed_at, canceled_at, cancel_reason,
                   created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, name_snapshot,
                   unit_price_cents, quantity, line_total_cents, created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a client's orders, newest first.
    pub async fn list_by_client(&self, client_id: &str, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, client_id, status,
                   subtotal_cents, loyalty_discount_cents, promo_discount_cents,
                   discount_cents, taxable_cents, tax_rate_bps, tax_cents,
                   total_cents, remaining_cents, promo_code,
                   confirmed_at, canceled_at, cancel_reason,
                   created_at, updated_at
            FROM orders
            WHERE client_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(client_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Persists a priced order atomically.
    ///
    /// ## What This Does (single transaction)
    /// 1. Inserts the order row (status PENDING, balance = total)
    /// 2. Inserts every order item
    /// 3. Decrements stock per item with `WHERE stock >= quantity`
    /// 4. Consumes the promo code, if one is attached
    ///
    /// Any failure rolls back the whole transaction: the earlier
    /// availability check during pricing is advisory, the decrement here is
    /// authoritative.
    ///
    /// ## Returns
    /// * `Ok(())` - Order, items, stock, and promo all committed
    /// * `Err(DbError::StockChanged)` - A concurrent order took the stock
    /// * `Err(DbError::PromoConsumed)` - A concurrent order used the code
    pub async fn create_order(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(id = %order.id, client_id = %order.client_id, "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, client_id, status,
                subtotal_cents, loyalty_discount_cents, promo_discount_cents,
                discount_cents, taxable_cents, tax_rate_bps, tax_cents,
                total_cents, remaining_cents, promo_code,
                confirmed_at, canceled_at, cancel_reason,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15, ?16,
                ?17, ?18
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.client_id)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.loyalty_discount_cents)
        .bind(order.promo_discount_cents)
        .bind(order.discount_cents)
        .bind(order.taxable_cents)
        .bind(order.tax_rate_bps)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(order.remaining_cents)
        .bind(&order.promo_code)
        .bind(order.confirmed_at)
        .bind(order.canceled_at)
        .bind(&order.cancel_reason)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, name_snapshot,
                    unit_price_cents, quantity, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        // Authoritative stock check: subtract if sufficient, else fail.
        for item in items {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?2, updated_at = ?3
                WHERE id = ?1 AND stock >= ?2
                "#,
            )
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(order.created_at)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let row: Option<(String, i64)> =
                    sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1")
                        .bind(&item.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                return Err(match row {
                    Some((name, available)) => DbError::StockChanged {
                        name,
                        available,
                        requested: item.quantity,
                    },
                    None => DbError::not_found("Product", &item.product_id),
                });
            }
        }

        if let Some(code) = &order.promo_code {
            let result = sqlx::query(
                r#"
                UPDATE promo_codes
                SET available = 0, updated_at = ?2
                WHERE code = ?1 AND available = 1
                "#,
            )
            .bind(code)
            .bind(order.created_at)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let exists: Option<i64> =
                    sqlx::query_scalar("SELECT 1 FROM promo_codes WHERE code = ?1")
                        .bind(code)
                        .fetch_optional(&mut *tx)
                        .await?;

                return Err(match exists {
                    Some(_) => DbError::PromoConsumed { code: code.clone() },
                    None => DbError::not_found("PromoCode", code),
                });
            }
        }

        tx.commit().await?;

        debug!(id = %order.id, items = items.len(), "Order committed");
        Ok(())
    }

    /// Confirms a fully paid pending order.
    ///
    /// ## What This Does (single transaction)
    /// 1. Flips status with `WHERE status = 'pending' AND remaining_cents = 0`
    /// 2. Stamps `confirmed_at`
    /// 3. Increments the client's lifetime counters atomically
    /// 4. Recomputes the client's loyalty tier from the new counters
    ///
    /// ## Returns
    /// * `Ok(Order)` - The confirmed order
    /// * `Err(DbError::Conflict)` - Guard matched no rows: the order is not
    ///   pending anymore, or its balance moved since the caller checked
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn confirm(&self, id: &str) -> DbResult<Order> {
        debug!(id = %id, "Confirming order");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'confirmed', confirmed_at = ?2, updated_at = ?2
            WHERE id = ?1 AND status = 'pending' AND remaining_cents = 0
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(if order_exists(&mut tx, id).await? {
                DbError::conflict("Order", id)
            } else {
                DbError::not_found("Order", id)
            });
        }

        let order = fetch_order(&mut tx, id).await?;

        // Lifetime counters move in the same transaction as the status flip.
        sqlx::query(
            r#"
            UPDATE clients
            SET total_orders = total_orders + 1,
                total_spent_cents = total_spent_cents + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&order.client_id)
        .bind(order.total_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let (total_orders, total_spent_cents): (i64, i64) =
            sqlx::query_as("SELECT total_orders, total_spent_cents FROM clients WHERE id = ?1")
                .bind(&order.client_id)
                .fetch_one(&mut *tx)
                .await?;

        let tier = recompute_tier(total_orders, Money::from_cents(total_spent_cents));

        sqlx::query("UPDATE clients SET tier = ?2 WHERE id = ?1")
            .bind(&order.client_id)
            .bind(tier)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(id = %id, tier = ?tier, "Order confirmed");
        Ok(order)
    }

    /// Cancels a pending order and restores its stock.
    ///
    /// ## What This Does (single transaction)
    /// 1. Flips status with `WHERE status = 'pending'`
    /// 2. Stamps `canceled_at` and stores the reason
    /// 3. Adds each item's quantity back to its product's stock
    ///
    /// ## Returns
    /// * `Ok(Order)` - The canceled order
    /// * `Err(DbError::Conflict)` - Order is no longer pending
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> DbResult<Order> {
        debug!(id = %id, "Canceling order");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'canceled', canceled_at = ?2, updated_at = ?2, cancel_reason = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(reason)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(if order_exists(&mut tx, id).await? {
                DbError::conflict("Order", id)
            } else {
                DbError::not_found("Order", id)
            });
        }

        // Compensate the creation-time decrement, item by item.
        let items: Vec<(String, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM order_items WHERE order_id = ?1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        for (product_id, quantity) in &items {
            sqlx::query(
                r#"
                UPDATE products
                SET stock = stock + ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(product_id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let order = fetch_order(&mut tx, id).await?;

        tx.commit().await?;

        debug!(id = %id, restored_items = items.len(), "Order canceled");
        Ok(order)
    }

    /// Sets an order's status unconditionally.
    ///
    /// Administrative override: no guards, no timestamps beyond
    /// `updated_at`, and no side effects — stock, balances, and client
    /// counters are left exactly as they are.
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Aggregate order statistics across all clients.
    ///
    /// The average is computed in integer cents with half-up rounding
    /// rather than SQL's `AVG`, so it follows the same rounding rules as
    /// every other derived amount.
    pub async fn statistics(&self) -> DbResult<OrderStatistics> {
        let (confirmed_count, confirmed_total_cents, pending_count, canceled_count): (
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(CASE WHEN status = 'confirmed' THEN 1 END),
                COALESCE(SUM(CASE WHEN status = 'confirmed' THEN total_cents END), 0),
                COUNT(CASE WHEN status = 'pending' THEN 1 END),
                COUNT(CASE WHEN status = 'canceled' THEN 1 END)
            FROM orders
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let average_confirmed_cents = if confirmed_count > 0 {
            Money::from_cents(confirmed_total_cents)
                .div_round(confirmed_count)
                .cents()
        } else {
            0
        };

        Ok(OrderStatistics {
            confirmed_count,
            confirmed_total_cents,
            pending_count,
            canceled_count,
            average_confirmed_cents,
        })
    }
}

/// Loads a full order row inside a transaction.
async fn fetch_order(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, id: &str) -> DbResult<Order> {
    sqlx::query_as::<_, Order>(
        r#"
        SELECT id, client_id, status,
               subtotal_cents, loyalty_discount_cents, promo_discount_cents,
               discount_cents, taxable_cents, tax_rate_bps, tax_cents,
               total_cents, remaining_cents, promo_code,
               confirmed_at, canceled_at, cancel_reason,
               created_at, updated_at
        FROM orders
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| DbError::not_found("Order", id))
}

/// Tells a missing order apart from a lost guard race.
async fn order_exists(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, id: &str) -> DbResult<bool> {
    let row: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(row.is_some())
}

// =============================================================================
// Unit Tests
// =============================================================================
