//! # Order Service
//!
//! Prices carts into orders and drives them through their lifecycle.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    OrderService::create_order                           │
//! │                                                                         │
//! │  1. Resolve client ──────────────────────────── NotFound                │
//! │  2. Promo code (when given):                                            │
//! │       format check ──────────────────────────── Validation              │
//! │       lookup ────────────────────────────────── NotFound                │
//! │       availability ──────────────────────────── BusinessRule            │
//! │  3. Per item: quantity > 0, resolve product,                            │
//! │       stock check ───────────────────────────── InsufficientStock       │
//! │  4-10. price_order(): line totals → subtotal →                          │
//! │       loyalty discount → promo discount →                               │
//! │       taxable → tax (20.00%) → total                                    │
//! │  11. remaining balance = total                                          │
//! │  12. transactional commit: order + items +                              │
//! │       stock decrements + promo consumption                              │
//! │       (any failure rolls back all of it)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! Confirm requires a fully paid PENDING order and updates the client's
//! loyalty counters and tier in the same transaction. Cancel requires a
//! PENDING order and restores stock. `set_status` bypasses both guards and
//! exists for corrective operations only; every use is logged at WARN.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use chrono::Utc;
use vega_core::pricing::{price_order, LineItemInput};
use vega_core::validation::{validate_promo_code_format, validate_quantity};
use vega_core::{
    ClientStatistics, Order, OrderItem, OrderStatistics, OrderStatus, Payment, Rate,
    ValidationError, DEFAULT_TAX_RATE_BPS,
};
use vega_db::Database;

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Request / Response Types
// =============================================================================

/// A cart to be priced into an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub client_id: String,
    pub items: Vec<NewOrderItem>,
    /// Applied to the subtotal and consumed on commit.
    pub promo_code: Option<String>,
}

/// One cart line: a product reference and a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
}

/// An order with its lines and payments, for detail views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

// =============================================================================
// Order Service
// =============================================================================

/// Service for pricing carts and driving the order lifecycle.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Prices a cart and commits it as a PENDING order.
    ///
    /// The monetary breakdown is computed up front by the pure pricing
    /// sequence; the commit (order, items, stock decrements, promo
    /// consumption) happens in one transaction. A stock or promo conflict
    /// at commit time rolls the whole order back.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The priced order, status PENDING, nothing paid
    /// * `Err(_)` - See the pipeline diagram in the module docs
    pub async fn create_order(&self, req: NewOrder) -> ServiceResult<Order> {
        debug!(
            client_id = %req.client_id,
            items = req.items.len(),
            promo = req.promo_code.as_deref().unwrap_or("-"),
            "Creating order"
        );

        if req.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }

        // 1. The client's tier drives the loyalty discount.
        let client = self
            .db
            .clients()
            .get_by_id(&req.client_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", &req.client_id))?;

        // 2. Promo code: format, existence, availability. The read-side
        // availability check gives a precise error; the commit re-checks.
        let promo_rate = match &req.promo_code {
            Some(code) => {
                validate_promo_code_format(code)?;
                let promo = self
                    .db
                    .promo_codes()
                    .get_by_code(code)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Promo code", code))?;
                promo.ensure_available()?;
                Some(promo.rate())
            }
            None => None,
        };

        // 3. Resolve products, snapshot prices, pre-check stock.
        let mut resolved = Vec::with_capacity(req.items.len());
        let mut lines = Vec::with_capacity(req.items.len());
        for item in &req.items {
            validate_quantity(item.quantity)?;
            let product = self
                .db
                .products()
                .get_by_id(&item.product_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Product", &item.product_id))?;
            product.ensure_available(item.quantity)?;
            lines.push(LineItemInput {
                unit_price: product.price(),
                quantity: item.quantity,
            });
            resolved.push((product, item.quantity));
        }

        // 4-10. The fixed-order monetary breakdown.
        let breakdown = price_order(
            client.tier,
            &lines,
            promo_rate,
            Rate::from_bps(DEFAULT_TAX_RATE_BPS),
        );

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let order = Order {
            id: order_id.clone(),
            client_id: req.client_id.clone(),
            status: OrderStatus::Pending,
            subtotal_cents: breakdown.subtotal.cents(),
            loyalty_discount_cents: breakdown.loyalty_discount.cents(),
            promo_discount_cents: breakdown.promo_discount.cents(),
            discount_cents: breakdown.total_discount.cents(),
            taxable_cents: breakdown.taxable.cents(),
            tax_rate_bps: breakdown.tax_rate.bps(),
            tax_cents: breakdown.tax.cents(),
            total_cents: breakdown.total.cents(),
            // 11. Nothing paid yet.
            remaining_cents: breakdown.total.cents(),
            promo_code: req.promo_code.clone(),
            confirmed_at: None,
            canceled_at: None,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<OrderItem> = resolved
            .iter()
            .zip(&breakdown.line_totals)
            .map(|((product, quantity), line_total)| OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                unit_price_cents: product.price_cents,
                quantity: *quantity,
                line_total_cents: line_total.cents(),
                created_at: now,
            })
            .collect();

        // 12. Transactional commit.
        self.db.orders().create_order(&order, &items).await?;

        info!(
            order_id = %order.id,
            client_id = %order.client_id,
            total = %order.total(),
            items = items.len(),
            "Order created"
        );
        Ok(order)
    }

    /// Gets an order by ID.
    pub async fn get_order(&self, id: &str) -> ServiceResult<Order> {
        self.db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))
    }

    /// Gets an order together with its items and payments.
    pub async fn order_details(&self, id: &str) -> ServiceResult<OrderDetails> {
        let order = self.get_order(id).await?;
        let items = self.db.orders().get_items(id).await?;
        let payments = self.db.payments().list_for_order(id).await?;
        Ok(OrderDetails {
            order,
            items,
            payments,
        })
    }

    /// Lists a client's orders, newest first.
    pub async fn list_orders_by_client(
        &self,
        client_id: &str,
        limit: u32,
    ) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().list_by_client(client_id, limit).await?)
    }

    /// Confirms a fully paid PENDING order.
    ///
    /// The pure guard runs first so the caller gets the precise business
    /// error (`NotFullyPaid` with the remainder, or `InvalidStatus`); the
    /// guarded UPDATE inside the repository remains authoritative if a
    /// concurrent writer got there in between.
    ///
    /// On success the client's order count and spend are incremented and
    /// the tier recomputed, all in the same transaction.
    pub async fn confirm_order(&self, id: &str) -> ServiceResult<Order> {
        debug!(order_id = %id, "Confirming order");

        let order = self.get_order(id).await?;
        order.ensure_can_confirm()?;

        let confirmed = self.db.orders().confirm(id).await?;

        info!(
            order_id = %id,
            client_id = %confirmed.client_id,
            total = %confirmed.total(),
            "Order confirmed"
        );
        Ok(confirmed)
    }

    /// Cancels a PENDING order, restoring the stock its items held.
    pub async fn cancel_order(&self, id: &str, reason: Option<String>) -> ServiceResult<Order> {
        debug!(order_id = %id, "Canceling order");

        let order = self.get_order(id).await?;
        order.ensure_can_cancel()?;

        let canceled = self.db.orders().cancel(id, reason.as_deref()).await?;

        info!(order_id = %id, "Order canceled");
        Ok(canceled)
    }

    /// Administrative status override. Bypasses the lifecycle guards and
    /// triggers none of their side effects (no stock restore, no loyalty
    /// update).
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> ServiceResult<Order> {
        let current = self.get_order(id).await?;

        warn!(
            order_id = %id,
            from = %current.status,
            to = %status,
            "Administrative status override, lifecycle guards bypassed"
        );

        Ok(self.db.orders().set_status(id, status).await?)
    }

    /// Aggregate statistics across all orders.
    pub async fn order_statistics(&self) -> ServiceResult<OrderStatistics> {
        Ok(self.db.orders().statistics().await?)
    }

    /// A client's loyalty summary: tier, counters, average order value.
    pub async fn client_statistics(&self, client_id: &str) -> ServiceResult<ClientStatistics> {
        let client = self
            .db
            .clients()
            .get_by_id(client_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", client_id))?;

        Ok(ClientStatistics {
            average_order_cents: client.average_order_value().cents(),
            client_id: client.id,
            tier: client.tier,
            total_orders: client.total_orders,
            total_spent_cents: client.total_spent_cents,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::payments::{NewPayment, PaymentService};
    use vega_core::{Client, CoreError, LoyaltyTier, PaymentMethod, Product, PromoCode};
    use vega_db::{DbConfig, DbError};

    async fn setup() -> (OrderService, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (OrderService::new(db.clone()), db)
    }

    async fn seed_client(db: &Database, tier: LoyaltyTier, orders: i64, spent_cents: i64) -> Client {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: "Ada Moreno".to_string(),
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            tier,
            total_orders: orders,
            total_spent_cents: spent_cents,
            created_at: now,
            updated_at: now,
        };
        db.clients().insert(&client).await.unwrap();
        client
    }

    async fn seed_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            price_cents,
            stock,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    async fn seed_promo(db: &Database, code: &str, discount_bps: u32) -> PromoCode {
        let now = Utc::now();
        let promo = PromoCode {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            discount_bps,
            available: true,
            created_at: now,
            updated_at: now,
        };
        db.promo_codes().insert(&promo).await.unwrap();
        promo
    }

    fn cart(client: &Client, product: &Product, quantity: i64) -> NewOrder {
        NewOrder {
            client_id: client.id.clone(),
            items: vec![NewOrderItem {
                product_id: product.id.clone(),
                quantity,
            }],
            promo_code: None,
        }
    }

    #[tokio::test]
    async fn silver_below_minimum_gets_no_discount() {
        let (service, db) = setup().await;
        let client = seed_client(&db, LoyaltyTier::Silver, 0, 0).await;
        let product = seed_product(&db, "Turntable Pro", 10_000, 10).await;

        // 3 × 100.00 = 300.00, below SILVER's 500.00 floor.
        let order = service.create_order(cart(&client, &product, 3)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal_cents, 30_000);
        assert_eq!(order.loyalty_discount_cents, 0);
        assert_eq!(order.discount_cents, 0);
        assert_eq!(order.taxable_cents, 30_000);
        assert_eq!(order.tax_cents, 6_000);
        assert_eq!(order.total_cents, 36_000);
        assert_eq!(order.remaining_cents, 36_000);

        // Commit decremented the stock.
        let product = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock, 7);
    }

    #[tokio::test]
    async fn silver_above_minimum_gets_five_percent() {
        let (service, db) = setup().await;
        let client = seed_client(&db, LoyaltyTier::Silver, 0, 0).await;
        let product = seed_product(&db, "Turntable Pro", 10_000, 10).await;

        // 6 × 100.00 = 600.00: the 5% discount applies.
        let order = service.create_order(cart(&client, &product, 6)).await.unwrap();

        assert_eq!(order.subtotal_cents, 60_000);
        assert_eq!(order.loyalty_discount_cents, 3_000);
        assert_eq!(order.taxable_cents, 57_000);
        assert_eq!(order.tax_cents, 11_400);
        assert_eq!(order.total_cents, 68_400);
    }

    #[tokio::test]
    async fn promo_discount_applies_and_code_is_consumed() {
        let (service, db) = setup().await;
        let client = seed_client(&db, LoyaltyTier::Basic, 0, 0).await;
        let product = seed_product(&db, "Desk Lamp Max", 10_000, 10).await;
        seed_promo(&db, "PROMO-TEN10", 1_000).await;

        let mut req = cart(&client, &product, 3);
        req.promo_code = Some("PROMO-TEN10".to_string());
        let order = service.create_order(req).await.unwrap();

        // 10% of 300.00 on the subtotal.
        assert_eq!(order.subtotal_cents, 30_000);
        assert_eq!(order.promo_discount_cents, 3_000);
        assert_eq!(order.taxable_cents, 27_000);
        assert_eq!(order.total_cents, 32_400);
        assert_eq!(order.promo_code.as_deref(), Some("PROMO-TEN10"));

        // Single use: the code is gone now.
        let promo = db
            .promo_codes()
            .get_by_code("PROMO-TEN10")
            .await
            .unwrap()
            .unwrap();
        assert!(!promo.available);

        // A second cart with the same code is rejected up front.
        let mut again = cart(&client, &product, 1);
        again.promo_code = Some("PROMO-TEN10".to_string());
        let err = service.create_order(again).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::PromoUnavailable { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::BusinessRule);
    }

    #[tokio::test]
    async fn insufficient_stock_reports_both_counts() {
        let (service, db) = setup().await;
        let client = seed_client(&db, LoyaltyTier::Basic, 0, 0).await;
        let product = seed_product(&db, "Camp Stove Bundle", 5_000, 3).await;

        let err = service
            .create_order(cart(&client, &product, 5))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Insufficient stock for product: Camp Stove Bundle. Available: 3, Requested: 5"
        );
        assert_eq!(err.kind(), ErrorKind::BusinessRule);

        // Nothing committed.
        let product = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock, 3);
    }

    #[tokio::test]
    async fn validation_and_lookups_fail_fast() {
        let (service, db) = setup().await;
        let client = seed_client(&db, LoyaltyTier::Basic, 0, 0).await;
        let product = seed_product(&db, "Webcam Compact", 4_000, 5).await;

        // Empty cart.
        let err = service
            .create_order(NewOrder {
                client_id: client.id.clone(),
                items: vec![],
                promo_code: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // Zero quantity.
        let err = service
            .create_order(cart(&client, &product, 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // Malformed promo code never reaches the database.
        let mut req = cart(&client, &product, 1);
        req.promo_code = Some("promo-ab12x".to_string());
        let err = service.create_order(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // Unknown client / product / promo.
        let mut req = cart(&client, &product, 1);
        req.client_id = "missing".to_string();
        assert_eq!(
            service.create_order(req).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );

        let err = service
            .create_order(NewOrder {
                client_id: client.id.clone(),
                items: vec![NewOrderItem {
                    product_id: "missing".to_string(),
                    quantity: 1,
                }],
                promo_code: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let mut req = cart(&client, &product, 1);
        req.promo_code = Some("PROMO-ZZZZ9".to_string());
        assert_eq!(
            service.create_order(req).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn full_payment_confirm_updates_loyalty() {
        let (service, db) = setup().await;
        let payments = PaymentService::new(db.clone());

        // 2 orders / 1000.00 spent: Silver by the spend threshold.
        let client = seed_client(&db, LoyaltyTier::Silver, 2, 100_000).await;
        let product = seed_product(&db, "Turntable Pro", 10_000, 10).await;

        let order = service.create_order(cart(&client, &product, 6)).await.unwrap();
        assert_eq!(order.total_cents, 68_400);

        // Confirming before payment reports the exact remainder.
        let err = service.confirm_order(&order.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot confirm order, it is not fully paid. Remaining: 684.00"
        );
        assert_eq!(err.kind(), ErrorKind::BusinessRule);

        // Two payments zero the balance out exactly.
        payments
            .record_payment(
                &order.id,
                NewPayment {
                    amount_cents: 40_000,
                    method: PaymentMethod::Card,
                    reference: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();
        payments
            .record_payment(
                &order.id,
                NewPayment {
                    amount_cents: 28_400,
                    method: PaymentMethod::Cash,
                    reference: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();

        let confirmed = service.confirm_order(&order.id).await.unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.remaining_cents, 0);
        assert!(confirmed.confirmed_at.is_some());

        // Loyalty: 3 orders now, 1684.00 spent → Silver by order count.
        let client = db.clients().get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(client.total_orders, 3);
        assert_eq!(client.total_spent_cents, 168_400);
        assert_eq!(client.tier, LoyaltyTier::Silver);

        // A third payment of any positive amount now overpays.
        let err = payments
            .record_payment(
                &order.id,
                NewPayment {
                    amount_cents: 1,
                    method: PaymentMethod::Cash,
                    reference: None,
                    due_date: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Overpayment { .. })
        ));

        // The payment sequence stayed 1, 2.
        let recorded = payments.list_payments(&order.id).await.unwrap();
        assert_eq!(
            recorded.iter().map(|p| p.payment_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn confirm_promotes_tier_across_threshold() {
        let (service, db) = setup().await;
        let payments = PaymentService::new(db.clone());

        // 9 orders / 4900.00: one more order crosses Gold's count threshold.
        let client = seed_client(&db, LoyaltyTier::Silver, 9, 490_000).await;
        let product = seed_product(&db, "Espresso Machine Max", 30_000, 5).await;

        let order = service.create_order(cart(&client, &product, 1)).await.unwrap();
        payments
            .record_payment(
                &order.id,
                NewPayment {
                    amount_cents: order.total_cents,
                    method: PaymentMethod::BankTransfer,
                    reference: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();
        service.confirm_order(&order.id).await.unwrap();

        let client = db.clients().get_by_id(&client.id).await.unwrap().unwrap();
        assert_eq!(client.total_orders, 10);
        assert_eq!(client.tier, LoyaltyTier::Gold);
    }

    #[tokio::test]
    async fn cancel_restores_stock_and_terminal_states_stay_terminal() {
        let (service, db) = setup().await;
        let client = seed_client(&db, LoyaltyTier::Basic, 0, 0).await;
        let product = seed_product(&db, "Hammock Standard", 6_000, 8).await;

        let order = service.create_order(cart(&client, &product, 3)).await.unwrap();
        assert_eq!(
            db.products().get_by_id(&product.id).await.unwrap().unwrap().stock,
            5
        );

        let canceled = service
            .cancel_order(&order.id, Some("customer changed mind".to_string()))
            .await
            .unwrap();
        assert_eq!(canceled.status, OrderStatus::Canceled);
        assert_eq!(
            canceled.cancel_reason.as_deref(),
            Some("customer changed mind")
        );
        assert_eq!(
            db.products().get_by_id(&product.id).await.unwrap().unwrap().stock,
            8
        );

        // Neither transition leaves a terminal state.
        let err = service.cancel_order(&order.id, None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Order cannot be canceled. Current status: CANCELED"
        );
        let err = service.confirm_order(&order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(_)));
    }

    #[tokio::test]
    async fn set_status_overrides_without_side_effects() {
        let (service, db) = setup().await;
        let client = seed_client(&db, LoyaltyTier::Basic, 0, 0).await;
        let product = seed_product(&db, "Dry Bag Pro", 2_500, 6).await;

        let order = service.create_order(cart(&client, &product, 2)).await.unwrap();
        service
            .cancel_order(&order.id, None)
            .await
            .unwrap();

        // Out of CANCELED and back to PENDING, guards notwithstanding.
        let reopened = service
            .set_status(&order.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(reopened.status, OrderStatus::Pending);

        // No stock was re-decremented by the override.
        assert_eq!(
            db.products().get_by_id(&product.id).await.unwrap().unwrap().stock,
            6
        );
    }

    #[tokio::test]
    async fn order_details_and_listing() {
        let (service, db) = setup().await;
        let payments = PaymentService::new(db.clone());
        let client = seed_client(&db, LoyaltyTier::Basic, 0, 0).await;
        let product = seed_product(&db, "Chef Knife Standard", 8_000, 10).await;

        let first = service.create_order(cart(&client, &product, 1)).await.unwrap();
        let second = service.create_order(cart(&client, &product, 2)).await.unwrap();
        payments
            .record_payment(
                &first.id,
                NewPayment {
                    amount_cents: 1_000,
                    method: PaymentMethod::Cash,
                    reference: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();

        let details = service.order_details(&first.id).await.unwrap();
        assert_eq!(details.order.id, first.id);
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].name_snapshot, "Chef Knife Standard");
        assert_eq!(details.payments.len(), 1);

        let listed = service.list_orders_by_client(&client.id, 50).await.unwrap();
        assert_eq!(listed.len(), 2);

        let _ = second;
        assert!(service.order_details("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn statistics_via_service() {
        let (service, db) = setup().await;
        let payments = PaymentService::new(db.clone());
        let client = seed_client(&db, LoyaltyTier::Basic, 0, 0).await;
        let product = seed_product(&db, "Blender Standard", 15_000, 20).await;

        let confirmed = service.create_order(cart(&client, &product, 1)).await.unwrap();
        payments
            .record_payment(
                &confirmed.id,
                NewPayment {
                    amount_cents: confirmed.total_cents,
                    method: PaymentMethod::Card,
                    reference: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();
        service.confirm_order(&confirmed.id).await.unwrap();

        let pending = service.create_order(cart(&client, &product, 2)).await.unwrap();
        let canceled = service.create_order(cart(&client, &product, 1)).await.unwrap();
        service.cancel_order(&canceled.id, None).await.unwrap();

        let stats = service.order_statistics().await.unwrap();
        assert_eq!(stats.confirmed_count, 1);
        assert_eq!(stats.confirmed_total_cents, confirmed.total_cents);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(stats.canceled_count, 1);
        assert_eq!(stats.average_confirmed_cents, confirmed.total_cents);

        let client_stats = service.client_statistics(&client.id).await.unwrap();
        assert_eq!(client_stats.total_orders, 1);
        assert_eq!(client_stats.total_spent_cents, confirmed.total_cents);
        assert_eq!(client_stats.average_order_cents, confirmed.total_cents);

        let _ = pending;
    }

    #[tokio::test]
    async fn commit_conflict_rolls_back_cleanly() {
        let (service, db) = setup().await;
        let client = seed_client(&db, LoyaltyTier::Basic, 0, 0).await;
        let product = seed_product(&db, "Rice Cooker Compact", 7_000, 5).await;
        seed_promo(&db, "PROMO-SAVE5", 500).await;

        // Consume the promo between validation and a later attempt, the way
        // a concurrent order would.
        db.promo_codes().consume("PROMO-SAVE5").await.unwrap();

        let mut req = cart(&client, &product, 2);
        req.promo_code = Some("PROMO-SAVE5".to_string());
        let err = service.create_order(req).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::PromoUnavailable { .. })
                | ServiceError::Db(DbError::PromoConsumed { .. })
        ));

        // The failed attempt left no trace.
        assert_eq!(
            db.products().get_by_id(&product.id).await.unwrap().unwrap().stock,
            5
        );
        assert!(service.list_orders_by_client(&client.id, 10).await.unwrap().is_empty());
    }
}
