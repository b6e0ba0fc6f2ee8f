//! # Payment Service
//!
//! Records payments against an order's remaining balance and reverses them
//! for corrections.
//!
//! ## Rules
//! - Amounts are positive; zero and negative payments are rejected before
//!   the balance is even read
//! - A payment may never exceed the remaining balance ("Payment amount (X)
//!   exceeds remaining amount (Y)")
//! - Sequence numbers are 1-based per order: count of existing payments
//!   plus one
//! - Recorded payments are SETTLED; only their status may change afterwards
//! - Deletion adds the amount back to the balance and removes the record.
//!   Correction path only, not part of the normal flow.
//!
//! Order status is deliberately not checked here: the balance rule alone
//! governs. A confirmed order has a zero balance, so any positive payment
//! against it fails as an overpayment.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use chrono::NaiveDate;
use vega_core::validation::{validate_payment_amount, validate_reference};
use vega_core::{Money, Payment, PaymentMethod, PaymentStatus};
use vega_db::Database;

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Request Types
// =============================================================================

/// A payment to be recorded against an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount_cents: i64,
    pub method: PaymentMethod,
    /// External reference (wire id, check number); at most 100 characters.
    pub reference: Option<String>,
    /// Due date for deferred instruments such as checks.
    pub due_date: Option<NaiveDate>,
}

// =============================================================================
// Payment Service
// =============================================================================

/// Service for recording and correcting payments.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: Database,
}

impl PaymentService {
    /// Creates a new PaymentService.
    pub fn new(db: Database) -> Self {
        PaymentService { db }
    }

    /// Records a payment, reducing the order's remaining balance.
    ///
    /// The pure overpayment guard runs against a fresh read so the caller
    /// gets the amounts in the error message; the guarded UPDATE inside the
    /// repository stays authoritative if another payment lands in between.
    pub async fn record_payment(
        &self,
        order_id: &str,
        req: NewPayment,
    ) -> ServiceResult<Payment> {
        debug!(order_id = %order_id, amount = req.amount_cents, "Recording payment");

        validate_payment_amount(req.amount_cents)?;
        if let Some(reference) = &req.reference {
            validate_reference(reference)?;
        }

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))?;
        order.ensure_accepts_payment(Money::from_cents(req.amount_cents))?;

        let payment = self
            .db
            .payments()
            .record(
                order_id,
                req.amount_cents,
                req.method,
                req.reference,
                req.due_date,
            )
            .await?;

        info!(
            order_id = %order_id,
            payment_id = %payment.id,
            payment_number = payment.payment_number,
            amount = %payment.amount(),
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Deletes a payment, adding its amount back to the order's balance.
    pub async fn delete_payment(&self, payment_id: &str) -> ServiceResult<()> {
        debug!(payment_id = %payment_id, "Deleting payment");

        self.db.payments().delete(payment_id).await?;

        info!(payment_id = %payment_id, "Payment deleted, balance restored");
        Ok(())
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: &str) -> ServiceResult<Payment> {
        self.db
            .payments()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Payment", id))
    }

    /// Lists an order's payments in sequence order.
    pub async fn list_payments(&self, order_id: &str) -> ServiceResult<Vec<Payment>> {
        Ok(self.db.payments().list_for_order(order_id).await?)
    }

    /// Updates a payment's status (e.g., a check bouncing to REJECTED).
    pub async fn update_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
    ) -> ServiceResult<Payment> {
        self.db.payments().update_status(payment_id, status).await?;
        self.get_payment(payment_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::orders::{NewOrder, NewOrderItem, OrderService};
    use chrono::Utc;
    use uuid::Uuid;
    use vega_core::{Client, CoreError, LoyaltyTier, Product};
    use vega_db::DbConfig;

    async fn setup() -> (PaymentService, OrderService, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (
            PaymentService::new(db.clone()),
            OrderService::new(db.clone()),
            db,
        )
    }

    /// Creates a pending order for `quantity` units of a 100.00 product.
    async fn seed_order(db: &Database, orders: &OrderService, quantity: i64) -> String {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: "Bruno Keller".to_string(),
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            tier: LoyaltyTier::Basic,
            total_orders: 0,
            total_spent_cents: 0,
            created_at: now,
            updated_at: now,
        };
        db.clients().insert(&client).await.unwrap();

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: format!("Monitor Arm {}", Uuid::new_v4().simple()),
            price_cents: 10_000,
            stock: 50,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();

        let order = orders
            .create_order(NewOrder {
                client_id: client.id,
                items: vec![NewOrderItem {
                    product_id: product.id,
                    quantity,
                }],
                promo_code: None,
            })
            .await
            .unwrap();
        order.id
    }

    fn payment(amount_cents: i64) -> NewPayment {
        NewPayment {
            amount_cents,
            method: PaymentMethod::Card,
            reference: None,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn partial_payments_run_the_balance_down() {
        let (payments, orders, db) = setup().await;
        // 3 × 100.00 + 20% tax = 360.00.
        let order_id = seed_order(&db, &orders, 3).await;

        let first = payments.record_payment(&order_id, payment(20_000)).await.unwrap();
        assert_eq!(first.payment_number, 1);
        assert_eq!(first.status, PaymentStatus::Settled);

        let second = payments.record_payment(&order_id, payment(16_000)).await.unwrap();
        assert_eq!(second.payment_number, 2);

        let order = orders.get_order(&order_id).await.unwrap();
        assert_eq!(order.remaining_cents, 0);
    }

    #[tokio::test]
    async fn overpayment_reports_both_amounts() {
        let (payments, orders, db) = setup().await;
        let order_id = seed_order(&db, &orders, 3).await; // total 360.00

        let err = payments
            .record_payment(&order_id, payment(40_000))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Payment amount (400.00) exceeds remaining amount (360.00)"
        );
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Overpayment { .. })
        ));

        // Balance untouched.
        let order = orders.get_order(&order_id).await.unwrap();
        assert_eq!(order.remaining_cents, 36_000);
    }

    #[tokio::test]
    async fn invalid_amounts_and_references_are_rejected() {
        let (payments, orders, db) = setup().await;
        let order_id = seed_order(&db, &orders, 1).await;

        for amount in [0, -500] {
            let err = payments
                .record_payment(&order_id, payment(amount))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }

        let err = payments
            .record_payment(
                &order_id,
                NewPayment {
                    amount_cents: 1_000,
                    method: PaymentMethod::BankTransfer,
                    reference: Some("R".repeat(101)),
                    due_date: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = payments
            .record_payment("missing", payment(1_000))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_payment_reopens_the_balance() {
        let (payments, orders, db) = setup().await;
        let order_id = seed_order(&db, &orders, 3).await; // total 360.00

        let recorded = payments.record_payment(&order_id, payment(36_000)).await.unwrap();
        assert_eq!(
            orders.get_order(&order_id).await.unwrap().remaining_cents,
            0
        );

        payments.delete_payment(&recorded.id).await.unwrap();
        assert_eq!(
            orders.get_order(&order_id).await.unwrap().remaining_cents,
            36_000
        );
        assert!(payments.get_payment(&recorded.id).await.unwrap_err().is_not_found());

        // The freed number is assigned again: count + 1.
        let replacement = payments.record_payment(&order_id, payment(36_000)).await.unwrap();
        assert_eq!(replacement.payment_number, 1);
    }

    #[tokio::test]
    async fn check_payments_carry_reference_due_date_and_status() {
        let (payments, orders, db) = setup().await;
        let order_id = seed_order(&db, &orders, 1).await; // total 120.00

        let due = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let recorded = payments
            .record_payment(
                &order_id,
                NewPayment {
                    amount_cents: 12_000,
                    method: PaymentMethod::Check,
                    reference: Some("CHK-0099".to_string()),
                    due_date: Some(due),
                },
            )
            .await
            .unwrap();
        assert_eq!(recorded.reference.as_deref(), Some("CHK-0099"));
        assert_eq!(recorded.due_date, Some(due));

        let rejected = payments
            .update_status(&recorded.id, PaymentStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(rejected.status, PaymentStatus::Rejected);
    }
}
