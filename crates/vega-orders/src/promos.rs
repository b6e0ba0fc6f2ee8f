//! # Promo Code Service
//!
//! Creates and administers single-use promo codes.
//!
//! Codes are `PROMO-` plus exactly five upper-case alphanumerics; when the
//! caller supplies none, one is generated. Consumption normally happens
//! inside the order-creation transaction; the `consume` operation here is
//! the administrative equivalent, and `reactivate` undoes it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use chrono::Utc;
use vega_core::validation::{validate_discount_bps, validate_promo_code_format};
use vega_core::PromoCode;
use vega_db::Database;

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Request Types
// =============================================================================

/// A promo code to be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPromoCode {
    /// Generated when absent.
    pub code: Option<String>,
    /// Discount in basis points, 1-10000 (0.01%-100.00%).
    pub discount_bps: u32,
}

// =============================================================================
// Promo Code Service
// =============================================================================

/// Service for promo code administration.
#[derive(Debug, Clone)]
pub struct PromoCodeService {
    db: Database,
}

impl PromoCodeService {
    /// Creates a new PromoCodeService.
    pub fn new(db: Database) -> Self {
        PromoCodeService { db }
    }

    /// Creates a promo code, generating one when none is supplied.
    ///
    /// ## Returns
    /// * `Ok(PromoCode)` - Available for a single use
    /// * `Err(_)` - Bad discount or format (`Validation`), code already
    ///   exists (`Duplicate`)
    pub async fn create(&self, req: NewPromoCode) -> ServiceResult<PromoCode> {
        validate_discount_bps(req.discount_bps)?;

        let code = match req.code {
            Some(code) => {
                validate_promo_code_format(&code)?;
                code
            }
            None => PromoCode::generate_code(),
        };
        debug!(code = %code, discount_bps = req.discount_bps, "Creating promo code");

        let now = Utc::now();
        let promo = PromoCode {
            id: Uuid::new_v4().to_string(),
            code,
            discount_bps: req.discount_bps,
            available: true,
            created_at: now,
            updated_at: now,
        };
        self.db.promo_codes().insert(&promo).await?;

        info!(code = %promo.code, "Promo code created");
        Ok(promo)
    }

    /// Gets a promo code by its code string.
    pub async fn get(&self, code: &str) -> ServiceResult<PromoCode> {
        self.db
            .promo_codes()
            .get_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::not_found("Promo code", code))
    }

    /// Lists promo codes, newest first.
    pub async fn list(&self, limit: u32) -> ServiceResult<Vec<PromoCode>> {
        Ok(self.db.promo_codes().list(limit).await?)
    }

    /// Consumes a code outside an order (administrative).
    ///
    /// Fails as a duplicate use when the code was already consumed.
    pub async fn consume(&self, code: &str) -> ServiceResult<()> {
        self.db.promo_codes().consume(code).await?;
        info!(code = %code, "Promo code consumed");
        Ok(())
    }

    /// Makes a consumed code available again (administrative reset).
    pub async fn reactivate(&self, code: &str) -> ServiceResult<PromoCode> {
        self.db.promo_codes().reactivate(code).await?;
        info!(code = %code, "Promo code reactivated");
        self.get(code).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use vega_core::validation::validate_promo_code_format as check_format;
    use vega_db::DbConfig;

    async fn setup() -> PromoCodeService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        PromoCodeService::new(db)
    }

    #[tokio::test]
    async fn create_with_explicit_code() {
        let service = setup().await;

        let promo = service
            .create(NewPromoCode {
                code: Some("PROMO-VIP15".to_string()),
                discount_bps: 1_500,
            })
            .await
            .unwrap();
        assert_eq!(promo.code, "PROMO-VIP15");
        assert!(promo.available);

        let loaded = service.get("PROMO-VIP15").await.unwrap();
        assert_eq!(loaded.discount_bps, 1_500);
    }

    #[tokio::test]
    async fn generated_codes_are_well_formed() {
        let service = setup().await;

        let promo = service
            .create(NewPromoCode {
                code: None,
                discount_bps: 500,
            })
            .await
            .unwrap();
        check_format(&promo.code).unwrap();
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let service = setup().await;

        // Percentage out of range.
        let err = service
            .create(NewPromoCode {
                code: None,
                discount_bps: 0,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = service
            .create(NewPromoCode {
                code: None,
                discount_bps: 10_001,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // Malformed code.
        let err = service
            .create(NewPromoCode {
                code: Some("SALE-AB12X".to_string()),
                discount_bps: 500,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn duplicate_codes_are_rejected() {
        let service = setup().await;

        service
            .create(NewPromoCode {
                code: Some("PROMO-FALL5".to_string()),
                discount_bps: 500,
            })
            .await
            .unwrap();
        let err = service
            .create(NewPromoCode {
                code: Some("PROMO-FALL5".to_string()),
                discount_bps: 800,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
    }

    #[tokio::test]
    async fn consume_is_single_use_until_reactivated() {
        let service = setup().await;
        service
            .create(NewPromoCode {
                code: Some("PROMO-NEW20".to_string()),
                discount_bps: 2_000,
            })
            .await
            .unwrap();

        service.consume("PROMO-NEW20").await.unwrap();
        assert!(!service.get("PROMO-NEW20").await.unwrap().available);

        // Second use is a duplicate, not a silent no-op.
        let err = service.consume("PROMO-NEW20").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_eq!(
            err.to_string(),
            "Promo code PROMO-NEW20 has already been consumed"
        );

        // The administrative reset arms it again.
        let reactivated = service.reactivate("PROMO-NEW20").await.unwrap();
        assert!(reactivated.available);
        service.consume("PROMO-NEW20").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_codes_are_not_found() {
        let service = setup().await;

        assert!(service.get("PROMO-GHOST").await.unwrap_err().is_not_found());
        assert!(service.consume("PROMO-GHOST").await.unwrap_err().is_not_found());
        assert!(service
            .reactivate("PROMO-GHOST")
            .await
            .unwrap_err()
            .is_not_found());
    }
}
