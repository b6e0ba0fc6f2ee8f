//! # Validation Module
//!
//! Input validation rules, applied before any business logic runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web layer (out of scope)                                     │
//! │  ├── Request shape, required fields                                    │
//! │  └── Immediate caller feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services (vega-orders)                                       │
//! │  └── THIS MODULE: domain input rules                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: each layer catches what the one above missed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vega_core::validation::{validate_promo_code_format, validate_quantity};
//!
//! validate_promo_code_format("PROMO-AB12X").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{PROMO_CODE_PREFIX, PROMO_CODE_SUFFIX_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Promo Codes
// =============================================================================

/// Validates a promo code's format.
///
/// ## Rules
/// - `PROMO-` prefix
/// - Exactly five characters after the prefix
/// - Each one an upper-case letter or digit
///
/// ## Example
/// ```rust
/// use vega_core::validation::validate_promo_code_format;
///
/// assert!(validate_promo_code_format("PROMO-AB12X").is_ok());
/// assert!(validate_promo_code_format("PROMO-ab12x").is_err());
/// assert!(validate_promo_code_format("SALE-AB12X").is_err());
/// ```
pub fn validate_promo_code_format(code: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidFormat {
        field: "promo_code".to_string(),
        reason: format!("expected {PROMO_CODE_PREFIX}XXXXX (five upper-case alphanumerics)"),
    };

    let suffix = code.strip_prefix(PROMO_CODE_PREFIX).ok_or_else(invalid)?;

    if suffix.len() != PROMO_CODE_SUFFIX_LEN {
        return Err(invalid());
    }

    if !suffix
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a promo discount in basis points.
///
/// ## Rules
/// - Between 1 (0.01%) and 10000 (100.00%) inclusive
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps < 1 || bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "discount_bps".to_string(),
            min: 1,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order-line quantity.
///
/// ## Rules
/// - Must be positive (> 0); there is no upper cap
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a payment amount in cents.
///
/// ## Rules
/// - Must be positive (> 0); zero and negative payments are rejected
///   before the overpayment check even runs
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates an optional payment reference.
///
/// ## Rules
/// - At most 100 characters (wire ids, check numbers)
pub fn validate_reference(reference: &str) -> ValidationResult<()> {
    if reference.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "reference".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_promo_code_format() {
        // Valid codes
        assert!(validate_promo_code_format("PROMO-AB12X").is_ok());
        assert!(validate_promo_code_format("PROMO-00000").is_ok());
        assert!(validate_promo_code_format("PROMO-ZZZZZ").is_ok());

        // Invalid codes
        assert!(validate_promo_code_format("").is_err());
        assert!(validate_promo_code_format("PROMO-").is_err());
        assert!(validate_promo_code_format("PROMO-AB12").is_err()); // too short
        assert!(validate_promo_code_format("PROMO-AB12XY").is_err()); // too long
        assert!(validate_promo_code_format("PROMO-ab12x").is_err()); // lower-case
        assert!(validate_promo_code_format("PROMO-AB 2X").is_err()); // space
        assert!(validate_promo_code_format("PROMO-AB1é2").is_err()); // non-ascii
        assert!(validate_promo_code_format("SALE-AB12X").is_err()); // wrong prefix
        assert!(validate_promo_code_format("promo-AB12X").is_err()); // prefix case
    }

    #[test]
    fn test_validate_discount_bps() {
        assert!(validate_discount_bps(1).is_ok()); // 0.01%
        assert!(validate_discount_bps(1000).is_ok()); // 10.00%
        assert!(validate_discount_bps(10_000).is_ok()); // 100.00%

        assert!(validate_discount_bps(0).is_err());
        assert!(validate_discount_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1_000_000).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(1).is_ok());
        assert!(validate_payment_amount(68_400).is_ok());

        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(-100).is_err());
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("").is_ok());
        assert!(validate_reference("WIRE-2024-00042").is_ok());
        assert!(validate_reference(&"R".repeat(100)).is_ok());
        assert!(validate_reference(&"R".repeat(101)).is_err());
    }
}
