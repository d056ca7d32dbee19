//! # Validation Module
//!
//! Input validation for engine operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP adapter (apps/api)                                      │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine operation (vorca-db)                                  │
//! │  └── THIS MODULE: business rule validation, before any write           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (sku, invoice_number, location code, product+location)     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vorca_core::validation::{validate_delta, validate_sku};
//!
//! validate_sku("BN-CN-001").unwrap();
//! assert!(validate_delta(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{AdjustmentReason, TransferLine};
use crate::{MAX_ADJUSTMENT_QUANTITY, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use vorca_core::validation::validate_sku;
///
/// assert!(validate_sku("BN-CN-001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product or location).
///
/// Non-empty after trimming, at most 200 characters.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a location code such as `KMG`.
///
/// ## Rules
/// - 2 to 10 characters
/// - Upper-case ASCII letters and digits only
pub fn validate_location_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 10 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 10,
        });
    }

    if code.len() < 2
        || !code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must be 2-10 upper-case letters or digits".to_string(),
        });
    }

    Ok(())
}

/// Validates that a reference id is present.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an inventory delta: non-zero, magnitude at most
/// [`MAX_ADJUSTMENT_QUANTITY`].
pub fn validate_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::MustBeNonZero {
            field: "quantity".to_string(),
        });
    }

    match delta.checked_abs() {
        Some(magnitude) if magnitude <= MAX_ADJUSTMENT_QUANTITY => {}
        _ => {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: -MAX_ADJUSTMENT_QUANTITY,
                max: MAX_ADJUSTMENT_QUANTITY,
            })
        }
    }

    Ok(())
}

/// Validates a cart line quantity.
///
/// ```text
/// qty <= 0   → "quantity must be positive"
/// qty > 999  → "quantity must be between 1 and 999"
/// ```
pub fn validate_item_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit or list price: strictly positive.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a sale discount: zero or more.
pub fn validate_discount(discount: Money) -> ValidationResult<()> {
    if discount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        });
    }

    Ok(())
}

/// Validates a product cost: zero or more.
pub fn validate_cost(cost: Money) -> ValidationResult<()> {
    if cost.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "cost".to_string(),
        });
    }

    Ok(())
}

/// Validates a low-stock threshold: zero or more.
pub fn validate_threshold(threshold: i64) -> ValidationResult<()> {
    if threshold < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "lowStockThreshold".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Rejects the internal SALE reason on caller-submitted adjustments.
pub fn validate_caller_reason(reason: AdjustmentReason) -> ValidationResult<()> {
    if !reason.is_caller_reason() {
        return Err(ValidationError::NotAllowed {
            field: "reason".to_string(),
            allowed: AdjustmentReason::CALLER_REASONS
                .iter()
                .map(|r| r.as_str().to_string())
                .collect(),
        });
    }

    Ok(())
}

/// Validates a transfer request before any lookup.
///
/// ## Rules
/// - Source and destination are present and different
/// - At least one item
/// - Every item names a product and moves a positive quantity
pub fn validate_transfer_request(
    from_location_id: &str,
    to_location_id: &str,
    items: &[TransferLine],
) -> ValidationResult<()> {
    validate_id("fromLocationId", from_location_id)?;
    validate_id("toLocationId", to_location_id)?;

    if from_location_id == to_location_id {
        return Err(ValidationError::MustDiffer {
            field: "toLocationId".to_string(),
            other: "fromLocationId".to_string(),
        });
    }

    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    for item in items {
        validate_id("productId", &item.product_id)?;
        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, quantity: i64) -> TransferLine {
        TransferLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("BN-CN-001").is_ok());
        assert!(validate_sku("latte_12").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_location_code() {
        assert!(validate_location_code("KMG").is_ok());
        assert!(validate_location_code("STB2").is_ok());

        assert!(validate_location_code("").is_err());
        assert!(validate_location_code("K").is_err());
        assert!(validate_location_code("kmg").is_err());
        assert!(validate_location_code("KEMANG-RAYA").is_err());
    }

    #[test]
    fn test_validate_delta() {
        assert!(validate_delta(5).is_ok());
        assert!(validate_delta(-3).is_ok());
        assert!(matches!(
            validate_delta(0),
            Err(ValidationError::MustBeNonZero { .. })
        ));

        assert!(validate_delta(MAX_ADJUSTMENT_QUANTITY).is_ok());
        assert!(validate_delta(-MAX_ADJUSTMENT_QUANTITY).is_ok());
        assert!(matches!(
            validate_delta(MAX_ADJUSTMENT_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        // i64::MIN has no absolute value
        assert!(matches!(
            validate_delta(i64::MIN),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_delta(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_item_quantity() {
        assert!(validate_item_quantity(1).is_ok());
        assert!(validate_item_quantity(999).is_ok());

        assert!(validate_item_quantity(0).is_err());
        assert!(validate_item_quantity(-1).is_err());
        assert!(validate_item_quantity(1000).is_err());
    }

    #[test]
    fn test_money_validators() {
        assert!(validate_price("unitPrice", Money::from_minor(1)).is_ok());
        assert!(validate_price("unitPrice", Money::zero()).is_err());
        assert!(validate_discount(Money::zero()).is_ok());
        assert!(validate_discount(Money::from_minor(-1)).is_err());
        assert!(validate_cost(Money::from_minor(-5)).is_err());
    }

    #[test]
    fn test_validate_threshold_and_tax_rate() {
        assert!(validate_threshold(0).is_ok());
        assert!(validate_threshold(-1).is_err());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_caller_reason() {
        for reason in AdjustmentReason::CALLER_REASONS {
            assert!(validate_caller_reason(reason).is_ok());
        }
        assert!(validate_caller_reason(AdjustmentReason::Transfer).is_ok());
        assert!(validate_caller_reason(AdjustmentReason::Sale).is_err());
    }

    #[test]
    fn test_validate_transfer_request() {
        assert!(validate_transfer_request("a", "b", &[line("p", 5)]).is_ok());

        assert!(matches!(
            validate_transfer_request("a", "a", &[line("p", 5)]),
            Err(ValidationError::MustDiffer { .. })
        ));
        assert!(matches!(
            validate_transfer_request("a", "b", &[]),
            Err(ValidationError::Empty { .. })
        ));
        assert!(validate_transfer_request("a", "b", &[line("p", 0)]).is_err());
        assert!(validate_transfer_request("a", "b", &[line("", 1)]).is_err());
        assert!(validate_transfer_request("", "b", &[line("p", 1)]).is_err());
    }
}
