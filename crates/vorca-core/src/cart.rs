//! # Cart Totals
//!
//! Cart validation and the arithmetic of a sale.
//!
//! ```text
//! subtotal = Σ unit_price × quantity
//! tax      = subtotal × rate        (half-up, integer)
//! total    = subtotal + tax − discount   (never clamped)
//! ```
//!
//! A discount larger than subtotal + tax yields a negative total. That is
//! accepted and persisted as-is.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CartLine, PaymentMethod, TaxRate};
use crate::validation::{
    validate_discount, validate_id, validate_item_quantity, validate_price, ValidationResult,
};
use crate::MAX_CART_LINES;

/// Validates a cart before checkout touches the store.
///
/// ## Rules
/// - 1 to 100 lines
/// - Every line names a product, sells 1..=999 units at a positive price
pub fn validate_cart(lines: &[CartLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if lines.len() > MAX_CART_LINES {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_CART_LINES,
        });
    }

    for line in lines {
        validate_id("productId", &line.product_id)?;
        validate_item_quantity(line.quantity)?;
        validate_price("unitPrice", line.unit_price)?;
    }

    Ok(())
}

/// The computed money fields of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Validates the cart and discount, then computes totals.
    ///
    /// ## Example
    /// ```rust
    /// use vorca_core::cart::SaleTotals;
    /// use vorca_core::{CartLine, Money, TaxRate};
    ///
    /// let lines = vec![CartLine {
    ///     product_id: "p".to_string(),
    ///     quantity: 1,
    ///     unit_price: Money::from_minor(10_000),
    /// }];
    /// let totals = SaleTotals::compute(&lines, Money::from_minor(20_000), TaxRate::default()).unwrap();
    /// assert_eq!(totals.total.minor(), -8_900);
    /// ```
    pub fn compute(
        lines: &[CartLine],
        discount: Money,
        rate: TaxRate,
    ) -> ValidationResult<SaleTotals> {
        validate_cart(lines)?;
        validate_discount(discount)?;

        let mut subtotal = Money::zero();
        for line in lines {
            let line_total = line_subtotal(line)?;
            subtotal = subtotal.checked_add(line_total).ok_or_else(|| {
                ValidationError::Overflow {
                    field: "subtotal".to_string(),
                }
            })?;
        }

        let tax = subtotal.calculate_tax(rate);
        let total = subtotal
            .checked_add(tax)
            .map(|gross| gross - discount)
            .ok_or_else(|| ValidationError::Overflow {
                field: "total".to_string(),
            })?;

        Ok(SaleTotals {
            subtotal,
            tax,
            discount,
            total,
        })
    }
}

/// unit_price × quantity for one line, overflow-checked.
pub fn line_subtotal(line: &CartLine) -> ValidationResult<Money> {
    line.unit_price
        .checked_mul_quantity(line.quantity)
        .ok_or_else(|| ValidationError::Overflow {
            field: "lineSubtotal".to_string(),
        })
}

/// Parses a payment method name, case-insensitively.
pub fn parse_payment_method(value: &str) -> ValidationResult<PaymentMethod> {
    value.parse()
}
