//! # Error Types
//!
//! Domain-specific error types for vorca-core, and the public error taxonomy.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vorca-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures                         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - The six kinds every failure reports            │
//! │                                                                         │
//! │  vorca-db errors (separate crate)                                      │
//! │  └── DbError          - Store failures, embeds CoreError               │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - {code, message} + status                       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, statuses, quantities)
//! 3. Errors are enum variants, never String
//! 4. Every variant maps to exactly one [`ErrorKind`]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::role::Role;
use crate::types::TransferStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// The externally visible failure taxonomy.
///
/// ```text
/// ValidationError   bad input, nothing written
/// Forbidden         principal's role may not perform the operation
/// NotFound          referenced entity does not exist
/// InvalidState      transfer not in the status the transition needs
/// TransactionError  the store could not commit; nothing written
/// Conflict          uniqueness clash or contention retries exhausted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorKind {
    ValidationError,
    Forbidden,
    NotFound,
    InvalidState,
    TransactionError,
    Conflict,
}

impl ErrorKind {
    /// Wire code, e.g. `"INVALID_STATE"`.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::TransactionError => "TRANSACTION_ERROR",
            ErrorKind::Conflict => "CONFLICT",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations detected before or during an
/// engine operation. The database layer wraps them unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The principal's role does not allow the operation.
    ///
    /// ## When This Occurs
    /// - A cashier submits an inventory adjustment
    /// - A manager tries to create a location (owner only)
    #[error("Role {role} may not {action}")]
    Forbidden { action: String, role: Role },

    /// A transfer transition was attempted from the wrong status.
    ///
    /// ## Transfer Workflow
    /// ```text
    /// PENDING ──approve──► IN_TRANSIT ──complete──► COMPLETED
    ///    │                                              ▲
    ///    └──────────── complete ───── ✗ InvalidState ───┘
    /// ```
    #[error("Transfer {transfer_id} is {status}, cannot {action}")]
    InvalidTransferState {
        transfer_id: String,
        status: TransferStatus,
        action: String,
    },

    /// Decrement would take stock below zero under the strict stock policy.
    #[error(
        "Insufficient stock for product {product_id} at {location_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: String,
        location_id: String,
        available: i64,
        requested: i64,
    },
}

impl CoreError {
    /// Shorthand for a role failure.
    pub fn forbidden(action: impl Into<String>, role: Role) -> Self {
        CoreError::Forbidden {
            action: action.into(),
            role,
        }
    }

    /// Maps the error to the public taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::ValidationError,
            CoreError::Forbidden { .. } => ErrorKind::Forbidden,
            CoreError::InvalidTransferState { .. } => ErrorKind::InvalidState,
            // Oversell refusal is a rejected input, not a store failure
            CoreError::InsufficientStock { .. } => ErrorKind::ValidationError,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any store access so a rejected request writes nothing.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must be non-zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Invalid format (e.g., SKU characters, location code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Collection is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Two fields that must differ are equal.
    #[error("{field} must differ from {other}")]
    MustDiffer { field: String, other: String },

    /// An amount does not fit in the money range.
    #[error("{field} overflows the supported amount range")]
    Overflow { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            location_id: "loc-1".to_string(),
            available: 1,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product p-1 at loc-1: available 1, requested 3"
        );

        let err = CoreError::InvalidTransferState {
            transfer_id: "t-1".to_string(),
            status: TransferStatus::Pending,
            action: "complete".to_string(),
        };
        assert_eq!(err.to_string(), "Transfer t-1 is PENDING, cannot complete");
    }

    #[test]
    fn test_kind_mapping() {
        let err: CoreError = ValidationError::MustBeNonZero {
            field: "quantity".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(
            CoreError::forbidden("adjust inventory", Role::Cashier).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            CoreError::InsufficientStock {
                product_id: "p".to_string(),
                location_id: "l".to_string(),
                available: 0,
                requested: 1,
            }
            .kind(),
            ErrorKind::ValidationError
        );
    }

    #[test]
    fn test_forbidden_message_names_role() {
        let err = CoreError::forbidden("adjust inventory", Role::Cashier);
        assert_eq!(err.to_string(), "Role CASHIER may not adjust inventory");
    }

    #[test]
    fn test_error_kind_codes() {
        assert_eq!(ErrorKind::InvalidState.code(), "INVALID_STATE");
        assert_eq!(
            serde_json::to_string(&ErrorKind::TransactionError).unwrap(),
            "\"TRANSACTION_ERROR\""
        );
    }
}
