//! # Roles and Principals
//!
//! The identity provider hands the engine an already-resolved principal:
//! an opaque id plus one of three roles. Role gates are preconditions that
//! run before any store access.
//!
//! ```text
//! Operation                         CASHIER   MANAGER   OWNER
//! ───────────────────────────────   ───────   ───────   ─────
//! checkout                             ✓         ✓        ✓
//! inventory adjustment / threshold     ✗         ✓        ✓
//! transfer request/approve/complete    ✗         ✓        ✓
//! product create/update/delete         ✗         ✓        ✓
//! location create                      ✗         ✗        ✓
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

/// A staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    Cashier,
    Manager,
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Cashier => "CASHIER",
            Role::Manager => "MANAGER",
            Role::Owner => "OWNER",
        }
    }

    /// Manager or owner.
    #[inline]
    pub fn is_manager_or_owner(&self) -> bool {
        matches!(self, Role::Manager | Role::Owner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASHIER" => Ok(Role::Cashier),
            "MANAGER" => Ok(Role::Manager),
            "OWNER" => Ok(Role::Owner),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec![
                    "CASHIER".to_string(),
                    "MANAGER".to_string(),
                    "OWNER".to_string(),
                ],
            }),
        }
    }
}

/// The caller of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Fails with `Forbidden` unless the principal is a manager or owner.
    pub fn require_manager(&self, action: &str) -> CoreResult<()> {
        if self.role.is_manager_or_owner() {
            Ok(())
        } else {
            Err(CoreError::forbidden(action, self.role))
        }
    }

    /// Fails with `Forbidden` unless the principal is an owner.
    pub fn require_owner(&self, action: &str) -> CoreResult<()> {
        if self.role == Role::Owner {
            Ok(())
        } else {
            Err(CoreError::forbidden(action, self.role))
        }
    }
}
