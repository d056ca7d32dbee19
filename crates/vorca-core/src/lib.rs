//! # vorca-core: Pure Business Logic for Vorca POS
//!
//! Everything the engine decides without touching storage: money and tax,
//! cart totals, invoice numbering, role checks, input validation and the
//! transfer state machine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vorca POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/api (HTTP/JSON, axum)                     │   │
//! │  │     bearer token ──► Principal ──► engine call ──► status       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  vorca-db (engine + store)                      │   │
//! │  │     inventory ● sales ● transfers ● catalog ● analytics         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vorca-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ invoice │ │transfer │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐                          │   │
//! │  │   │  role   │ │validat. │ │  error  │                          │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘                          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Location, Product, Inventory, Sale, Transfer)
//! - [`money`] - Integer money and basis-point tax
//! - [`cart`] - Cart validation and totals
//! - [`invoice`] - Invoice number format and collision bump
//! - [`role`] - Principals and role gates
//! - [`transfer`] - Transfer lifecycle transitions
//! - [`validation`] - Field-level input checks
//! - [`error`] - Domain error types and the public error taxonomy
//!
//! ## Example Usage
//!
//! ```rust
//! use vorca_core::cart::SaleTotals;
//! use vorca_core::{CartLine, Money, TaxRate};
//!
//! let lines = vec![CartLine {
//!     product_id: "americano".to_string(),
//!     quantity: 2,
//!     unit_price: Money::from_minor(28_000),
//! }];
//!
//! let totals = SaleTotals::compute(&lines, Money::zero(), TaxRate::default()).unwrap();
//! assert_eq!(totals.subtotal.minor(), 56_000);
//! assert_eq!(totals.tax.minor(), 6_160);
//! assert_eq!(totals.total.minor(), 62_160);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod invoice;
pub mod money;
pub mod role;
pub mod transfer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use role::{Principal, Role};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// Catches fat-finger entries (1000 instead of 10) at the register.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest magnitude of a single manual stock adjustment.
pub const MAX_ADJUSTMENT_QUANTITY: i64 = 1_000_000_000;

/// Largest magnitude an inventory row may hold.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000_000_000;

/// Flat tax rate applied at checkout: 11%.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1100;

/// Threshold given to inventory rows created without an explicit one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Invoice suffixes are six digits.
pub const INVOICE_SUFFIX_MODULUS: u32 = 1_000_000;
