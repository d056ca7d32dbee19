//! # vorca-db: Ledger Store and Transactional Engine
//!
//! SQLite storage for Vorca POS and the operations that must be atomic:
//! inventory deltas, checkout and transfer transitions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vorca POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/v1/sales)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vorca-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ Inventory     │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ Sale          │    │ 001_init.sql │   │   │
//! │  │   │ EngineConfig  │    │ Transfer      │    │              │   │   │
//! │  │   │               │    │ Product/Loc.  │    │              │   │   │
//! │  │   └───────────────┘    │ Analytics     │    └──────────────┘   │   │
//! │  │                        └───────┬───────┘                       │   │
//! │  │                                │ with_retry (retry.rs)         │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`engine`] - Engine behaviour (tax, stock policy, retry)
//! - [`retry`] - Busy/locked retry with exponential backoff
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Engine operations grouped by aggregate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vorca_db::{Database, DbConfig, EngineConfig};
//!
//! let db = Database::new(DbConfig::new("./vorca.db"))
//!     .await?
//!     .with_engine(EngineConfig::default());
//!
//! let applied = db.inventory().adjust(&principal, &request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod retry;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::EngineConfig;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use retry::RetryPolicy;

// Repository re-exports for convenience
pub use repository::analytics::AnalyticsRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::location::LocationRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::transfer::TransferRepository;
