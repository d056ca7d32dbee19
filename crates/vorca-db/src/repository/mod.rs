//! # Repository Module
//!
//! Engine operations grouped by aggregate.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │  db.sales().checkout(&principal, &request)                     │
//! │       ▼                                                                 │
//! │  SaleRepository / TransferRepository / InventoryRepository             │
//! │  ├── role gate + validation (vorca-core)   no store access yet         │
//! │  ├── with_retry(...)                        busy/locked → re-run        │
//! │  │     └── one sqlx::Transaction per attempt                           │
//! │  │           ├── header rows                                           │
//! │  │           └── inventory::apply_delta(...) per line                  │
//! │  └── commit                                                            │
//! │                                                                         │
//! │  apply_delta is the ONLY code path that changes inventory.quantity,    │
//! │  and it always writes the matching adjustment row.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`LocationRepository`](location::LocationRepository) - Locations
//! - [`ProductRepository`](product::ProductRepository) - Product catalog
//! - [`InventoryRepository`](inventory::InventoryRepository) - Inventory engine
//! - [`SaleRepository`](sale::SaleRepository) - Sale processor
//! - [`TransferRepository`](transfer::TransferRepository) - Transfer workflow
//! - [`AnalyticsRepository`](analytics::AnalyticsRepository) - Sales rollups

pub mod analytics;
pub mod inventory;
pub mod location;
pub mod product;
pub mod sale;
pub mod transfer;

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// New UUID v4 primary key.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Timestamp for rows written now.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Commits, keeping busy/locked failures retryable.
pub(crate) async fn commit(tx: Transaction<'_, Sqlite>) -> DbResult<()> {
    tx.commit().await.map_err(|e| match DbError::from(e) {
        DbError::Busy(msg) => DbError::Busy(msg),
        other => DbError::TransactionFailed(other.to_string()),
    })
}

/// Returns NotFound unless a row with `id` exists in `table`.
///
/// `table` is always a literal from this crate.
pub(crate) async fn ensure_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    entity: &'static str,
    id: &str,
) -> DbResult<()> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table);
    let exists: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    if exists != 0 {
        Ok(())
    } else {
        Err(DbError::not_found(entity, id))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for repository unit tests.

    use vorca_core::{Location, Money, NewLocation, NewProduct, Principal, Product, Role};

    use crate::{Database, DbConfig, EngineConfig};

    pub fn owner() -> Principal {
        Principal::new("owner-1", Role::Owner)
    }

    pub fn manager() -> Principal {
        Principal::new("manager-1", Role::Manager)
    }

    pub fn cashier() -> Principal {
        Principal::new("cashier-1", Role::Cashier)
    }

    pub async fn db() -> Database {
        db_with(EngineConfig::default()).await
    }

    pub async fn db_with(engine: EngineConfig) -> Database {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .with_engine(engine)
    }

    pub async fn location(db: &Database, name: &str, code: &str) -> Location {
        db.locations()
            .create(
                &owner(),
                &NewLocation {
                    name: name.to_string(),
                    code: code.to_string(),
                },
            )
            .await
            .unwrap()
    }

    pub async fn product(db: &Database, location_id: &str, sku: &str, price: i64) -> Product {
        db.products()
            .create(
                &manager(),
                &NewProduct {
                    sku: sku.to_string(),
                    name: format!("Product {}", sku),
                    description: None,
                    barcode: None,
                    price: Money::from_minor(price),
                    cost: None,
                    location_id: location_id.to_string(),
                },
            )
            .await
            .unwrap()
    }
}
