//! # Product Repository
//!
//! Catalog operations the engine depends on.
//!
//! ## Product Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create ──► products row + inventory row (qty 0) at owning location    │
//! │                (one transaction)                                        │
//! │                                                                         │
//! │  update ──► name/price/... change; sale lines keep their snapshots     │
//! │                                                                         │
//! │  delete ──► only while nothing references it:                          │
//! │               no sale lines, no transfer lines, no adjustments         │
//! │             otherwise Conflict                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::engine::EngineConfig;
use crate::error::{DbError, DbResult};
use crate::repository::{commit, new_id, now};
use vorca_core::validation::{validate_cost, validate_id, validate_name, validate_price, validate_sku};
use vorca_core::{NewProduct, Principal, Product, ProductPatch};

const SELECT_PRODUCT: &str = r#"
    SELECT id, sku, name, description, barcode, price, cost, location_id, created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    engine: Arc<EngineConfig>,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool, engine: Arc<EngineConfig>) -> Self {
        ProductRepository { pool, engine }
    }

    /// Creates a product and its inventory row at the owning location.
    ///
    /// ## Errors
    /// - `Forbidden` for cashiers
    /// - `ValidationError` for bad sku/name/price/cost
    /// - `NotFound` if the location does not exist
    /// - `Conflict` for a duplicate SKU
    pub async fn create(&self, principal: &Principal, input: &NewProduct) -> DbResult<Product> {
        principal.require_manager("create product")?;
        validate_sku(&input.sku)?;
        validate_name("name", &input.name)?;
        validate_price("price", input.price)?;
        if let Some(cost) = input.cost {
            validate_cost(cost)?;
        }
        validate_id("locationId", &input.location_id)?;

        let at = now();
        let product = Product {
            id: new_id(),
            sku: input.sku.trim().to_string(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            barcode: input.barcode.clone(),
            price: input.price,
            cost: input.cost,
            location_id: input.location_id.clone(),
            created_at: at,
            updated_at: at,
        };

        debug!(sku = %product.sku, "Creating product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description, barcode, price, cost, location_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.barcode)
        .bind(product.price)
        .bind(product.cost)
        .bind(&product.location_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("sku", &product.sku),
            DbError::ForeignKeyViolation { .. } => {
                DbError::not_found("Location", &product.location_id)
            }
            other => other,
        })?;

        sqlx::query(
            r#"
            INSERT INTO inventory (
                id, product_id, location_id, quantity, low_stock_threshold, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5)
            "#,
        )
        .bind(new_id())
        .bind(&product.id)
        .bind(&product.location_id)
        .bind(self.engine.default_low_stock_threshold)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        commit(tx).await?;

        info!(id = %product.id, sku = %product.sku, actor = %principal.id, "Product created");
        Ok(product)
    }

    /// Applies a partial update.
    ///
    /// Historical sale lines are untouched: they carry their own snapshots.
    pub async fn update(
        &self,
        principal: &Principal,
        id: &str,
        patch: &ProductPatch,
    ) -> DbResult<Product> {
        principal.require_manager("update product")?;

        let mut product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if let Some(sku) = &patch.sku {
            validate_sku(sku)?;
            product.sku = sku.trim().to_string();
        }
        if let Some(name) = &patch.name {
            validate_name("name", name)?;
            product.name = name.trim().to_string();
        }
        if let Some(price) = patch.price {
            validate_price("price", price)?;
            product.price = price;
        }
        if let Some(cost) = patch.cost {
            validate_cost(cost)?;
            product.cost = Some(cost);
        }
        if patch.description.is_some() {
            product.description = patch.description.clone();
        }
        if patch.barcode.is_some() {
            product.barcode = patch.barcode.clone();
        }
        product.updated_at = now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?1, name = ?2, description = ?3, barcode = ?4,
                price = ?5, cost = ?6, updated_at = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.barcode)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("sku", &product.sku),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %product.id, actor = %principal.id, "Product updated");
        Ok(product)
    }

    /// Deletes a product nothing refers to yet.
    ///
    /// Empty inventory rows (never adjusted) go with it; anything with
    /// history makes the delete a `Conflict`.
    pub async fn delete(&self, principal: &Principal, id: &str) -> DbResult<()> {
        principal.require_manager("delete product")?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM inventory
            WHERE product_id = ?1
              AND NOT EXISTS (
                  SELECT 1 FROM inventory_adjustments a WHERE a.inventory_id = inventory.id
              )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::Conflict(format!(
                    "Product {} is referenced by sales, transfers or inventory history",
                    id
                )),
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        commit(tx).await?;

        info!(id, actor = %principal.id, "Product deleted");
        Ok(())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{} WHERE id = ?1", SELECT_PRODUCT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products, optionally only those owned by one location, by SKU.
    pub async fn list(&self, location_id: Option<&str>) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "{} WHERE (?1 IS NULL OR location_id = ?1) ORDER BY sku",
            SELECT_PRODUCT
        ))
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
