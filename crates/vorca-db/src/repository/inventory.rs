//! # Inventory Engine
//!
//! Per-location stock and its adjustment ledger.
//!
//! ## Apply-Delta Primitive
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_delta(product, location, Δ, reason, actor, reference)           │
//! │                                                                         │
//! │  inside the caller's transaction:                                      │
//! │                                                                         │
//! │  1. INSERT INTO inventory (…, quantity = Δ)                            │
//! │       ON CONFLICT (product_id, location_id)                            │
//! │       DO UPDATE SET quantity = inventory.quantity + excluded.quantity  │
//! │       WHERE |new quantity| ≤ MAX_STOCK_QUANTITY   (else Overflow)      │
//! │       RETURNING …                  ← one statement, no read-then-write │
//! │                                                                         │
//! │  2. Strict policy and Δ < 0 and new quantity < 0?                      │
//! │       → InsufficientStock (caller's transaction rolls back)            │
//! │                                                                         │
//! │  3. INSERT INTO inventory_adjustments (Δ, reason, actor, reference)    │
//! │                                                                         │
//! │  Because the first statement is a write, the transaction takes the     │
//! │  write lock before reading anything, so WAL snapshots never go stale   │
//! │  underneath it.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales and transfers call [`apply_delta`] with reasons SALE and TRANSFER;
//! callers reach it through [`InventoryRepository::adjust`], which adds the
//! role gate and rejects SALE.

use std::sync::Arc;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::engine::EngineConfig;
use crate::error::{DbError, DbResult};
use crate::repository::{commit, ensure_exists, new_id, now};
use crate::retry::with_retry;
use vorca_core::validation::{validate_caller_reason, validate_delta, validate_id, validate_threshold};
use vorca_core::{
    AdjustmentReason, AdjustmentRequest, AppliedDelta, CoreError, Inventory, InventoryAdjustment,
    InventoryLevel, Principal, Reconciliation, StockPolicy, ThresholdRequest, ValidationError,
    MAX_STOCK_QUANTITY,
};

const INVENTORY_COLUMNS: &str =
    "id, product_id, location_id, quantity, low_stock_threshold, created_at, updated_at";

const SELECT_LEVEL: &str = r#"
    SELECT
        i.id, i.product_id, i.location_id, i.quantity, i.low_stock_threshold,
        i.created_at, i.updated_at,
        p.sku, p.name AS product_name
    FROM inventory i
    INNER JOIN products p ON p.id = i.product_id
"#;

// =============================================================================
// Apply-Delta Primitive
// =============================================================================

/// One quantity change to apply.
#[derive(Debug, Clone)]
pub(crate) struct Delta<'a> {
    pub product_id: &'a str,
    pub location_id: &'a str,
    pub quantity: i64,
    pub reason: AdjustmentReason,
    pub notes: Option<&'a str>,
    pub actor_id: &'a str,
    pub reference_id: Option<&'a str>,
}

/// Applies one delta and records its adjustment, inside the caller's
/// transaction. Creates the inventory row if it does not exist.
///
/// ## Errors
/// - `NotFound` if the product or location does not exist
/// - `InsufficientStock` under [`StockPolicy::Strict`]
/// - `Overflow` if the delta or the resulting quantity leaves
///   ±[`MAX_STOCK_QUANTITY`]
pub(crate) async fn apply_delta(
    conn: &mut SqliteConnection,
    delta: &Delta<'_>,
    engine: &EngineConfig,
) -> DbResult<AppliedDelta> {
    let requested = delta
        .quantity
        .checked_neg()
        .filter(|_| delta.quantity.unsigned_abs() <= MAX_STOCK_QUANTITY.unsigned_abs())
        .ok_or_else(quantity_overflow)?;
    let at = now();

    let upsert = format!(
        r#"
        INSERT INTO inventory (
            id, product_id, location_id, quantity, low_stock_threshold, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        ON CONFLICT (product_id, location_id) DO UPDATE SET
            quantity = inventory.quantity + excluded.quantity,
            updated_at = excluded.updated_at
        WHERE abs(inventory.quantity + excluded.quantity) <= ?7
        RETURNING {}
        "#,
        INVENTORY_COLUMNS
    );

    let row = sqlx::query_as::<_, Inventory>(&upsert)
        .bind(new_id())
        .bind(delta.product_id)
        .bind(delta.location_id)
        .bind(delta.quantity)
        .bind(engine.default_low_stock_threshold)
        .bind(at)
        .bind(MAX_STOCK_QUANTITY)
        .fetch_optional(&mut *conn)
        .await;

    let inventory = match row {
        Ok(Some(inventory)) => inventory,
        // The conflict branch declined the update: the sum left the range.
        Ok(None) => {
            warn!(
                product_id = %delta.product_id,
                location_id = %delta.location_id,
                delta = delta.quantity,
                "Rejected delta overflowing the stock range"
            );
            return Err(quantity_overflow().into());
        }
        Err(e) => {
            return Err(match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    missing_reference(conn, delta.product_id, delta.location_id).await
                }
                other => other,
            })
        }
    };

    if delta.quantity < 0 {
        let before = inventory
            .quantity
            .checked_sub(delta.quantity)
            .ok_or_else(quantity_overflow)?;
        if !engine.stock_policy.permits(before, delta.quantity) {
            warn!(
                product_id = %delta.product_id,
                location_id = %delta.location_id,
                available = before,
                requested,
                "Rejected decrement under strict stock policy"
            );
            return Err(CoreError::InsufficientStock {
                product_id: delta.product_id.to_string(),
                location_id: delta.location_id.to_string(),
                available: before,
                requested,
            }
            .into());
        }
    }

    let adjustment = sqlx::query_as::<_, InventoryAdjustment>(
        r#"
        INSERT INTO inventory_adjustments (
            id, inventory_id, quantity, reason, notes, actor_id, reference_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING id, inventory_id, quantity, reason, notes, actor_id, reference_id, created_at
        "#,
    )
    .bind(new_id())
    .bind(&inventory.id)
    .bind(delta.quantity)
    .bind(delta.reason)
    .bind(delta.notes)
    .bind(delta.actor_id)
    .bind(delta.reference_id)
    .bind(at)
    .fetch_one(&mut *conn)
    .await?;

    debug!(
        inventory_id = %inventory.id,
        delta = delta.quantity,
        quantity = inventory.quantity,
        reason = %delta.reason,
        "Applied inventory delta"
    );

    Ok(AppliedDelta {
        inventory,
        adjustment,
    })
}

fn quantity_overflow() -> ValidationError {
    ValidationError::Overflow {
        field: "quantity".to_string(),
    }
}

/// Resolves a foreign-key failure on `inventory` to the entity that is missing.
async fn missing_reference(
    conn: &mut SqliteConnection,
    product_id: &str,
    location_id: &str,
) -> DbError {
    if let Err(e) = ensure_exists(conn, "products", "Product", product_id).await {
        return e;
    }
    match ensure_exists(conn, "locations", "Location", location_id).await {
        Err(e) => e,
        Ok(()) => DbError::ForeignKeyViolation {
            message: format!("inventory ({}, {})", product_id, location_id),
        },
    }
}

// =============================================================================
// Repository
// =============================================================================

/// The inventory engine.
///
/// ## Usage
/// ```rust,ignore
/// let applied = db.inventory().adjust(&manager, &AdjustmentRequest {
///     product_id, location_id,
///     quantity: -2,
///     reason: AdjustmentReason::Damage,
///     notes: Some("dropped tray".into()),
/// }).await?;
/// assert_eq!(applied.adjustment.quantity, -2);
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
    engine: Arc<EngineConfig>,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool, engine: Arc<EngineConfig>) -> Self {
        InventoryRepository { pool, engine }
    }

    /// Applies a caller-submitted adjustment.
    ///
    /// ## Errors
    /// - `Forbidden` for cashiers
    /// - `ValidationError` for a zero delta or the internal SALE reason
    /// - `NotFound` for an unknown product or location
    /// - `Conflict` if contention retries run out
    pub async fn adjust(
        &self,
        principal: &Principal,
        request: &AdjustmentRequest,
    ) -> DbResult<AppliedDelta> {
        principal.require_manager("adjust inventory")?;
        validate_id("productId", &request.product_id)?;
        validate_id("locationId", &request.location_id)?;
        validate_delta(request.quantity)?;
        validate_caller_reason(request.reason)?;

        debug!(
            product_id = %request.product_id,
            location_id = %request.location_id,
            delta = request.quantity,
            reason = %request.reason,
            "Adjusting inventory"
        );

        let delta = Delta {
            product_id: &request.product_id,
            location_id: &request.location_id,
            quantity: request.quantity,
            reason: request.reason,
            notes: request.notes.as_deref(),
            actor_id: &principal.id,
            reference_id: None,
        };
        let delta = &delta;

        let applied = with_retry(&self.engine.retry, "inventory adjustment", move || async move {
            let mut tx = self.pool.begin().await?;
            let applied = apply_delta(&mut tx, delta, &self.engine).await?;
            commit(tx).await?;
            Ok(applied)
        })
        .await?;

        info!(
            inventory_id = %applied.inventory.id,
            delta = request.quantity,
            quantity = applied.inventory.quantity,
            actor = %principal.id,
            "Inventory adjusted"
        );
        Ok(applied)
    }

    /// Sets the low-stock threshold of a row, creating it at quantity 0 if
    /// needed. Quantity is never touched.
    pub async fn set_low_stock_threshold(
        &self,
        principal: &Principal,
        request: &ThresholdRequest,
    ) -> DbResult<Inventory> {
        principal.require_manager("set low-stock threshold")?;
        validate_id("productId", &request.product_id)?;
        validate_id("locationId", &request.location_id)?;
        validate_threshold(request.low_stock_threshold)?;

        let upsert = format!(
            r#"
            INSERT INTO inventory (
                id, product_id, location_id, quantity, low_stock_threshold, created_at, updated_at
            ) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?5)
            ON CONFLICT (product_id, location_id) DO UPDATE SET
                low_stock_threshold = excluded.low_stock_threshold,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            INVENTORY_COLUMNS
        );
        let upsert = upsert.as_str();

        let inventory = with_retry(&self.engine.retry, "threshold update", move || async move {
            let mut tx = self.pool.begin().await?;
            let row = sqlx::query_as::<_, Inventory>(upsert)
                .bind(new_id())
                .bind(&request.product_id)
                .bind(&request.location_id)
                .bind(request.low_stock_threshold)
                .bind(now())
                .fetch_one(&mut *tx)
                .await;

            let inventory = match row {
                Ok(inventory) => inventory,
                Err(e) => {
                    return Err(match DbError::from(e) {
                        DbError::ForeignKeyViolation { .. } => {
                            missing_reference(&mut tx, &request.product_id, &request.location_id)
                                .await
                        }
                        other => other,
                    })
                }
            };

            commit(tx).await?;
            Ok(inventory)
        })
        .await?;

        info!(
            inventory_id = %inventory.id,
            threshold = inventory.low_stock_threshold,
            actor = %principal.id,
            "Low-stock threshold updated"
        );
        Ok(inventory)
    }

    /// Gets the row for one product at one location.
    pub async fn get(&self, product_id: &str, location_id: &str) -> DbResult<Option<Inventory>> {
        let inventory = sqlx::query_as::<_, Inventory>(&format!(
            "SELECT {} FROM inventory WHERE product_id = ?1 AND location_id = ?2",
            INVENTORY_COLUMNS
        ))
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inventory)
    }

    /// Lists stock levels, optionally for one location, by SKU.
    pub async fn list(&self, location_id: Option<&str>) -> DbResult<Vec<InventoryLevel>> {
        let levels = sqlx::query_as::<_, InventoryLevel>(&format!(
            "{} WHERE (?1 IS NULL OR i.location_id = ?1) ORDER BY p.sku, i.location_id",
            SELECT_LEVEL
        ))
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Rows at or below their threshold, negatives included, lowest first.
    pub async fn low_stock(&self, location_id: Option<&str>) -> DbResult<Vec<InventoryLevel>> {
        let levels = sqlx::query_as::<_, InventoryLevel>(&format!(
            r#"{}
            WHERE i.quantity <= i.low_stock_threshold
              AND (?1 IS NULL OR i.location_id = ?1)
            ORDER BY i.quantity, p.sku"#,
            SELECT_LEVEL
        ))
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = levels.len(), "Low-stock rows");
        Ok(levels)
    }

    /// The adjustment history of one row, oldest first.
    pub async fn adjustments(&self, inventory_id: &str) -> DbResult<Vec<InventoryAdjustment>> {
        let mut conn = self.pool.acquire().await?;
        ensure_exists(&mut conn, "inventory", "Inventory", inventory_id).await?;

        let adjustments = sqlx::query_as::<_, InventoryAdjustment>(
            r#"
            SELECT id, inventory_id, quantity, reason, notes, actor_id, reference_id, created_at
            FROM inventory_adjustments
            WHERE inventory_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(inventory_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(adjustments)
    }

    /// Checks that a row's quantity equals the sum of its adjustments.
    pub async fn reconcile(&self, product_id: &str, location_id: &str) -> DbResult<Reconciliation> {
        let row: Option<(i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                i.quantity,
                COALESCE(SUM(a.quantity), 0),
                COUNT(a.id)
            FROM inventory i
            LEFT JOIN inventory_adjustments a ON a.inventory_id = i.id
            WHERE i.product_id = ?1 AND i.location_id = ?2
            GROUP BY i.id
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await?;

        let (quantity, ledger_sum, adjustment_count) = row.ok_or_else(|| {
            DbError::not_found("Inventory", format!("{}@{}", product_id, location_id))
        })?;

        let reconciliation = Reconciliation {
            quantity,
            ledger_sum,
            adjustment_count,
        };

        if !reconciliation.is_consistent() {
            warn!(
                product_id,
                location_id, quantity, ledger_sum, "Inventory row disagrees with its ledger"
            );
        }
        Ok(reconciliation)
    }

    /// Returns the stock policy in force.
    pub fn stock_policy(&self) -> StockPolicy {
        self.engine.stock_policy
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
