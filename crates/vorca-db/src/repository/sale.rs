//! # Sale Processor
//!
//! Checkout as one atomic unit, plus sale lookups.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          checkout()                                     │
//! │                                                                         │
//! │  0. validate cart + discount, compute totals     (vorca-core, no I/O)  │
//! │                                                                         │
//! │  BEGIN ─────────────────────────────────────────────────────────────   │
//! │  1. INSERT sales (INV-yyyyMMdd-NNNNNN)                                 │
//! │       UNIQUE clash → bump suffix, try again (same transaction)         │
//! │       unknown location → NotFound                                      │
//! │  2. for each line, in cart order:                                      │
//! │       product lookup (snapshot sku + name)  unknown → NotFound         │
//! │       INSERT sale_items                                                │
//! │       apply_delta(−qty, SALE, reference = sale id)                     │
//! │  COMMIT ────────────────────────────────────────────────────────────   │
//! │                                                                         │
//! │  Any failure drops the transaction: no sale, no items, no stock move.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::engine::EngineConfig;
use crate::error::{DbError, DbResult};
use crate::repository::inventory::{apply_delta, Delta};
use crate::repository::{commit, new_id, now};
use crate::retry::with_retry;
use vorca_core::cart::{line_subtotal, SaleTotals};
use vorca_core::invoice::{format_invoice_number, initial_suffix, next_suffix};
use vorca_core::validation::validate_id;
use vorca_core::{
    AdjustmentReason, CheckoutRequest, Principal, Sale, SaleDetail, SaleItem, SaleStatus,
};

const SALE_COLUMNS: &str = "id, invoice_number, location_id, actor_id, subtotal, tax, discount, \
     total, payment_method, status, created_at";

const ITEM_COLUMNS: &str = "id, sale_id, line_no, product_id, sku_snapshot, name_snapshot, \
     quantity, unit_price, line_subtotal";

/// Snapshot of the product fields a sale line freezes.
#[derive(Debug, sqlx::FromRow)]
struct ProductSnapshot {
    sku: String,
    name: String,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    engine: Arc<EngineConfig>,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, engine: Arc<EngineConfig>) -> Self {
        SaleRepository { pool, engine }
    }

    /// Processes a checkout. Any authenticated role may sell.
    ///
    /// ## Errors
    /// - `ValidationError` for an empty or oversized cart, bad quantities,
    ///   prices or discount, or (strict policy) insufficient stock
    /// - `NotFound` for an unknown location or product
    /// - `Conflict` if no free invoice number or contention retries run out
    /// - `TransactionError` if the commit fails
    pub async fn checkout(
        &self,
        principal: &Principal,
        request: &CheckoutRequest,
    ) -> DbResult<SaleDetail> {
        validate_id("locationId", &request.location_id)?;
        let totals = SaleTotals::compute(&request.items, request.discount, self.engine.tax_rate)?;

        debug!(
            location_id = %request.location_id,
            lines = request.items.len(),
            total = %totals.total,
            "Processing checkout"
        );

        let totals = &totals;
        let detail = with_retry(&self.engine.retry, "checkout", move || async move {
            let mut tx = self.pool.begin().await?;
            let detail = self
                .checkout_in(&mut tx, principal, request, totals, now())
                .await?;
            commit(tx).await?;
            Ok(detail)
        })
        .await?;

        info!(
            sale_id = %detail.sale.id,
            invoice = %detail.sale.invoice_number,
            location_id = %detail.sale.location_id,
            total = %detail.sale.total,
            actor = %principal.id,
            "Sale completed"
        );
        Ok(detail)
    }

    /// The transactional body of a checkout, stamped at `at`.
    async fn checkout_in(
        &self,
        conn: &mut SqliteConnection,
        principal: &Principal,
        request: &CheckoutRequest,
        totals: &SaleTotals,
        at: DateTime<Utc>,
    ) -> DbResult<SaleDetail> {
        let sale = self
            .insert_header(conn, principal, request, totals, at)
            .await?;

        let mut items = Vec::with_capacity(request.items.len());
        for (index, line) in request.items.iter().enumerate() {
            let snapshot = sqlx::query_as::<_, ProductSnapshot>(
                "SELECT sku, name FROM products WHERE id = ?1",
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;

            let item = sqlx::query_as::<_, SaleItem>(&format!(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, line_no, product_id, sku_snapshot, name_snapshot,
                    quantity, unit_price, line_subtotal
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                RETURNING {}
                "#,
                ITEM_COLUMNS
            ))
            .bind(new_id())
            .bind(&sale.id)
            .bind(index as i64 + 1)
            .bind(&line.product_id)
            .bind(&snapshot.sku)
            .bind(&snapshot.name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line_subtotal(line)?)
            .fetch_one(&mut *conn)
            .await?;

            apply_delta(
                conn,
                &Delta {
                    product_id: &line.product_id,
                    location_id: &request.location_id,
                    quantity: -line.quantity,
                    reason: AdjustmentReason::Sale,
                    notes: Some(&sale.invoice_number),
                    actor_id: &principal.id,
                    reference_id: Some(&sale.id),
                },
                &self.engine,
            )
            .await?;

            items.push(item);
        }

        Ok(SaleDetail { sale, items })
    }

    /// Inserts the sale row, walking the invoice suffix forward on clashes.
    async fn insert_header(
        &self,
        conn: &mut SqliteConnection,
        principal: &Principal,
        request: &CheckoutRequest,
        totals: &SaleTotals,
        at: DateTime<Utc>,
    ) -> DbResult<Sale> {
        let mut suffix = initial_suffix(at);
        let attempts = self.engine.invoice_attempts.max(1);

        let mut sale = Sale {
            id: new_id(),
            invoice_number: String::new(),
            location_id: request.location_id.clone(),
            actor_id: principal.id.clone(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.total,
            payment_method: request.payment_method,
            status: SaleStatus::Completed,
            created_at: at,
        };

        for attempt in 1..=attempts {
            sale.invoice_number = format_invoice_number(at, suffix);

            let inserted = sqlx::query(
                r#"
                INSERT INTO sales (
                    id, invoice_number, location_id, actor_id,
                    subtotal, tax, discount, total,
                    payment_method, status, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(&sale.id)
            .bind(&sale.invoice_number)
            .bind(&sale.location_id)
            .bind(&sale.actor_id)
            .bind(sale.subtotal)
            .bind(sale.tax)
            .bind(sale.discount)
            .bind(sale.total)
            .bind(sale.payment_method)
            .bind(sale.status)
            .bind(sale.created_at)
            .execute(&mut *conn)
            .await;

            match inserted.map_err(DbError::from) {
                Ok(_) => return Ok(sale),
                Err(e) if e.is_unique_violation() => {
                    warn!(
                        invoice = %sale.invoice_number,
                        attempt,
                        "Invoice number taken, bumping suffix"
                    );
                    suffix = next_suffix(suffix);
                }
                Err(DbError::ForeignKeyViolation { .. }) => {
                    return Err(DbError::not_found("Location", &request.location_id));
                }
                Err(e) => return Err(e),
            }
        }

        Err(DbError::Conflict(format!(
            "No free invoice number after {} attempts",
            attempts
        )))
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleDetail>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE id = ?1",
            SALE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match sale {
            Some(sale) => {
                let items = self.items(&sale.id).await?;
                Ok(Some(SaleDetail { sale, items }))
            }
            None => Ok(None),
        }
    }

    /// Lists sales newest first, optionally for one location.
    pub async fn list(&self, location_id: Option<&str>) -> DbResult<Vec<SaleDetail>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE (?1 IS NULL OR location_id = ?1) \
             ORDER BY created_at DESC, rowid DESC",
            SALE_COLUMNS
        ))
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        let mut details = Vec::with_capacity(sales.len());
        for sale in sales {
            let items = self.items(&sale.id).await?;
            details.push(SaleDetail { sale, items });
        }

        Ok(details)
    }

    async fn items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {} FROM sale_items WHERE sale_id = ?1 ORDER BY line_no",
            ITEM_COLUMNS
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{cashier, db, db_with, location, manager, product};
    use vorca_core::{
        AdjustmentRequest, CartLine, ErrorKind, Money, PaymentMethod, StockPolicy,
    };

    fn cart(product_id: &str, quantity: i64, price: i64) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            quantity,
            unit_price: Money::from_minor(price),
        }
    }

    fn checkout(location_id: &str, items: Vec<CartLine>) -> CheckoutRequest {
        CheckoutRequest {
            location_id: location_id.to_string(),
            items,
            discount: Money::zero(),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn test_checkout_two_americanos() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;
        let americano = product(&db, &kmg.id, "BN-AM-001", 28_000).await;

        let detail = db
            .sales()
            .checkout(&cashier(), &checkout(&kmg.id, vec![cart(&americano.id, 2, 28_000)]))
            .await
            .unwrap();

        assert_eq!(detail.sale.subtotal.minor(), 56_000);
        assert_eq!(detail.sale.tax.minor(), 6_160);
        assert_eq!(detail.sale.total.minor(), 62_160);
        assert_eq!(detail.sale.status, SaleStatus::Completed);
        assert!(detail.sale.invoice_number.starts_with("INV-"));
        assert_eq!(detail.sale.invoice_number.len(), "INV-20261018-000000".len());

        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].line_no, 1);
        assert_eq!(detail.items[0].sku_snapshot, "BN-AM-001");
        assert_eq!(detail.items[0].line_subtotal.minor(), 56_000);

        let row = db.inventory().get(&americano.id, &kmg.id).await.unwrap().unwrap();
        assert_eq!(row.quantity, -2);

        let history = db.inventory().adjustments(&row.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, AdjustmentReason::Sale);
        assert_eq!(history[0].reference_id.as_deref(), Some(detail.sale.id.as_str()));
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;

        let err = db
            .sales()
            .checkout(&cashier(), &checkout(&kmg.id, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(db.sales().list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back_everything() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;
        let latte = product(&db, &kmg.id, "BN-LT-001", 32_000).await;

        let err = db
            .sales()
            .checkout(
                &cashier(),
                &checkout(
                    &kmg.id,
                    vec![cart(&latte.id, 1, 32_000), cart("ghost", 1, 10_000)],
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(db.sales().list(None).await.unwrap().is_empty());
        let rec = db.inventory().reconcile(&latte.id, &kmg.id).await.unwrap();
        assert_eq!(rec.quantity, 0);
        assert_eq!(rec.adjustment_count, 0);
    }

    #[tokio::test]
    async fn test_unknown_location_is_not_found() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;
        let latte = product(&db, &kmg.id, "BN-LT-001", 32_000).await;

        let err = db
            .sales()
            .checkout(&cashier(), &checkout("nowhere", vec![cart(&latte.id, 1, 32_000)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Location"));
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_oversell_atomically() {
        let db = db_with(EngineConfig::default().stock_policy(StockPolicy::Strict)).await;
        let kmg = location(&db, "Kemang", "KMG").await;
        let latte = product(&db, &kmg.id, "BN-LT-001", 32_000).await;
        let muffin = product(&db, &kmg.id, "BK-MF-001", 18_000).await;

        for (id, qty) in [(&latte.id, 5), (&muffin.id, 1)] {
            db.inventory()
                .adjust(
                    &manager(),
                    &AdjustmentRequest {
                        product_id: id.clone(),
                        location_id: kmg.id.clone(),
                        quantity: qty,
                        reason: AdjustmentReason::StockTake,
                        notes: None,
                    },
                )
                .await
                .unwrap();
        }

        // Latte line succeeds, muffin line oversells: nothing may stick
        let err = db
            .sales()
            .checkout(
                &cashier(),
                &checkout(
                    &kmg.id,
                    vec![cart(&latte.id, 2, 32_000), cart(&muffin.id, 3, 18_000)],
                ),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        assert!(db.sales().list(None).await.unwrap().is_empty());
        let latte_row = db.inventory().get(&latte.id, &kmg.id).await.unwrap().unwrap();
        assert_eq!(latte_row.quantity, 5);
    }

    #[tokio::test]
    async fn test_invoice_collision_bumps_suffix() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;
        let latte = product(&db, &kmg.id, "BN-LT-001", 32_000).await;

        // Occupy every suffix this checkout could start from within the next
        // few milliseconds by reserving a block ahead of the clock.
        let at = now();
        let start = initial_suffix(at);
        for offset in 0..50u32 {
            sqlx::query(
                "INSERT INTO sales (id, invoice_number, location_id, actor_id, subtotal, tax, \
                 discount, total, payment_method, status, created_at) \
                 VALUES (?1, ?2, ?3, 'seed', 1, 0, 0, 1, 'CASH', 'COMPLETED', ?4)",
            )
            .bind(new_id())
            .bind(format_invoice_number(at, next_suffix_n(start, offset)))
            .bind(&kmg.id)
            .bind(at)
            .execute(db.pool())
            .await
            .unwrap();
        }

        let detail = db
            .sales()
            .checkout(&cashier(), &checkout(&kmg.id, vec![cart(&latte.id, 1, 32_000)]))
            .await
            .unwrap();

        let all = db.sales().list(None).await.unwrap();
        assert_eq!(all.len(), 51);
        let numbers: std::collections::HashSet<_> =
            all.iter().map(|d| d.sale.invoice_number.clone()).collect();
        assert_eq!(numbers.len(), 51);
        assert!(numbers.contains(&detail.sale.invoice_number));
    }

    fn next_suffix_n(mut suffix: u32, n: u32) -> u32 {
        for _ in 0..n {
            suffix = next_suffix(suffix);
        }
        suffix
    }

    #[tokio::test]
    async fn test_invoice_attempts_exhausted_is_conflict() {
        let db = db_with(EngineConfig::default().invoice_attempts(3)).await;
        let kmg = location(&db, "Kemang", "KMG").await;
        let latte = product(&db, &kmg.id, "BN-LT-001", 32_000).await;

        // Every suffix the checkout may try at this instant is taken
        let at = now();
        let mut suffix = initial_suffix(at);
        let mut tx = db.pool().begin().await.unwrap();
        for _ in 0..3 {
            sqlx::query(
                "INSERT INTO sales (id, invoice_number, location_id, actor_id, subtotal, tax, \
                 discount, total, payment_method, status, created_at) \
                 VALUES (?1, ?2, ?3, 'seed', 1, 0, 0, 1, 'CASH', 'COMPLETED', ?4)",
            )
            .bind(new_id())
            .bind(format_invoice_number(at, suffix))
            .bind(&kmg.id)
            .bind(at)
            .execute(&mut *tx)
            .await
            .unwrap();
            suffix = next_suffix(suffix);
        }
        tx.commit().await.unwrap();

        let request = checkout(&kmg.id, vec![cart(&latte.id, 1, 32_000)]);
        let totals =
            SaleTotals::compute(&request.items, request.discount, db.engine().tax_rate).unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let err = db
            .sales()
            .checkout_in(&mut tx, &cashier(), &request, &totals, at)
            .await
            .unwrap_err();
        tx.rollback().await.unwrap();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(db.sales().list(None).await.unwrap().len(), 3);
        let rec = db.inventory().reconcile(&latte.id, &kmg.id).await.unwrap();
        assert_eq!(rec.adjustment_count, 0);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_location_filter() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;
        let stb = location(&db, "Setiabudi", "STB").await;
        let latte = product(&db, &kmg.id, "BN-LT-001", 32_000).await;

        let first = db
            .sales()
            .checkout(&cashier(), &checkout(&kmg.id, vec![cart(&latte.id, 1, 32_000)]))
            .await
            .unwrap();
        let second = db
            .sales()
            .checkout(&cashier(), &checkout(&kmg.id, vec![cart(&latte.id, 2, 32_000)]))
            .await
            .unwrap();
        db.sales()
            .checkout(&cashier(), &checkout(&stb.id, vec![cart(&latte.id, 1, 32_000)]))
            .await
            .unwrap();

        let at_kmg = db.sales().list(Some(&kmg.id)).await.unwrap();
        assert_eq!(at_kmg.len(), 2);
        assert_eq!(at_kmg[0].sale.id, second.sale.id);
        assert_eq!(at_kmg[1].sale.id, first.sale.id);

        let fetched = db.sales().get_by_id(&first.sale.id).await.unwrap().unwrap();
        assert_eq!(fetched, first);
        assert!(db.sales().get_by_id("missing").await.unwrap().is_none());
    }
}
