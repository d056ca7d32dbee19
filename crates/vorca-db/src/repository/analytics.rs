//! # Sales Analytics
//!
//! Read-only rollups over the `sales` table.

use chrono::Duration;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::now;
use vorca_core::{Money, SalesSummary};

/// Window for the top-location lookup.
const TOP_LOCATION_WINDOW_DAYS: i64 = 30;

#[derive(Debug, sqlx::FromRow)]
struct Totals {
    transactions: i64,
    revenue: i64,
}

/// Aggregates sales figures.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    /// Creates a new AnalyticsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// Transaction count, revenue and average ticket, optionally for one
    /// location.
    ///
    /// `top_location` ignores the filter: it names the location of the single
    /// largest sale anywhere in the chain over the last 30 days.
    pub async fn summary(&self, location_id: Option<&str>) -> DbResult<SalesSummary> {
        debug!(location_id = ?location_id, "Computing sales summary");

        let totals = sqlx::query_as::<_, Totals>(
            r#"
            SELECT COUNT(*) AS transactions, COALESCE(SUM(total), 0) AS revenue
            FROM sales
            WHERE (?1 IS NULL OR location_id = ?1)
            "#,
        )
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;

        let since = now() - Duration::days(TOP_LOCATION_WINDOW_DAYS);
        let top_location: Option<String> = sqlx::query_scalar(
            r#"
            SELECT l.name
            FROM sales s
            JOIN locations l ON l.id = s.location_id
            WHERE s.created_at >= ?1
            ORDER BY s.total DESC, s.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        let average = if totals.transactions > 0 {
            totals.revenue / totals.transactions
        } else {
            0
        };

        Ok(SalesSummary {
            total_transactions: totals.transactions,
            total_revenue: Money::from_minor(totals.revenue),
            average_transaction: Money::from_minor(average),
            top_location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_id;
    use crate::repository::test_support::{cashier, db, location, product};
    use vorca_core::{CartLine, CheckoutRequest, PaymentMethod};

    async fn sell(db: &crate::Database, location_id: &str, product_id: &str, qty: i64, price: i64) {
        db.sales()
            .checkout(
                &cashier(),
                &CheckoutRequest {
                    location_id: location_id.to_string(),
                    items: vec![CartLine {
                        product_id: product_id.to_string(),
                        quantity: qty,
                        unit_price: Money::from_minor(price),
                    }],
                    discount: Money::zero(),
                    payment_method: PaymentMethod::Card,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let db = db().await;
        let summary = db.analytics().summary(None).await.unwrap();

        assert_eq!(summary.total_transactions, 0);
        assert!(summary.total_revenue.is_zero());
        assert!(summary.average_transaction.is_zero());
        assert!(summary.top_location.is_none());
    }

    #[tokio::test]
    async fn test_summary_totals_and_top_location() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;
        let stb = location(&db, "Setiabudi", "STB").await;
        let latte = product(&db, &kmg.id, "BN-LT-001", 32_000).await;

        // 32000 + 11% = 35520; 3 × 32000 = 96000 + 10560 = 106560
        sell(&db, &kmg.id, &latte.id, 1, 32_000).await;
        sell(&db, &stb.id, &latte.id, 3, 32_000).await;

        let all = db.analytics().summary(None).await.unwrap();
        assert_eq!(all.total_transactions, 2);
        assert_eq!(all.total_revenue.minor(), 142_080);
        assert_eq!(all.average_transaction.minor(), 71_040);
        assert_eq!(all.top_location.as_deref(), Some("Setiabudi"));

        let kemang = db.analytics().summary(Some(&kmg.id)).await.unwrap();
        assert_eq!(kemang.total_transactions, 1);
        assert_eq!(kemang.total_revenue.minor(), 35_520);
        assert_eq!(kemang.average_transaction.minor(), 35_520);
        // Chain-wide, not filtered
        assert_eq!(kemang.top_location.as_deref(), Some("Setiabudi"));
    }

    #[tokio::test]
    async fn test_average_truncates() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;

        for total in [10, 10, 11] {
            sqlx::query(
                "INSERT INTO sales (id, invoice_number, location_id, actor_id, subtotal, tax, \
                 discount, total, payment_method, status, created_at) \
                 VALUES (?1, ?2, ?3, 'seed', ?4, 0, 0, ?4, 'CASH', 'COMPLETED', ?5)",
            )
            .bind(new_id())
            .bind(new_id())
            .bind(&kmg.id)
            .bind(total)
            .bind(now())
            .execute(db.pool())
            .await
            .unwrap();
        }

        let summary = db.analytics().summary(None).await.unwrap();
        assert_eq!(summary.total_revenue.minor(), 31);
        assert_eq!(summary.average_transaction.minor(), 10);
    }

    #[tokio::test]
    async fn test_old_sales_do_not_pick_top_location() {
        let db = db().await;
        let kmg = location(&db, "Kemang", "KMG").await;

        sqlx::query(
            "INSERT INTO sales (id, invoice_number, location_id, actor_id, subtotal, tax, \
             discount, total, payment_method, status, created_at) \
             VALUES (?1, 'INV-OLD', ?2, 'seed', 500, 0, 0, 500, 'CASH', 'COMPLETED', ?3)",
        )
        .bind(new_id())
        .bind(&kmg.id)
        .bind(now() - Duration::days(45))
        .execute(db.pool())
        .await
        .unwrap();

        let summary = db.analytics().summary(None).await.unwrap();
        assert_eq!(summary.total_transactions, 1);
        assert!(summary.top_location.is_none());
    }
}
