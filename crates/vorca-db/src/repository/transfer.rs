//! # Transfer Workflow
//!
//! Stock movement between two locations of the chain.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request   INSERT transfers (PENDING) + transfer_items                 │
//! │            no inventory effect                                          │
//! │                                                                         │
//! │  approve   UPDATE transfers SET status = 'IN_TRANSIT'                  │
//! │             WHERE id = ? AND status = 'PENDING'  RETURNING ...         │
//! │            then apply_delta(−qty, TRANSFER) at the source per item     │
//! │                                                                         │
//! │  complete  UPDATE transfers SET status = 'COMPLETED'                   │
//! │             WHERE id = ? AND status = 'IN_TRANSIT' RETURNING ...       │
//! │            then apply_delta(+qty, TRANSFER) at the destination         │
//! │            and received_quantity = quantity                            │
//! │                                                                         │
//! │  The conditional UPDATE is the first statement of the transaction, so  │
//! │  two racing approvals cannot both match: the loser sees zero rows and  │
//! │  gets InvalidState. The batch commits or rolls back with the status.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::engine::EngineConfig;
use crate::error::{DbError, DbResult};
use crate::repository::inventory::{apply_delta, Delta};
use crate::repository::{commit, ensure_exists, new_id, now};
use crate::retry::with_retry;
use vorca_core::transfer::{TransferAction, TransferLeg};
use vorca_core::validation::{validate_id, validate_transfer_request};
use vorca_core::{
    AdjustmentReason, Principal, Transfer, TransferDetail, TransferItem, TransferRequest,
    TransferStatus,
};

const TRANSFER_COLUMNS: &str = "id, from_location_id, to_location_id, status, requested_by, \
     requested_at, approved_by, approved_at, completed_by, completed_at";

const ITEM_COLUMNS: &str = "id, transfer_id, line_no, product_id, quantity, received_quantity";

/// Repository for transfer database operations.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
    engine: Arc<EngineConfig>,
}

impl TransferRepository {
    /// Creates a new TransferRepository.
    pub fn new(pool: SqlitePool, engine: Arc<EngineConfig>) -> Self {
        TransferRepository { pool, engine }
    }

    // =========================================================================
    // Request
    // =========================================================================

    /// Creates a PENDING transfer. Inventory is untouched until approval.
    ///
    /// ## Errors
    /// - `Forbidden` for cashiers
    /// - `ValidationError` for no items, a non-positive quantity, or the same
    ///   location on both ends
    /// - `NotFound` for an unknown location or product
    pub async fn request(
        &self,
        principal: &Principal,
        request: &TransferRequest,
    ) -> DbResult<TransferDetail> {
        principal.require_manager("request transfer")?;
        validate_transfer_request(
            &request.from_location_id,
            &request.to_location_id,
            &request.items,
        )?;

        debug!(
            from = %request.from_location_id,
            to = %request.to_location_id,
            lines = request.items.len(),
            "Requesting transfer"
        );

        let detail = with_retry(&self.engine.retry, "transfer request", move || async move {
            let mut tx = self.pool.begin().await?;
            let detail = Self::request_in(&mut tx, principal, request).await?;
            commit(tx).await?;
            Ok(detail)
        })
        .await?;

        info!(
            transfer_id = %detail.transfer.id,
            from = %detail.transfer.from_location_id,
            to = %detail.transfer.to_location_id,
            actor = %principal.id,
            "Transfer requested"
        );
        Ok(detail)
    }

    async fn request_in(
        conn: &mut SqliteConnection,
        principal: &Principal,
        request: &TransferRequest,
    ) -> DbResult<TransferDetail> {
        let transfer = Transfer {
            id: new_id(),
            from_location_id: request.from_location_id.clone(),
            to_location_id: request.to_location_id.clone(),
            status: TransferStatus::Pending,
            requested_by: principal.id.clone(),
            requested_at: now(),
            approved_by: None,
            approved_at: None,
            completed_by: None,
            completed_at: None,
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO transfers (
                id, from_location_id, to_location_id, status, requested_by, requested_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&transfer.id)
        .bind(&transfer.from_location_id)
        .bind(&transfer.to_location_id)
        .bind(transfer.status)
        .bind(&transfer.requested_by)
        .bind(transfer.requested_at)
        .execute(&mut *conn)
        .await;

        if let Err(e) = inserted {
            return Err(match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    ensure_exists(conn, "locations", "Location", &transfer.from_location_id)
                        .await?;
                    ensure_exists(conn, "locations", "Location", &transfer.to_location_id)
                        .await?;
                    DbError::Internal("Transfer rejected by a foreign key".to_string())
                }
                other => other,
            });
        }

        let mut items = Vec::with_capacity(request.items.len());
        for (index, line) in request.items.iter().enumerate() {
            let item = sqlx::query_as::<_, TransferItem>(&format!(
                r#"
                INSERT INTO transfer_items (
                    id, transfer_id, line_no, product_id, quantity, received_quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, 0)
                RETURNING {}
                "#,
                ITEM_COLUMNS
            ))
            .bind(new_id())
            .bind(&transfer.id)
            .bind(index as i64 + 1)
            .bind(&line.product_id)
            .bind(line.quantity)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => {
                    DbError::not_found("Product", &line.product_id)
                }
                other => other,
            })?;

            items.push(item);
        }

        Ok(TransferDetail { transfer, items })
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Moves a PENDING transfer to IN_TRANSIT and takes stock out of the source.
    ///
    /// ## Errors
    /// - `NotFound` if the transfer does not exist
    /// - `InvalidState` unless it is PENDING
    /// - `ValidationError` if the strict policy refuses the source decrement
    pub async fn approve(&self, principal: &Principal, id: &str) -> DbResult<TransferDetail> {
        self.transition(principal, id, TransferAction::Approve).await
    }

    /// Moves an IN_TRANSIT transfer to COMPLETED and books stock in at the
    /// destination.
    ///
    /// ## Errors
    /// - `NotFound` if the transfer does not exist or has no items
    /// - `InvalidState` unless it is IN_TRANSIT
    pub async fn complete(&self, principal: &Principal, id: &str) -> DbResult<TransferDetail> {
        self.transition(principal, id, TransferAction::Complete).await
    }

    async fn transition(
        &self,
        principal: &Principal,
        id: &str,
        action: TransferAction,
    ) -> DbResult<TransferDetail> {
        principal.require_manager(match action {
            TransferAction::Approve => "approve transfer",
            TransferAction::Complete => "complete transfer",
        })?;
        validate_id("transferId", id)?;

        debug!(transfer_id = %id, action = %action, "Transitioning transfer");

        let detail = with_retry(&self.engine.retry, action.as_str(), move || async move {
            let mut tx = self.pool.begin().await?;
            let detail = self.transition_in(&mut tx, principal, id, action).await?;
            commit(tx).await?;
            Ok(detail)
        })
        .await
        .inspect_err(|e| {
            if e.kind() == vorca_core::ErrorKind::InvalidState {
                warn!(transfer_id = %id, action = %action, error = %e, "Transfer transition refused");
            }
        })?;

        info!(
            transfer_id = %id,
            status = %detail.transfer.status,
            actor = %principal.id,
            "Transfer {}d",
            action
        );
        Ok(detail)
    }

    async fn transition_in(
        &self,
        conn: &mut SqliteConnection,
        principal: &Principal,
        id: &str,
        action: TransferAction,
    ) -> DbResult<TransferDetail> {
        let at = now();
        let sql = match action {
            TransferAction::Approve => format!(
                "UPDATE transfers SET status = ?1, approved_by = ?2, approved_at = ?3 \
                 WHERE id = ?4 AND status = ?5 RETURNING {}",
                TRANSFER_COLUMNS
            ),
            TransferAction::Complete => format!(
                "UPDATE transfers SET status = ?1, completed_by = ?2, completed_at = ?3 \
                 WHERE id = ?4 AND status = ?5 RETURNING {}",
                TRANSFER_COLUMNS
            ),
        };

        let transfer = sqlx::query_as::<_, Transfer>(&sql)
            .bind(action.to_status())
            .bind(&principal.id)
            .bind(at)
            .bind(id)
            .bind(action.from_status())
            .fetch_optional(&mut *conn)
            .await?;

        let transfer = match transfer {
            Some(transfer) => transfer,
            None => return Err(Self::explain_miss(conn, id, action).await),
        };

        let items = Self::items_in(conn, id).await?;
        if items.is_empty() {
            return Err(DbError::not_found("Transfer items", id));
        }

        let (leg, sign) = action.leg();
        let location_id = action.affected_location(&transfer);
        for item in &items {
            apply_delta(
                conn,
                &Delta {
                    product_id: &item.product_id,
                    location_id,
                    quantity: sign * item.quantity,
                    reason: AdjustmentReason::Transfer,
                    notes: None,
                    actor_id: &principal.id,
                    reference_id: Some(&transfer.id),
                },
                &self.engine,
            )
            .await?;
        }

        let items = match leg {
            TransferLeg::Destination => {
                sqlx::query(
                    "UPDATE transfer_items SET received_quantity = quantity WHERE transfer_id = ?1",
                )
                .bind(id)
                .execute(&mut *conn)
                .await?;
                Self::items_in(conn, id).await?
            }
            TransferLeg::Source => items,
        };

        Ok(TransferDetail { transfer, items })
    }

    /// Why a conditional status update matched nothing.
    async fn explain_miss(conn: &mut SqliteConnection, id: &str, action: TransferAction) -> DbError {
        let status = sqlx::query_scalar::<_, TransferStatus>(
            "SELECT status FROM transfers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await;

        match status {
            Ok(None) => DbError::not_found("Transfer", id),
            Ok(Some(current)) => match action.check(id, current) {
                Err(e) => e.into(),
                // Status moved between the update and this read
                Ok(_) => DbError::Conflict(format!("Transfer {} changed concurrently", id)),
            },
            Err(e) => e.into(),
        }
    }

    async fn items_in(conn: &mut SqliteConnection, transfer_id: &str) -> DbResult<Vec<TransferItem>> {
        let items = sqlx::query_as::<_, TransferItem>(&format!(
            "SELECT {} FROM transfer_items WHERE transfer_id = ?1 ORDER BY line_no",
            ITEM_COLUMNS
        ))
        .bind(transfer_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets a transfer with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TransferDetail>> {
        let mut conn = self.pool.acquire().await?;

        let transfer = sqlx::query_as::<_, Transfer>(&format!(
            "SELECT {} FROM transfers WHERE id = ?1",
            TRANSFER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match transfer {
            Some(transfer) => {
                let items = Self::items_in(&mut conn, &transfer.id).await?;
                Ok(Some(TransferDetail { transfer, items }))
            }
            None => Ok(None),
        }
    }

    /// Lists transfers newest first, optionally in one status.
    pub async fn list(&self, status: Option<TransferStatus>) -> DbResult<Vec<TransferDetail>> {
        let mut conn = self.pool.acquire().await?;

        let transfers = sqlx::query_as::<_, Transfer>(&format!(
            "SELECT {} FROM transfers WHERE (?1 IS NULL OR status = ?1) \
             ORDER BY requested_at DESC, rowid DESC",
            TRANSFER_COLUMNS
        ))
        .bind(status)
        .fetch_all(&mut *conn)
        .await?;

        let mut details = Vec::with_capacity(transfers.len());
        for transfer in transfers {
            let items = Self::items_in(&mut conn, &transfer.id).await?;
            details.push(TransferDetail { transfer, items });
        }

        Ok(details)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
