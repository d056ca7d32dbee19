//! Inventory routes: adjustments, levels, alerts, thresholds, reconciliation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use vorca_core::{
    AdjustmentRequest, AppliedDelta, Inventory, InventoryLevel, Reconciliation, ThresholdRequest,
};

use crate::auth::Auth;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::LocationFilter;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileQuery {
    pub product_id: String,
    pub location_id: String,
}

/// `POST /inventory/adjustments`
pub async fn adjust(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ApiJson(body): ApiJson<AdjustmentRequest>,
) -> ApiResult<(StatusCode, Json<AppliedDelta>)> {
    let applied = state.db.inventory().adjust(&principal, &body).await?;
    Ok((StatusCode::CREATED, Json(applied)))
}

/// `GET /inventory?locationId=`
pub async fn list(
    State(state): State<AppState>,
    Auth(_): Auth,
    ApiQuery(filter): ApiQuery<LocationFilter>,
) -> ApiResult<Json<Vec<InventoryLevel>>> {
    let levels = state
        .db
        .inventory()
        .list(filter.location_id.as_deref())
        .await?;
    Ok(Json(levels))
}

/// `GET /inventory/alerts/low-stock?locationId=`
pub async fn low_stock(
    State(state): State<AppState>,
    Auth(_): Auth,
    ApiQuery(filter): ApiQuery<LocationFilter>,
) -> ApiResult<Json<Vec<InventoryLevel>>> {
    let levels = state
        .db
        .inventory()
        .low_stock(filter.location_id.as_deref())
        .await?;
    Ok(Json(levels))
}

/// `PUT /inventory/threshold`
pub async fn set_threshold(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ApiJson(body): ApiJson<ThresholdRequest>,
) -> ApiResult<Json<Inventory>> {
    let row = state
        .db
        .inventory()
        .set_low_stock_threshold(&principal, &body)
        .await?;
    Ok(Json(row))
}

/// `GET /inventory/reconcile?productId=&locationId=`
pub async fn reconcile(
    State(state): State<AppState>,
    Auth(_): Auth,
    ApiQuery(query): ApiQuery<ReconcileQuery>,
) -> ApiResult<Json<Reconciliation>> {
    let report = state
        .db
        .inventory()
        .reconcile(&query.product_id, &query.location_id)
        .await?;
    Ok(Json(report))
}
