//! Transfer workflow routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use vorca_core::{TransferDetail, TransferRequest, TransferStatus};

use crate::auth::Auth;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<TransferStatus>,
}

/// `POST /inventory/transfers`
pub async fn request(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ApiJson(body): ApiJson<TransferRequest>,
) -> ApiResult<(StatusCode, Json<TransferDetail>)> {
    let detail = state.db.transfers().request(&principal, &body).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /inventory/transfers?status=`
pub async fn list(
    State(state): State<AppState>,
    Auth(_): Auth,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> ApiResult<Json<Vec<TransferDetail>>> {
    Ok(Json(state.db.transfers().list(filter.status).await?))
}

/// `GET /inventory/transfers/{id}`
pub async fn get(
    State(state): State<AppState>,
    Auth(_): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<TransferDetail>> {
    state
        .db
        .transfers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Transfer", id))
}

/// `PATCH /inventory/transfers/{id}/approve`
pub async fn approve(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<TransferDetail>> {
    Ok(Json(state.db.transfers().approve(&principal, &id).await?))
}

/// `PATCH /inventory/transfers/{id}/complete`
pub async fn complete(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<TransferDetail>> {
    Ok(Json(state.db.transfers().complete(&principal, &id).await?))
}
