//! Checkout, sale history and analytics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use vorca_core::{CheckoutRequest, SaleDetail, SalesSummary};

use crate::auth::Auth;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::LocationFilter;
use crate::AppState;

/// `POST /sales`
pub async fn checkout(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ApiJson(body): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<SaleDetail>)> {
    let detail = state.db.sales().checkout(&principal, &body).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /sales?locationId=`
pub async fn list(
    State(state): State<AppState>,
    Auth(_): Auth,
    ApiQuery(filter): ApiQuery<LocationFilter>,
) -> ApiResult<Json<Vec<SaleDetail>>> {
    Ok(Json(
        state.db.sales().list(filter.location_id.as_deref()).await?,
    ))
}

/// `GET /sales/{id}`
pub async fn get(
    State(state): State<AppState>,
    Auth(_): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleDetail>> {
    state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", id))
}

/// `GET /sales/analytics/summary?locationId=`
pub async fn summary(
    State(state): State<AppState>,
    Auth(_): Auth,
    ApiQuery(filter): ApiQuery<LocationFilter>,
) -> ApiResult<Json<SalesSummary>> {
    Ok(Json(
        state
            .db
            .analytics()
            .summary(filter.location_id.as_deref())
            .await?,
    ))
}
