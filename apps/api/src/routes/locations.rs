//! Location routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use vorca_core::{Location, NewLocation};

use crate::auth::Auth;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::AppState;

/// `GET /locations`
pub async fn list(State(state): State<AppState>, Auth(_): Auth) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.db.locations().list().await?))
}

/// `POST /locations`, owner only.
pub async fn create(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ApiJson(body): ApiJson<NewLocation>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    let location = state.db.locations().create(&principal, &body).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// `GET /locations/{id}`
pub async fn get(
    State(state): State<AppState>,
    Auth(_): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<Location>> {
    state
        .db
        .locations()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Location", id))
}
