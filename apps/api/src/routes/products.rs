//! Product catalog routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use vorca_core::{NewProduct, Product, ProductPatch};

use crate::auth::Auth;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::routes::LocationFilter;
use crate::AppState;

/// `GET /products?locationId=`
pub async fn list(
    State(state): State<AppState>,
    Auth(_): Auth,
    ApiQuery(filter): ApiQuery<LocationFilter>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(
        state
            .db
            .products()
            .list(filter.location_id.as_deref())
            .await?,
    ))
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    Auth(principal): Auth,
    ApiJson(body): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().create(&principal, &body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /products/{id}`
pub async fn get(
    State(state): State<AppState>,
    Auth(_): Auth,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// `PUT /products/{id}`
pub async fn update(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    Ok(Json(
        state.db.products().update(&principal, &id, &patch).await?,
    ))
}

/// `DELETE /products/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&principal, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
