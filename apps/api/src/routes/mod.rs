//! Route table.
//!
//! ```text
//! GET    /health
//! /api/v1
//!   GET    /health
//!   POST   /inventory/adjustments              201
//!   GET    /inventory?locationId=
//!   GET    /inventory/alerts/low-stock?locationId=
//!   PUT    /inventory/threshold
//!   GET    /inventory/reconcile?productId=&locationId=
//!   POST   /inventory/transfers                201
//!   GET    /inventory/transfers?status=
//!   GET    /inventory/transfers/{id}
//!   PATCH  /inventory/transfers/{id}/approve
//!   PATCH  /inventory/transfers/{id}/complete
//!   POST   /sales                              201
//!   GET    /sales?locationId=
//!   GET    /sales/{id}
//!   GET    /sales/analytics/summary?locationId=
//!   GET    /products?locationId=    POST /products   201
//!   GET    /products/{id}           PUT  /products/{id}   DELETE /products/{id}  204
//!   GET    /locations               POST /locations  201
//!   GET    /locations/{id}
//! ```

pub mod health;
pub mod inventory;
pub mod locations;
pub mod products;
pub mod sales;
pub mod transfers;

use axum::routing::{get, patch, post, put};
use axum::Router;
use serde::Deserialize;

use crate::AppState;

/// Optional `?locationId=` filter shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilter {
    pub location_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api())
}

fn api() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Inventory
        .route("/inventory", get(inventory::list))
        .route("/inventory/adjustments", post(inventory::adjust))
        .route("/inventory/alerts/low-stock", get(inventory::low_stock))
        .route("/inventory/threshold", put(inventory::set_threshold))
        .route("/inventory/reconcile", get(inventory::reconcile))
        // Transfers
        .route(
            "/inventory/transfers",
            post(transfers::request).get(transfers::list),
        )
        .route("/inventory/transfers/{id}", get(transfers::get))
        .route("/inventory/transfers/{id}/approve", patch(transfers::approve))
        .route("/inventory/transfers/{id}/complete", patch(transfers::complete))
        // Sales
        .route("/sales", post(sales::checkout).get(sales::list))
        .route("/sales/analytics/summary", get(sales::summary))
        .route("/sales/{id}", get(sales::get))
        // Catalog
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/locations", get(locations::list).post(locations::create))
        .route("/locations/{id}", get(locations::get))
}
