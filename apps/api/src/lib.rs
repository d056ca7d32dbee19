//! # Vorca API
//!
//! HTTP/JSON front end for the Vorca POS engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Routes (/api/v1)                           │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌──────────────────┐  │
//! │  │  /inventory        │  │  /sales            │  │  /products       │  │
//! │  │                    │  │                    │  │  /locations      │  │
//! │  │ • adjustments      │  │ • checkout         │  │                  │  │
//! │  │ • alerts/low-stock │  │ • list / get       │  │ • catalog CRUD   │  │
//! │  │ • threshold        │  │ • analytics/summary│  │                  │  │
//! │  │ • reconcile        │  │                    │  │                  │  │
//! │  │ • transfers        │  │                    │  │                  │  │
//! │  └────────────────────┘  └────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  Auth extractor ──► Principal ──► vorca-db repositories                 │
//! │  ApiError ──► { code, message } with 400/401/403/404/409/500            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`] for the `VORCA_*` environment variables.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;

use vorca_db::Database;

pub use auth::{Auth, Claims, JwtVerifier};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub verifier: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(db: Database, jwt_secret: &str) -> Self {
        AppState {
            db: Arc::new(db),
            verifier: Arc::new(JwtVerifier::new(jwt_secret)),
        }
    }
}

/// Builds the full router with state attached.
pub fn build_router(state: AppState) -> Router {
    routes::router().with_state(state)
}
