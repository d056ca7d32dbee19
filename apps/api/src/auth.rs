//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs issued by the identity provider with claims
//! `{ id, email, role, exp }`. Only verification happens here.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//! JwtVerifier::verify ──► Claims ──► Principal { id, role }
//!        │
//!        └── missing / bad signature / expired / unknown role ──► 401
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vorca_core::{Principal, Role};

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: String,

    pub email: String,

    /// CASHIER, MANAGER or OWNER
    pub role: String,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Verifies bearer tokens against the shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims = ["exp"].iter().map(|c| c.to_string()).collect();

        JwtVerifier {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and resolve the principal it names.
    pub fn verify(&self, token: &str) -> Result<Principal, ApiError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

        let role: Role = data
            .claims
            .role
            .parse()
            .map_err(|_| ApiError::Unauthorized(format!("Unknown role {}", data.claims.role)))?;

        if data.claims.id.trim().is_empty() {
            return Err(ApiError::Unauthorized("Token has no user id".to_string()));
        }

        debug!(user = %data.claims.id, role = %role, "Authenticated");
        Ok(Principal::new(data.claims.id, role))
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Malformed authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))?;

        state.verifier.verify(token).map(Auth)
    }
}
