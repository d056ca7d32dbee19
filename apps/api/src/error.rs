//! Error types for the HTTP layer.
//!
//! Every failure leaves as JSON `{ "code": ..., "message": ... }`.
//!
//! ```text
//! VALIDATION_ERROR   400     INVALID_STATE      409
//! UNAUTHORIZED       401     CONFLICT           409
//! FORBIDDEN          403     TRANSACTION_ERROR  500
//! NOT_FOUND          404
//! ```
//!
//! Internal causes of a TRANSACTION_ERROR are logged and replaced with a
//! generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use vorca_core::{CoreError, ErrorKind, ValidationError};
use vorca_db::DbError;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed or expired bearer token.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Request body, path or query could not be decoded.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// HTTP status and wire code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorKind::ValidationError.code()),
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorKind::NotFound.code()),
            ApiError::Db(e) => {
                let kind = e.kind();
                (status_for(kind), kind.code())
            }
        }
    }
}

/// Status code for each failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::TransactionError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            "Internal error, nothing was written".to_string()
        } else {
            if status == StatusCode::CONFLICT {
                warn!(error = %self, "Request conflicted");
            }
            self.to_string()
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Db(DbError::Domain(err))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Db(DbError::from(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ErrorKind::ValidationError, 400),
            (ErrorKind::Forbidden, 403),
            (ErrorKind::NotFound, 404),
            (ErrorKind::InvalidState, 409),
            (ErrorKind::Conflict, 409),
            (ErrorKind::TransactionError, 500),
        ];
        for (kind, status) in cases {
            assert_eq!(status_for(kind).as_u16(), status, "{kind}");
        }
    }

    #[test]
    fn test_db_errors_keep_their_kind() {
        let err = ApiError::from(DbError::not_found("Transfer", "t-1"));
        assert_eq!(err.status_and_code(), (StatusCode::NOT_FOUND, "NOT_FOUND"));

        let err = ApiError::from(ValidationError::Empty {
            field: "items".to_string(),
        });
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );

        let err = ApiError::from(DbError::TransactionFailed("disk I/O error".to_string()));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "TRANSACTION_ERROR")
        );
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::Unauthorized("missing token".to_string());
        assert_eq!(err.status_and_code().0, StatusCode::UNAUTHORIZED);
    }
}
