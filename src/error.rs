use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relations::RelationError;
use thiserror::Error;

use crate::omdb::OmdbError;
use crate::schemas::ErrorResponse;

/// The service-level error taxonomy. Every failure leaving a handler goes
/// through this type so the wire always carries the same
/// `{ error, code, success: false }` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed entity identifier, rejected before any store access.
    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    NotFound(String),

    /// A unique field is already taken (e.g. a registered email).
    #[error("{0}")]
    Conflict(String),

    /// Missing or malformed required fields.
    #[error("{0}")]
    ValidationFailed(String),

    /// A structurally valid request the domain rules forbid.
    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// The external metadata service failed; carries the status the
    /// failure maps to (401 credentials, 403 rate limit, 404 missing).
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ValidationFailed(_) => "VALIDATION_FAILED",
            ApiError::InvalidOperation(_) => "INVALID_OPERATION",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Upstream { .. } => "UPSTREAM_FAILURE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            success: false,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<RelationError> for ApiError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::InvalidIdentifier(id) => {
                ApiError::InvalidIdentifier(format!("Invalid identifier format: {id}"))
            }
            RelationError::NotFound { kind, id } => {
                ApiError::NotFound(format!("{kind} not found: {id}"))
            }
            RelationError::InvalidOperation(message) => ApiError::InvalidOperation(message),
            RelationError::Database(db_error) => ApiError::Internal(db_error.to_string()),
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<OmdbError> for ApiError {
    fn from(err: OmdbError) -> Self {
        let status = match &err {
            OmdbError::MissingApiKey | OmdbError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            OmdbError::RateLimited => StatusCode::FORBIDDEN,
            OmdbError::NotFound(_) => StatusCode::NOT_FOUND,
            OmdbError::Api(code, _) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            OmdbError::Network(_) | OmdbError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::Upstream {
            status,
            message: err.to_string(),
        }
    }
}

/// Shorthand used by handlers that validate path identifiers before
/// touching the store.
pub fn ensure_valid_id(id: &str, what: &str) -> Result<(), ApiError> {
    if common::is_valid_entity_id(id) {
        Ok(())
    } else {
        Err(ApiError::InvalidIdentifier(format!(
            "Invalid {what} ID format"
        )))
    }
}
