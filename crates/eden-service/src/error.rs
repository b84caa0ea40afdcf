//! Error types for eden-service

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eden_curation::{CurationError, StoreError};
use eden_types::ParseEnumError;
use serde::Serialize;
use thiserror::Error;

/// Service startup errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Caller may not perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Well-formed request refused by collection criteria
    #[error("Criteria not met: {0}")]
    Unprocessable(String),

    /// Internal error; the detail is logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "CRITERIA_NOT_MET"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let error = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CurationError> for ApiError {
    fn from(err: CurationError) -> Self {
        match err {
            CurationError::NotFound(msg) => ApiError::NotFound(msg),
            CurationError::Validation(msg) => ApiError::BadRequest(msg),
            CurationError::Forbidden(msg) => ApiError::Forbidden(msg),
            CurationError::Conflict(msg) => ApiError::Conflict(msg),
            CurationError::CriteriaNotMet(msg) => ApiError::Unprocessable(msg),
            CurationError::Store(err) => err.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidKey(key) => ApiError::BadRequest(format!("invalid identifier '{key}'")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ParseEnumError> for ApiError {
    fn from(err: ParseEnumError) -> Self {
        ApiError::BadRequest(err.to_string())
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

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for service startup
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Unprocessable("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_curation_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(CurationError::Validation("bad".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(CurationError::CriteriaNotMet("low".into())),
            ApiError::Unprocessable(_)
        ));
        assert!(matches!(
            ApiError::from(CurationError::Store(StoreError::InvalidKey("../x".into()))),
            ApiError::BadRequest(_)
        ));
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert!(matches!(
            ApiError::from(CurationError::Store(StoreError::Io(io))),
            ApiError::Internal(_)
        ));
    }
}
