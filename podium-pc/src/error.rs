//! Error types for podium-pc
//!
//! Every domain error kind maps to exactly one HTTP status and code
//! string, so clients can match on the closed set.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error envelope for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Target resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or unusable request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Credential check failed (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Lifecycle state forbids the operation (409)
    #[error("State conflict: {0}")]
    Conflict(String),

    /// Unexpected failure inside a handler (500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Anything propagated through anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// Domain error from the lifecycle core
    #[error("{0}")]
    Domain(#[from] podium_common::Error),
}

/// Status and code for a domain error kind
fn domain_status(error: &podium_common::Error) -> (StatusCode, &'static str) {
    use podium_common::Error;
    match error {
        Error::InvalidConfig(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Error::AttemptInProgress(_) => (StatusCode::CONFLICT, "ATTEMPT_IN_PROGRESS"),
        Error::AlreadyRunning(_) => (StatusCode::CONFLICT, "ALREADY_RUNNING"),
        Error::InvalidRating(_) => (StatusCode::BAD_REQUEST, "INVALID_RATING"),
        Error::UnknownCategory(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_CATEGORY"),
        Error::PrematureCommit(_) => (StatusCode::CONFLICT, "PREMATURE_COMMIT"),
        Error::AlreadyCommitted(_) => (StatusCode::CONFLICT, "ALREADY_COMMITTED"),
        Error::Analysis(_) => (StatusCode::CONFLICT, "ANALYSIS_ERROR"),
        Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Other(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
            ApiError::Domain(err) => {
                let (status, code) = domain_status(&err);
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use podium_common::Error;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (Error::InvalidConfig("x".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::AttemptInProgress("x".into()), StatusCode::CONFLICT),
            (Error::AlreadyRunning("x".into()), StatusCode::CONFLICT),
            (Error::InvalidRating(9), StatusCode::BAD_REQUEST),
            (Error::UnknownCategory("x".into()), StatusCode::BAD_REQUEST),
            (Error::PrematureCommit("x".into()), StatusCode::CONFLICT),
            (Error::AlreadyCommitted("x".into()), StatusCode::CONFLICT),
            (Error::Analysis("x".into()), StatusCode::CONFLICT),
        ];
        for (error, expected) in cases {
            let (status, _) = domain_status(&error);
            assert_eq!(status, expected, "wrong status for {}", error);
        }
    }

    #[test]
    fn test_domain_error_codes_are_distinct() {
        let errors = [
            Error::InvalidConfig("x".into()),
            Error::NotFound("x".into()),
            Error::AttemptInProgress("x".into()),
            Error::AlreadyRunning("x".into()),
            Error::InvalidRating(9),
            Error::UnknownCategory("x".into()),
            Error::PrematureCommit("x".into()),
            Error::AlreadyCommitted("x".into()),
            Error::Analysis("x".into()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| domain_status(e).1).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len(), "error codes must be unique");
    }
}
