use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("An application for job {job_id} by user {user_id} already exists")]
    DuplicateApplication { job_id: i64, user_id: i64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {0}")]
    ValidationErrors(#[from] validator::ValidationErrors),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Transient persistence failures the caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Conflict(_) | Error::Timeout(_) => true,
            Error::Database(err) => matches!(
                err,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }

    /// Stable short name used in bulk outcomes and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::NotFound(_) => "not_found",
            Error::InvalidTransition(_) => "invalid_transition",
            Error::DuplicateApplication { .. } => "duplicate_application",
            Error::Validation(_) | Error::ValidationErrors(_) => "validation_error",
            Error::PermissionDenied(_) => "permission_denied",
            Error::Unauthorized(_) => "unauthorized",
            Error::Conflict(_) => "conflict",
            Error::Timeout(_) => "timeout",
            Error::Database(_) | Error::Migrate(_) => "database",
            Error::Json(_) => "json",
            Error::Reqwest(_) => "http",
            Error::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match &self {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::InvalidTransition(_) | Error::DuplicateApplication { .. } | Error::Conflict(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::ValidationErrors(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Error::Timeout(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            Error::Database(err) => {
                tracing::error!(error = ?err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message, "kind": self.kind() }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(Error::Conflict("stage rotated".into()).is_retryable());
        assert!(Error::Timeout(5000).is_retryable());
        assert!(Error::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!Error::InvalidTransition("hired -> screening".into()).is_retryable());
        assert!(!Error::Validation("score".into()).is_retryable());
        assert!(!Error::DuplicateApplication { job_id: 1, user_id: 1 }.is_retryable());
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn responses_carry_expected_status_codes() {
        let cases = [
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::InvalidTransition("x".into()), StatusCode::CONFLICT),
            (Error::DuplicateApplication { job_id: 1, user_id: 2 }, StatusCode::CONFLICT),
            (Error::Validation("x".into()), StatusCode::BAD_REQUEST),
            (Error::PermissionDenied("x".into()), StatusCode::FORBIDDEN),
            (Error::Timeout(10), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
