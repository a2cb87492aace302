//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use admin_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// HTTP-facing wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>` and use `?` on service calls.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self(AppError::validation(err.to_string()))
    }
}

/// Status code and public error code for a kind.
pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::MissingCredential
        | ErrorKind::MalformedCredential
        | ErrorKind::InvalidSignature
        | ErrorKind::RevokedOrExpired => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::CycleDetected => (StatusCode::BAD_REQUEST, "CYCLE_DETECTED"),
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::HasChildren => (StatusCode::CONFLICT, "HAS_CHILDREN"),
        ErrorKind::HasDependents => (StatusCode::CONFLICT, "HAS_DEPENDENTS"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::Cache | ErrorKind::ClockRegression | ErrorKind::ServiceUnavailable => {
            (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
        }
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Configuration
        | ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, error_code) = status_for(err.kind);

        // All credential failures share one body; the precise kind is only logged.
        let message = if err.is_authentication() {
            debug!(kind = %err.kind, reason = %err.message, "Request not authenticated");
            "Authentication required".to_string()
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(kind = %err.kind, error = %err.message, "Dependency unavailable");
            "Service temporarily unavailable".to_string()
        } else if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(kind = %err.kind, error = %err.message, "Internal server error");
            "Internal server error".to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_kinds_share_one_status() {
        for kind in [
            ErrorKind::MissingCredential,
            ErrorKind::MalformedCredential,
            ErrorKind::InvalidSignature,
            ErrorKind::RevokedOrExpired,
        ] {
            assert_eq!(status_for(kind), (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"));
        }
    }

    #[test]
    fn test_hierarchy_kinds() {
        assert_eq!(status_for(ErrorKind::CycleDetected).0, StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::HasChildren).0, StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::HasDependents).0, StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::NotFound).0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unavailable_kinds() {
        assert_eq!(status_for(ErrorKind::Cache).0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_for(ErrorKind::ClockRegression).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_for(ErrorKind::Database).0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::Authorization).0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_authentication_body_is_uniform() {
        let a = ApiError(AppError::revoked_or_expired("token not in whitelist")).into_response();
        let b = ApiError(AppError::malformed_credential("two segments")).into_response();
        assert_eq!(a.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(b.status(), StatusCode::UNAUTHORIZED);
    }
}
