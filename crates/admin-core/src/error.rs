//! Unified application error types for the admin backend.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource (node, parent, session target) was not found.
    NotFound,
    /// A reparent operation would make a node its own ancestor.
    CycleDetected,
    /// Delete blocked because the node still has child nodes.
    HasChildren,
    /// Delete blocked because an association table still references the node.
    HasDependents,
    /// No credential was supplied with the request.
    MissingCredential,
    /// The credential is not a well-formed compact token.
    MalformedCredential,
    /// The credential signature or claims failed verification.
    InvalidSignature,
    /// The credential is not in the whitelist or has expired.
    RevokedOrExpired,
    /// The caller is authenticated but lacks the required permission.
    Authorization,
    /// The ID allocator observed the wall clock moving backward beyond its tolerance.
    ClockRegression,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Whether this kind is one of the credential failures that callers
    /// report uniformly as "unauthorized".
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential
                | Self::MalformedCredential
                | Self::InvalidSignature
                | Self::RevokedOrExpired
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::CycleDetected => write!(f, "CYCLE_DETECTED"),
            Self::HasChildren => write!(f, "HAS_CHILDREN"),
            Self::HasDependents => write!(f, "HAS_DEPENDENTS"),
            Self::MissingCredential => write!(f, "MISSING_CREDENTIAL"),
            Self::MalformedCredential => write!(f, "MALFORMED_CREDENTIAL"),
            Self::InvalidSignature => write!(f, "INVALID_SIGNATURE"),
            Self::RevokedOrExpired => write!(f, "REVOKED_OR_EXPIRED"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::ClockRegression => write!(f, "CLOCK_REGRESSION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout the admin backend.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a cycle-detected error.
    pub fn cycle_detected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CycleDetected, message)
    }

    /// Create a has-children error.
    pub fn has_children(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HasChildren, message)
    }

    /// Create a has-dependents error.
    pub fn has_dependents(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HasDependents, message)
    }

    /// Create a missing-credential error.
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingCredential, message)
    }

    /// Create a malformed-credential error.
    pub fn malformed_credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedCredential, message)
    }

    /// Create an invalid-signature error.
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSignature, message)
    }

    /// Create a revoked-or-expired error.
    pub fn revoked_or_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RevokedOrExpired, message)
    }

    /// Create an authorization (forbidden) error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a clock-regression error.
    pub fn clock_regression(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClockRegression, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Whether this error is one of the credential failures.
    pub fn is_authentication(&self) -> bool {
        self.kind.is_authentication()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_kinds() {
        assert!(ErrorKind::MissingCredential.is_authentication());
        assert!(ErrorKind::MalformedCredential.is_authentication());
        assert!(ErrorKind::InvalidSignature.is_authentication());
        assert!(ErrorKind::RevokedOrExpired.is_authentication());
        assert!(!ErrorKind::Authorization.is_authentication());
        assert!(!ErrorKind::Cache.is_authentication());
    }

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::cycle_detected("node 7 cannot move under 9");
        assert_eq!(err.to_string(), "CYCLE_DETECTED: node 7 cannot move under 9");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("disk");
        let err = AppError::from(io);
        assert!(std::error::Error::source(&err).is_some());
        let cloned = err.clone();
        assert!(std::error::Error::source(&cloned).is_none());
        assert_eq!(cloned.kind, ErrorKind::Internal);
    }
}
