//! Access log entry entity model.

use admin_core::types::AccessLogId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An immutable record of one mutating HTTP request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessLog {
    /// Unique entry identifier.
    pub id: AccessLogId,
    /// Authenticated username, empty for anonymous requests.
    pub username: String,
    /// Request path.
    pub path: String,
    /// HTTP method.
    pub method: String,
    /// Client IP address.
    pub ip: String,
    /// Response status code.
    pub status_code: i32,
    /// User-Agent header value.
    pub user_agent: String,
    /// Handler latency in milliseconds.
    pub latency_ms: i64,
    /// When the request completed.
    pub created_at: DateTime<Utc>,
}

/// Data required to record an access log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccessLog {
    /// Authenticated username.
    pub username: String,
    /// Request path.
    pub path: String,
    /// HTTP method.
    pub method: String,
    /// Client IP address.
    pub ip: String,
    /// Response status code.
    pub status_code: i32,
    /// User-Agent header value.
    pub user_agent: String,
    /// Handler latency in milliseconds.
    pub latency_ms: i64,
}

impl CreateAccessLog {
    /// Build a row with the given id, stamped now.
    pub fn into_row(self, id: AccessLogId) -> AccessLog {
        AccessLog {
            id,
            username: self.username,
            path: self.path,
            method: self.method,
            ip: self.ip,
            status_code: self.status_code,
            user_agent: self.user_agent,
            latency_ms: self.latency_ms,
            created_at: Utc::now(),
        }
    }
}

/// Filters for the access log list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessLogFilter {
    /// Substring match on username.
    pub username: Option<String>,
    /// Substring match on path.
    pub path: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end_time: Option<DateTime<Utc>>,
}
