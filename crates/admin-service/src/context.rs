//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use admin_auth::AuthSession;
use admin_core::types::UserId;

/// Context for the current authenticated request.
///
/// Built by the API layer from the typed [`AuthSession`] and passed into
/// service methods so that every operation knows *who* is acting. Actor
/// columns (`created_by`, `updated_by`, `deleted_by`) are filled from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The username (from the token claims).
    pub username: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: UserId,
        username: String,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            username,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Creates a context for an authenticated session.
    pub fn from_session(session: &AuthSession, ip_address: String, user_agent: Option<String>) -> Self {
        Self::new(session.user_id, session.username.clone(), ip_address, user_agent)
    }

    /// The actor recorded in audit columns.
    pub fn actor(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}
