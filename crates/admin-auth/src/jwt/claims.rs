//! JWT claims structure carried by every session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use admin_core::types::UserId;
use admin_entity::session::MenuSnapshot;

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user id.
    pub user_id: i64,
    /// Username for convenience.
    pub username: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Not-before timestamp (seconds since epoch).
    pub nbf: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id. Two tokens minted in the same second never share a key.
    pub jti: Uuid,
    /// Menu snapshot, only present when embedding is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menus: Option<Vec<MenuSnapshot>>,
}

impl Claims {
    /// Returns the typed user id.
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Returns the issue time as a `DateTime<Utc>`.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Seconds of validity left at `now_secs` (0 if expired).
    pub fn remaining_seconds(&self, now_secs: i64) -> u64 {
        (self.exp - now_secs).max(0) as u64
    }
}
