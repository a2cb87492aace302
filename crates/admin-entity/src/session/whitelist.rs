//! Whitelist entry for a live token.

use admin_core::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::MenuSnapshot;

/// Cache value stored under `jwt:whitelist:<token>`.
///
/// The entry exists exactly as long as the token is live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Session owner.
    pub user_id: UserId,
    /// Owner's login name.
    pub username: String,
    /// When the token was minted.
    pub issued_at: DateTime<Utc>,
    /// When the token stops being valid.
    pub expires_at: DateTime<Utc>,
    /// Menu tree captured at login.
    #[serde(default)]
    pub menus: Vec<MenuSnapshot>,
}

impl WhitelistEntry {
    /// Seconds of validity left at `now`, never negative.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at - now).num_seconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_core::types::MenuId;
    use chrono::Duration;

    #[test]
    fn test_json_shape() {
        let now = Utc::now();
        let entry = WhitelistEntry {
            user_id: UserId(5),
            username: "alice".into(),
            issued_at: now,
            expires_at: now + Duration::hours(24),
            menus: vec![MenuSnapshot {
                id: MenuId(1),
                name: "Users".into(),
                route: "/users".into(),
                permission: Some("user:read".into()),
                sort: 0,
                children: vec![],
            }],
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["user_id"], "5");
        assert_eq!(value["menus"][0]["permission"], "user:read");
        assert!(value["menus"][0]["children"].as_array().unwrap().is_empty());

        let back: WhitelistEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back.remaining_seconds(now), 86_400);
    }
}
