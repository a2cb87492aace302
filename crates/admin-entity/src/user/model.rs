//! User entity model.

use admin_core::types::{OrganizationId, RoleId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::RecordStatus;

/// An operator account of the admin system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Password hash in PHC string format.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Email address (optional, unique when present).
    pub email: Option<String>,
    /// Phone number.
    pub phone: String,
    /// Real name.
    pub real_name: String,
    /// Avatar URL.
    pub avatar: String,
    /// Account status.
    pub status: RecordStatus,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// The admin who created this user.
    pub created_by: Option<UserId>,
    /// The admin who last edited this user.
    pub updated_by: Option<UserId>,
    /// Who soft-deleted the row.
    #[serde(skip_serializing)]
    pub deleted_by: Option<UserId>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.is_enabled() && self.deleted_at.is_none()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Plain-text password; hashed before storage.
    #[serde(skip_serializing)]
    pub password: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Real name.
    #[serde(default)]
    pub real_name: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: String,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Organizations to join on creation.
    #[serde(default)]
    pub organization_ids: Vec<OrganizationId>,
    /// Roles to grant on creation.
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

/// Data for updating an existing user's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New real name.
    pub real_name: Option<String>,
    /// New avatar.
    pub avatar: Option<String>,
    /// New status.
    pub status: Option<RecordStatus>,
}

impl UpdateUser {
    /// Apply every present field to `user`.
    pub fn apply(self, user: &mut User, actor: Option<UserId>) {
        if let Some(email) = self.email {
            user.email = (!email.trim().is_empty()).then_some(email);
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(real_name) = self.real_name {
            user.real_name = real_name;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        user.updated_by = actor;
        user.updated_at = Utc::now();
    }
}

/// Fields users may change on their own account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// Email address; blank clears it.
    #[serde(default)]
    pub email: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Real name.
    #[serde(default)]
    pub real_name: String,
}

impl From<UpdateProfile> for UpdateUser {
    fn from(profile: UpdateProfile) -> Self {
        Self {
            email: Some(profile.email),
            phone: Some(profile.phone),
            real_name: Some(profile.real_name),
            avatar: None,
            status: None,
        }
    }
}

/// Filters for the user list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilter {
    /// Substring match on username.
    pub username: Option<String>,
    /// Substring match on phone.
    pub phone: Option<String>,
    /// Exact status.
    pub status: Option<RecordStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId(7),
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            email: Some("alice@example.com".to_string()),
            phone: "555-0100".to_string(),
            real_name: "Alice".to_string(),
            avatar: "a.png".to_string(),
            status: RecordStatus::Disabled,
            last_login_at: None,
            created_by: None,
            updated_by: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_profile_update_touches_only_contact_fields() {
        let mut user = user();
        let profile = UpdateProfile {
            email: "a.smith@example.com".to_string(),
            phone: "555-0199".to_string(),
            real_name: "Alice Smith".to_string(),
        };
        UpdateUser::from(profile).apply(&mut user, Some(UserId(7)));

        assert_eq!(user.email.as_deref(), Some("a.smith@example.com"));
        assert_eq!(user.phone, "555-0199");
        assert_eq!(user.real_name, "Alice Smith");
        assert_eq!(user.avatar, "a.png");
        assert_eq!(user.status, RecordStatus::Disabled);
        assert_eq!(user.updated_by, Some(UserId(7)));
    }

    #[test]
    fn test_blank_profile_email_clears_it() {
        let mut user = user();
        let profile = UpdateProfile {
            email: "  ".to_string(),
            ..UpdateProfile::default()
        };
        UpdateUser::from(profile).apply(&mut user, Some(UserId(7)));

        assert_eq!(user.email, None);
        assert_eq!(user.phone, "");
    }
}
