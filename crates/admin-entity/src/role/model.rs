//! Role entity model.

use admin_core::types::RoleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::RecordStatus;

/// A named bundle of menu permissions granted to users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: RoleId,
    /// Display name.
    pub name: String,
    /// Unique role code.
    pub code: String,
    /// Description.
    pub description: String,
    /// Enable/disable flag.
    pub status: RecordStatus,
    /// Ordering key.
    pub sort: i32,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Data required to create a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    /// Display name.
    pub name: String,
    /// Unique role code.
    pub code: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Ordering key.
    #[serde(default)]
    pub sort: i32,
}

impl CreateRole {
    /// Build a row with the given id.
    pub fn into_row(self, id: RoleId) -> Role {
        let now = Utc::now();
        Role {
            id,
            name: self.name,
            code: self.code,
            description: self.description,
            status: self.status,
            sort: self.sort,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRole {
    /// New name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<RecordStatus>,
    /// New ordering key.
    pub sort: Option<i32>,
}

impl UpdateRole {
    /// Apply every present field to `role`.
    pub fn apply(self, role: &mut Role) {
        if let Some(name) = self.name {
            role.name = name;
        }
        if let Some(code) = self.code {
            role.code = code;
        }
        if let Some(description) = self.description {
            role.description = description;
        }
        if let Some(status) = self.status {
            role.status = status;
        }
        if let Some(sort) = self.sort {
            role.sort = sort;
        }
        role.updated_at = Utc::now();
    }
}
