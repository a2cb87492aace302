//! Organization entity model.

use admin_core::traits::HierarchyNode;
use admin_core::types::{OrganizationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::RecordStatus;

/// A department or unit in the organization tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Unique business code.
    pub code: String,
    /// Parent organization, `None` for roots.
    pub parent_id: Option<OrganizationId>,
    /// Materialized ancestor path ending in this id, e.g. `"1/2/3"`.
    pub path: String,
    /// Sibling ordering key.
    pub sort: i32,
    /// Enable/disable flag.
    pub status: RecordStatus,
    /// Free-form description.
    pub description: String,
    /// Creator.
    pub created_by: Option<UserId>,
    /// Last editor.
    pub updated_by: Option<UserId>,
    /// Who soft-deleted the row.
    pub deleted_by: Option<UserId>,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
    /// When the organization was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl HierarchyNode for Organization {
    type Id = OrganizationId;

    const KIND: &'static str = "organization";

    fn id(&self) -> OrganizationId {
        self.id
    }

    fn set_id(&mut self, id: OrganizationId) {
        self.id = id;
    }

    fn parent_id(&self) -> Option<OrganizationId> {
        self.parent_id
    }

    fn set_parent_id(&mut self, parent_id: Option<OrganizationId>) {
        self.parent_id = parent_id;
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn set_path(&mut self, path: String) {
        self.path = path;
    }

    fn sort(&self) -> i32 {
        self.sort
    }
}

/// Data required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    /// Display name.
    pub name: String,
    /// Unique business code.
    pub code: String,
    /// Parent organization.
    pub parent_id: Option<OrganizationId>,
    /// Sibling ordering key.
    #[serde(default)]
    pub sort: i32,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl CreateOrganization {
    /// Build an unsaved row; id and path are assigned by the hierarchy manager.
    pub fn into_row(self, actor: Option<UserId>) -> Organization {
        let now = Utc::now();
        Organization {
            id: OrganizationId(0),
            name: self.name,
            code: self.code,
            parent_id: self.parent_id,
            path: String::new(),
            sort: self.sort,
            status: self.status,
            description: self.description,
            created_by: actor,
            updated_by: actor,
            deleted_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of an organization. `parent_id` moves the node when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrganization {
    /// New name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// New parent. `Some(None)` moves the node to the root level.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::serde_util::double_option"
    )]
    pub parent_id: Option<Option<OrganizationId>>,
    /// New sort key.
    pub sort: Option<i32>,
    /// New status.
    pub status: Option<RecordStatus>,
    /// New description.
    pub description: Option<String>,
}

impl UpdateOrganization {
    /// Apply every present field to `org`.
    pub fn apply(self, org: &mut Organization, actor: Option<UserId>) {
        if let Some(name) = self.name {
            org.name = name;
        }
        if let Some(code) = self.code {
            org.code = code;
        }
        if let Some(parent_id) = self.parent_id {
            org.parent_id = parent_id;
        }
        if let Some(sort) = self.sort {
            org.sort = sort;
        }
        if let Some(status) = self.status {
            org.status = status;
        }
        if let Some(description) = self.description {
            org.description = description;
        }
        org.updated_by = actor;
        org.updated_at = Utc::now();
    }
}
