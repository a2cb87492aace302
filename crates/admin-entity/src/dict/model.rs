//! Dictionary type and item models.

use admin_core::types::{DictItemId, DictTypeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::RecordStatus;

/// A named set of enumerated values, addressed by code.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DictType {
    /// Unique identifier.
    pub id: DictTypeId,
    /// Display name.
    pub name: String,
    /// Unique lookup code.
    pub code: String,
    /// Enable/disable flag.
    pub status: RecordStatus,
    /// Description.
    pub description: String,
    /// When the type was created.
    pub created_at: DateTime<Utc>,
    /// When the type was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One label/value pair of a dictionary type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DictItem {
    /// Unique identifier.
    pub id: DictItemId,
    /// Owning dictionary type.
    pub dict_type_id: DictTypeId,
    /// Display label.
    pub label: String,
    /// Stored value.
    pub value: String,
    /// Ordering key.
    pub sort: i32,
    /// Enable/disable flag.
    pub status: RecordStatus,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Data required to create a dictionary type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDictType {
    /// Display name.
    pub name: String,
    /// Unique lookup code.
    pub code: String,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl CreateDictType {
    /// Build a row with the given id.
    pub fn into_row(self, id: DictTypeId) -> DictType {
        let now = Utc::now();
        DictType {
            id,
            name: self.name,
            code: self.code,
            status: self.status,
            description: self.description,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of a dictionary type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDictType {
    /// New name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// New status.
    pub status: Option<RecordStatus>,
    /// New description.
    pub description: Option<String>,
}

impl UpdateDictType {
    /// Apply every present field to `dict`.
    pub fn apply(self, dict: &mut DictType) {
        if let Some(name) = self.name {
            dict.name = name;
        }
        if let Some(code) = self.code {
            dict.code = code;
        }
        if let Some(status) = self.status {
            dict.status = status;
        }
        if let Some(description) = self.description {
            dict.description = description;
        }
        dict.updated_at = Utc::now();
    }
}

/// Data required to create a dictionary item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDictItem {
    /// Display label.
    pub label: String,
    /// Stored value.
    pub value: String,
    /// Ordering key.
    #[serde(default)]
    pub sort: i32,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
}

impl CreateDictItem {
    /// Build a row with the given ids.
    pub fn into_row(self, id: DictItemId, dict_type_id: DictTypeId) -> DictItem {
        let now = Utc::now();
        DictItem {
            id,
            dict_type_id,
            label: self.label,
            value: self.value,
            sort: self.sort,
            status: self.status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of a dictionary item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDictItem {
    /// New label.
    pub label: Option<String>,
    /// New value.
    pub value: Option<String>,
    /// New ordering key.
    pub sort: Option<i32>,
    /// New status.
    pub status: Option<RecordStatus>,
}

impl UpdateDictItem {
    /// Apply every present field to `item`.
    pub fn apply(self, item: &mut DictItem) {
        if let Some(label) = self.label {
            item.label = label;
        }
        if let Some(value) = self.value {
            item.value = value;
        }
        if let Some(sort) = self.sort {
            item.sort = sort;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        item.updated_at = Utc::now();
    }
}
