//! Menu entity model.

use admin_core::traits::HierarchyNode;
use admin_core::types::{MenuId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::MenuKind;
use crate::status::RecordStatus;

/// A node of the navigation tree. Buttons carry the fine-grained
/// permission codes checked by route guards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Menu {
    /// Unique menu identifier.
    pub id: MenuId,
    /// Display name.
    pub name: String,
    /// Parent menu, `None` for roots.
    pub parent_id: Option<MenuId>,
    /// Materialized ancestor path ending in this id.
    pub path: String,
    /// Frontend component to render.
    pub component: String,
    /// Icon name.
    pub icon: String,
    /// Menu or button.
    pub kind: MenuKind,
    /// Sibling ordering key.
    pub sort: i32,
    /// Enable/disable flag.
    pub status: RecordStatus,
    /// Permission code such as `"user:read"`.
    pub permission: Option<String>,
    /// Frontend route path.
    pub route: String,
    /// Hidden from the navigation sidebar.
    pub hidden: bool,
    /// Keep the page component alive between visits.
    pub keep_alive: bool,
    /// When the menu was created.
    pub created_at: DateTime<Utc>,
    /// When the menu was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Who soft-deleted the row.
    #[serde(skip_serializing)]
    pub deleted_by: Option<UserId>,
}

impl Menu {
    /// The trimmed permission code, if any.
    pub fn permission_code(&self) -> Option<&str> {
        self.permission
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

impl HierarchyNode for Menu {
    type Id = MenuId;

    const KIND: &'static str = "menu";

    fn id(&self) -> MenuId {
        self.id
    }

    fn set_id(&mut self, id: MenuId) {
        self.id = id;
    }

    fn parent_id(&self) -> Option<MenuId> {
        self.parent_id
    }

    fn set_parent_id(&mut self, parent_id: Option<MenuId>) {
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

/// Data required to create a new menu node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMenu {
    /// Display name.
    pub name: String,
    /// Parent menu.
    pub parent_id: Option<MenuId>,
    /// Frontend component.
    #[serde(default)]
    pub component: String,
    /// Icon name.
    #[serde(default)]
    pub icon: String,
    /// Menu or button.
    #[serde(default)]
    pub kind: MenuKind,
    /// Sibling ordering key.
    #[serde(default)]
    pub sort: i32,
    /// Initial status.
    #[serde(default)]
    pub status: RecordStatus,
    /// Permission code.
    pub permission: Option<String>,
    /// Frontend route path.
    #[serde(default)]
    pub route: String,
    /// Hidden from navigation.
    #[serde(default)]
    pub hidden: bool,
    /// Keep alive.
    #[serde(default)]
    pub keep_alive: bool,
}

impl CreateMenu {
    /// Build an unsaved row; id and path are assigned by the hierarchy manager.
    pub fn into_row(self) -> Menu {
        let now = Utc::now();
        Menu {
            id: MenuId(0),
            name: self.name,
            parent_id: self.parent_id,
            path: String::new(),
            component: self.component,
            icon: self.icon,
            kind: self.kind,
            sort: self.sort,
            status: self.status,
            permission: self.permission.map(|p| p.trim().to_string()),
            route: self.route,
            hidden: self.hidden,
            keep_alive: self.keep_alive,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted_by: None,
        }
    }
}

/// Partial update of a menu node. `parent_id` moves the node when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMenu {
    /// New name.
    pub name: Option<String>,
    /// New parent. `Some(None)` moves the node to the root level.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::serde_util::double_option"
    )]
    pub parent_id: Option<Option<MenuId>>,
    /// New component.
    pub component: Option<String>,
    /// New icon.
    pub icon: Option<String>,
    /// New kind.
    pub kind: Option<MenuKind>,
    /// New sort key.
    pub sort: Option<i32>,
    /// New status.
    pub status: Option<RecordStatus>,
    /// New permission code. An empty string clears it.
    pub permission: Option<String>,
    /// New route.
    pub route: Option<String>,
    /// New hidden flag.
    pub hidden: Option<bool>,
    /// New keep-alive flag.
    pub keep_alive: Option<bool>,
}

impl UpdateMenu {
    /// Apply every present field to `menu`.
    pub fn apply(self, menu: &mut Menu) {
        if let Some(name) = self.name {
            menu.name = name;
        }
        if let Some(parent_id) = self.parent_id {
            menu.parent_id = parent_id;
        }
        if let Some(component) = self.component {
            menu.component = component;
        }
        if let Some(icon) = self.icon {
            menu.icon = icon;
        }
        if let Some(kind) = self.kind {
            menu.kind = kind;
        }
        if let Some(sort) = self.sort {
            menu.sort = sort;
        }
        if let Some(status) = self.status {
            menu.status = status;
        }
        if let Some(permission) = self.permission {
            let trimmed = permission.trim();
            menu.permission = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(route) = self.route {
            menu.route = route;
        }
        if let Some(hidden) = self.hidden {
            menu.hidden = hidden;
        }
        if let Some(keep_alive) = self.keep_alive {
            menu.keep_alive = keep_alive;
        }
        menu.updated_at = Utc::now();
    }
}
