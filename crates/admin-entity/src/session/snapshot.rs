//! Permission-bearing menu tree stored with every live session.

use admin_core::types::MenuId;
use serde::{Deserialize, Serialize};

/// One node of the menu tree captured at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSnapshot {
    /// Menu id.
    pub id: MenuId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Frontend route path.
    #[serde(default)]
    pub route: String,
    /// Permission code, if the node carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    /// Sibling ordering key.
    #[serde(default)]
    pub sort: i32,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<MenuSnapshot>,
}
