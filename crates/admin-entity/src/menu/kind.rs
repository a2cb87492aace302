//! Menu node kind enumeration.

use serde::{Deserialize, Serialize};

/// Whether a menu node renders as a navigable page or an in-page action.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "menu_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MenuKind {
    /// A navigable page or directory.
    #[default]
    Menu,
    /// A button or other action inside a page.
    Button,
}
