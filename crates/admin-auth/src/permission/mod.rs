//! Menu-derived permission sets.
//!
//! A user's permissions are the non-empty `permission` codes found anywhere
//! in the menu tree captured at login.

pub mod resolver;
pub mod tree;

pub use resolver::{has_any, resolve_permissions};
pub use tree::PermissionTree;
