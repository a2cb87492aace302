//! Axum middleware stack.

pub mod auth;
pub mod compression;
pub mod cors;
pub mod logging;
pub mod rbac;

pub use auth::{REFRESH_TOKEN_HEADER, bearer_token, require_auth};
pub use logging::record_access;
pub use rbac::{PermissionGuard, require_permissions};
