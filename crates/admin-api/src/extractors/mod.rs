//! Custom Axum extractors.

pub mod auth;
pub mod pagination;

pub use auth::{AuthUser, client_ip};
pub use pagination::PaginationParams;
