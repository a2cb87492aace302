//! # admin-entity
//!
//! Domain entity models for the admin backend. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod audit;
pub mod dict;
pub mod menu;
pub mod organization;
pub mod role;
pub mod serde_util;
pub mod session;
pub mod status;
pub mod tree;
pub mod user;

pub use status::RecordStatus;
pub use tree::TreeNode;
