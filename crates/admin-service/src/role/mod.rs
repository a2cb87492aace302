//! Role management and grants.

pub mod service;

pub use service::RoleService;
