//! # admin-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations for all admin entities. The organization and menu
//! repositories implement the core `HierarchyRepository` capability.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
