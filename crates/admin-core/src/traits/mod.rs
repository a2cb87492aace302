//! Core traits defined in `admin-core` and implemented by other crates.

pub mod cache;
pub mod hierarchy;

pub use cache::CacheProvider;
pub use hierarchy::{HierarchyNode, HierarchyRepository};
