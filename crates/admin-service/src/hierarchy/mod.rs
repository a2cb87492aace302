//! Materialized-path maintenance for tree-shaped entities.

pub mod manager;
pub mod tree;

#[cfg(test)]
pub(crate) mod memory;

pub use manager::HierarchyManager;
pub use tree::build_tree;
