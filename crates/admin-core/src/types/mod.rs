//! Core type definitions used across the admin workspace.

pub mod id;
pub mod pagination;
pub mod path;

pub use id::*;
pub use pagination::{PageRequest, PageResponse};
