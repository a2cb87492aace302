//! # admin-core
//!
//! Core crate for the Siqian admin backend. Contains the unified error
//! system, configuration schemas, typed identifiers, the distributed ID
//! allocator, materialized-path helpers, and the traits implemented by the
//! cache and persistence layers.
//!
//! This crate has **no** internal dependencies on other admin crates.

pub mod config;
pub mod error;
pub mod id;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
