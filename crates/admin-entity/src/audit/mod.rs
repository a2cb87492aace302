//! Access log entities.

pub mod model;

pub use model::{AccessLog, AccessLogFilter, CreateAccessLog};
