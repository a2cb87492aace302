//! Dictionary management.

pub mod service;

pub use service::{DictService, DictWithItems};
