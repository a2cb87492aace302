//! Menu tree management and per-user menu resolution.

pub mod service;

pub use service::MenuService;
