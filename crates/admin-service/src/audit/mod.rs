//! Access log recording and queries.

pub mod service;

pub use service::AccessLogService;
