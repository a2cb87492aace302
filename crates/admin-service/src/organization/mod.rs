//! Organization tree management.

pub mod service;

pub use service::OrganizationService;
