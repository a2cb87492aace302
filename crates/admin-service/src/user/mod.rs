//! User account management.

pub mod service;

pub use service::{ChangePasswordRequest, UserService};
