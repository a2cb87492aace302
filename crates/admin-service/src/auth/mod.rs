//! Login, logout, and the current user's profile.

pub(crate) mod credentials;
pub mod service;

pub use service::{AuthService, LoginResult, UserProfile};
