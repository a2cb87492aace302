//! Route handlers organized by domain.

pub mod auth;
pub mod dict;
pub mod health;
pub mod log;
pub mod menu;
pub mod organization;
pub mod profile;
pub mod role;
pub mod user;
