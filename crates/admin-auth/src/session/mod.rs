//! Token sessions backed by the cache whitelist.

pub mod authority;
pub mod whitelist;

pub use authority::{AuthSession, Authenticated, IssuedToken, TokenSessionAuthority};
pub use whitelist::WhitelistStore;
