//! # admin-auth
//!
//! Credential issuance and verification for the admin backend.
//!
//! ## Modules
//!
//! - `jwt` - HS256 token encoding and decoding
//! - `password` - opaque password hashing capability with an Argon2id implementation
//! - `permission` - menu arena and permission-set resolution
//! - `session` - whitelist store and the token session authority (issue, authenticate, renew, revoke, authorize)

pub mod jwt;
pub mod password;
pub mod permission;
pub mod session;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use permission::{PermissionTree, has_any, resolve_permissions};
pub use session::{AuthSession, Authenticated, IssuedToken, TokenSessionAuthority, WhitelistStore};
