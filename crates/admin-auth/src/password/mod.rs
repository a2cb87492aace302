//! Password hashing capability.

pub mod hasher;

pub use hasher::{Argon2PasswordHasher, PasswordHasher};
