//! Cache key builders for all admin cache entries.

/// Prefix of whitelist entries, one per live token.
pub const WHITELIST_PREFIX: &str = "jwt:whitelist:";

/// Prefix of renewal locks, one per token being renewed.
pub const RENEWAL_LOCK_PREFIX: &str = "jwt:renew:";

/// Cache key of the whitelist entry for `token`.
pub fn whitelist(token: &str) -> String {
    format!("{WHITELIST_PREFIX}{token}")
}

/// Cache key of the renewal lock for `token`.
pub fn renewal_lock(token: &str) -> String {
    format!("{RENEWAL_LOCK_PREFIX}{token}")
}
