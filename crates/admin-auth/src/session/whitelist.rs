//! Whitelist and renewal-lock storage on top of the cache.

use std::sync::Arc;
use std::time::Duration;

use admin_cache::keys;
use admin_cache::provider::CacheManager;
use admin_core::result::AppResult;
use admin_core::traits::CacheProvider;
use admin_entity::session::WhitelistEntry;

/// Typed access to `jwt:whitelist:*` and `jwt:renew:*` keys.
#[derive(Debug, Clone)]
pub struct WhitelistStore {
    cache: Arc<CacheManager>,
}

impl WhitelistStore {
    /// Creates a store over the given cache.
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }

    /// Loads the entry of a live token. Cache failures are returned, never
    /// folded into "absent".
    pub async fn get(&self, token: &str) -> AppResult<Option<WhitelistEntry>> {
        self.cache.get_json(&keys::whitelist(token)).await
    }

    /// Writes the entry for `token`, expiring after `ttl`.
    pub async fn put(&self, token: &str, entry: &WhitelistEntry, ttl: Duration) -> AppResult<()> {
        self.cache
            .put_json(&keys::whitelist(token), entry, ttl.max(Duration::from_secs(1)))
            .await
    }

    /// Drops the entry for `token`.
    pub async fn remove(&self, token: &str) -> AppResult<()> {
        self.cache.remove(&keys::whitelist(token)).await
    }

    /// Tries to become the single renewer of `old`, recording `successor`.
    pub async fn claim_renewal(&self, old: &str, successor: &str, ttl: Duration) -> AppResult<bool> {
        self.cache
            .put_if_absent(&keys::renewal_lock(old), successor, ttl)
            .await
    }

    /// Successor token recorded by whoever renewed `old`.
    pub async fn renewal_successor(&self, old: &str) -> AppResult<Option<String>> {
        self.cache.get(&keys::renewal_lock(old)).await
    }

    /// Releases the renewal lock of `old` after a failed migration.
    pub async fn release_renewal(&self, old: &str) -> AppResult<()> {
        self.cache.remove(&keys::renewal_lock(old)).await
    }
}
