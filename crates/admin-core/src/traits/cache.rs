//! Expiring key-value store behind the session whitelist.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;

/// A string-valued store where every entry carries its own TTL.
///
/// Implementations must report backend failures as errors. A read that
/// fails is never the same as a key that is absent.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Value stored under `key`, or `None` once it is gone or expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value`, replacing any previous entry and its TTL.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Drop `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Store `value` only when `key` is absent, as one atomic step.
    ///
    /// Returns `true` for the single caller whose write landed.
    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Round-trip to the backend.
    async fn ping(&self) -> AppResult<()>;

    /// [`get`](Self::get) followed by JSON decoding.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        self.get(key)
            .await?
            .map(|raw| serde_json::from_str(&raw).map_err(Into::into))
            .transpose()
    }

    /// JSON encoding followed by [`put`](Self::put).
    async fn put_json<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.put(key, &raw, ttl).await
    }
}
