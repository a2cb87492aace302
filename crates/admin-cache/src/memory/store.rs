//! moka-backed [`CacheProvider`] for single-instance deployments and tests.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use admin_core::config::MemoryCacheConfig;
use admin_core::result::AppResult;
use admin_core::traits::CacheProvider;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Every write restarts the entry's clock with the TTL it carries.
struct WriteTtl;

impl Expiry<String, Entry> for WriteTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Process-local session store.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    entries: Cache<String, Entry>,
}

impl MemoryCacheProvider {
    /// Builds an empty store bounded by `config.max_capacity` entries.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let entries = Cache::builder()
            .name("session-whitelist")
            .max_capacity(config.max_capacity)
            .expire_after(WriteTtl)
            .build();
        Self { entries }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).await.map(|e| e.value))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let entry = Entry {
            value: value.to_owned(),
            ttl,
        };
        self.entries.insert(key.to_owned(), entry).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.invalidate(key).await;
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(async {
                Entry {
                    value: value.to_owned(),
                    ttl,
                }
            })
            .await;
        let won = entry.is_fresh();
        debug!(key, won, "Conditional insert");
        Ok(won)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn store() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })
    }

    #[tokio::test]
    async fn test_put_then_remove() {
        let store = store();
        store
            .put("jwt:whitelist:a", "entry", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.get("jwt:whitelist:a").await.unwrap().as_deref(),
            Some("entry")
        );

        store.remove("jwt:whitelist:a").await.unwrap();
        assert_eq!(store.get("jwt:whitelist:a").await.unwrap(), None);
        store.remove("jwt:whitelist:a").await.unwrap();
    }

    #[tokio::test]
    async fn test_entries_expire_with_their_own_ttl() {
        let store = store();
        store
            .put("short", "a", Duration::from_millis(50))
            .await
            .unwrap();
        store.put("long", "b", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("long").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_rewrite_replaces_ttl() {
        let store = store();
        store.put("k", "old", Duration::from_millis(50)).await.unwrap();
        store.put("k", "new", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_put_if_absent_keeps_first_value() {
        let store = store();
        let ttl = Duration::from_secs(60);
        assert!(store.put_if_absent("jwt:renew:t", "s1", ttl).await.unwrap());
        assert!(!store.put_if_absent("jwt:renew:t", "s2", ttl).await.unwrap());
        assert_eq!(store.get("jwt:renew:t").await.unwrap().as_deref(), Some("s1"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_put_if_absent_has_exactly_one_winner() {
        let store = Arc::new(store());
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .put_if_absent("lock", &i.to_string(), Duration::from_secs(60))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let store = store();
        let data = serde_json::json!({"user_id": "42", "username": "alice"});
        store
            .put_json("json_key", &data, Duration::from_secs(60))
            .await
            .unwrap();
        let back: Option<serde_json::Value> = store.get_json("json_key").await.unwrap();
        assert_eq!(back, Some(data));

        let missing: Option<serde_json::Value> = store.get_json("nope").await.unwrap();
        assert!(missing.is_none());
    }
}
