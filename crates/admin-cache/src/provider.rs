//! [`CacheManager`]: the configured backend behind one cloneable handle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use admin_core::config::{CacheBackend, CacheConfig};
use admin_core::error::AppError;
use admin_core::result::AppResult;
use admin_core::traits::CacheProvider;

/// Session store handle shared by the token authority and health checks.
#[derive(Debug, Clone)]
pub struct CacheManager {
    backend: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Connects to the backend selected by `config.provider`.
    pub async fn new(config: &CacheConfig) -> AppResult<Self> {
        info!(backend = %config.provider, "Opening session cache");
        let backend: Arc<dyn CacheProvider> = match config.provider {
            #[cfg(feature = "memory")]
            CacheBackend::Memory => Arc::new(crate::memory::MemoryCacheProvider::new(&config.memory)),
            #[cfg(feature = "redis-backend")]
            CacheBackend::Redis => {
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisCacheProvider::new(client))
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(AppError::configuration(format!(
                    "Cache backend '{other}' is not compiled into this build"
                )));
            }
        };
        Ok(Self { backend })
    }

    /// Wraps an arbitrary provider, e.g. a failing one in tests.
    pub fn from_provider(backend: Arc<dyn CacheProvider>) -> Self {
        Self { backend }
    }

    /// Empty moka store with default capacity.
    #[cfg(feature = "memory")]
    pub fn in_memory() -> Self {
        Self::from_provider(Arc::new(crate::memory::MemoryCacheProvider::new(
            &Default::default(),
        )))
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.backend.get(key).await
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.backend.put(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.backend.remove(key).await
    }

    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.backend.put_if_absent(key, value, ttl).await
    }

    async fn ping(&self) -> AppResult<()> {
        self.backend.ping().await
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_selected_by_default() {
        let manager = CacheManager::new(&CacheConfig::default()).await.unwrap();
        manager.put("k", "v", Duration::from_secs(5)).await.unwrap();
        assert_eq!(manager.get("k").await.unwrap().as_deref(), Some("v"));
        manager.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_handles_share_nothing() {
        let a = CacheManager::in_memory();
        let b = CacheManager::in_memory();
        a.put("k", "v", Duration::from_secs(5)).await.unwrap();
        assert!(b.get("k").await.unwrap().is_none());
        assert_eq!(a.clone().get("k").await.unwrap().as_deref(), Some("v"));
    }
}
