//! Redis-backed [`CacheProvider`].

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use admin_core::error::AppError;
use admin_core::result::AppResult;
use admin_core::traits::CacheProvider;

use super::client::RedisClient;

/// Shared session store for multi-instance deployments.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

impl RedisCacheProvider {
    /// Wraps a connected client.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

/// `PX` argument. Redis rejects zero, so sub-millisecond TTLs round up.
fn px(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.client.run(conn.get(&key)).await
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.client.run(conn.pset_ex(&key, value, px(ttl))).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _removed: u64 = self.client.run(conn.del(&key)).await?;
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        // SET key value PX ttl NX replies OK on success and nil otherwise.
        let reply: Option<String> = self
            .client
            .run(
                redis::cmd("SET")
                    .arg(&key)
                    .arg(value)
                    .arg("PX")
                    .arg(px(ttl))
                    .arg("NX")
                    .query_async(&mut conn),
            )
            .await?;
        Ok(reply.is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let pong: String = self
            .client
            .run(redis::cmd("PING").query_async(&mut conn))
            .await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(AppError::cache(format!("Unexpected PING reply: {pong}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_never_zero() {
        assert_eq!(px(Duration::ZERO), 1);
        assert_eq!(px(Duration::from_micros(300)), 1);
        assert_eq!(px(Duration::from_secs(2)), 2000);
    }
}
