//! Session cache backend configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which store holds whitelist entries and renewal locks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local moka cache. Sessions do not survive restarts and are
    /// not shared between instances.
    #[default]
    Memory,
    /// Shared Redis server.
    Redis,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Redis => "redis",
        })
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Selected backend.
    #[serde(default)]
    pub provider: CacheBackend,
    /// Settings used when `provider = "redis"`.
    #[serde(default)]
    pub redis: RedisCacheConfig,
    /// Settings used when `provider = "memory"`.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

/// `[cache.redis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Connection URL, e.g. `redis://:password@host:6379/0`.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Namespace prepended to every key so several deployments can share a
    /// server.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Per-command deadline in milliseconds.
    #[serde(default = "default_response_timeout")]
    pub response_timeout_ms: u64,
}

impl RedisCacheConfig {
    /// Per-command deadline.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
            response_timeout_ms: default_response_timeout(),
        }
    }
}

/// `[cache.memory]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Upper bound on live entries. Each session uses one entry, plus one
    /// more while it is being renewed.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "admin:".to_string()
}

fn default_response_timeout() -> u64 {
    2000
}

fn default_max_capacity() -> u64 {
    100_000
}
