//! Token and session configuration.

use serde::{Deserialize, Serialize};

/// Shipped signing secret. Startup refuses to run with it.
pub const PLACEHOLDER_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Full validity of a freshly issued token, in hours.
    #[serde(default = "default_lifetime_hours")]
    pub token_lifetime_hours: u64,
    /// Renew a token once its remaining validity drops to this many seconds.
    #[serde(default = "default_refresh_ahead")]
    pub refresh_ahead_seconds: u64,
    /// TTL of the per-token renewal lock.
    #[serde(default = "default_renewal_lock")]
    pub renewal_lock_seconds: u64,
    /// Clock skew tolerated when validating `exp`/`nbf`.
    #[serde(default)]
    pub leeway_seconds: u64,
    /// Whether the menu snapshot is also embedded in the signed claims.
    #[serde(default)]
    pub embed_menus_in_token: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_lifetime_hours: default_lifetime_hours(),
            refresh_ahead_seconds: default_refresh_ahead(),
            renewal_lock_seconds: default_renewal_lock(),
            leeway_seconds: 0,
            embed_menus_in_token: false,
        }
    }
}

impl AuthConfig {
    /// Token lifetime expressed in seconds.
    pub fn token_lifetime_seconds(&self) -> u64 {
        self.token_lifetime_hours * 3600
    }
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_lifetime_hours() -> u64 {
    24
}

fn default_refresh_ahead() -> u64 {
    900
}

fn default_renewal_lock() -> u64 {
    30
}
