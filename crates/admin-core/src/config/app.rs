//! `[server]` and `[server.cors]` sections.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind, `0.0.0.0` for all.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Requests running longer than this are answered with 408.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Cross-origin policy for the admin console.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port`, as accepted by `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whole-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Which browser origins may call the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API. `"*"` anywhere in the list allows all.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Methods allowed on cross-origin requests.
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,
    /// How long browsers may cache a preflight answer, in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl CorsConfig {
    /// Whether the wildcard origin is configured.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }

    /// Preflight cache lifetime.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allowed_methods: default_allowed_methods(),
            max_age_seconds: default_max_age(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allowed_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
        .map(String::from)
        .to_vec()
}

fn default_max_age() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_origin_detected() {
        let mut cors = CorsConfig::default();
        assert!(cors.allows_any_origin());

        cors.allowed_origins = vec!["https://console.example.com".into()];
        assert!(!cors.allows_any_origin());
    }

    #[test]
    fn test_bind_address() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 9000,
            ..ServerConfig::default()
        };
        assert_eq!(server.bind_address(), "127.0.0.1:9000");
        assert_eq!(server.request_timeout(), Duration::from_secs(30));
    }
}
