//! JWT token creation with configurable signing and lifetime.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use admin_core::config::AuthConfig;
use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;
use admin_core::types::UserId;
use admin_entity::session::MenuSnapshot;

use super::claims::Claims;

/// Creates signed HS256 session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token lifetime in seconds.
    lifetime_seconds: i64,
    /// Whether the menu snapshot goes into the claims.
    embed_menus: bool,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("lifetime_seconds", &self.lifetime_seconds)
            .field("embed_menus", &self.embed_menus)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            lifetime_seconds: config.token_lifetime_seconds() as i64,
            embed_menus: config.embed_menus_in_token,
        }
    }

    /// Full lifetime of a fresh token in seconds.
    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime_seconds
    }

    /// Mints a token valid from `now_secs` for the configured lifetime.
    pub fn encode(
        &self,
        user_id: UserId,
        username: &str,
        menus: &[MenuSnapshot],
        now_secs: i64,
    ) -> AppResult<(String, Claims)> {
        let claims = Claims {
            user_id: user_id.0,
            username: username.to_string(),
            iat: now_secs,
            nbf: now_secs,
            exp: now_secs + self.lifetime_seconds,
            jti: Uuid::new_v4(),
            menus: self.embed_menus.then(|| menus.to_vec()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to encode session token", e)
            })?;

        Ok((token, claims))
    }
}
