//! JWT structure checks and signature verification.

use std::collections::HashSet;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use admin_core::config::AuthConfig;
use admin_core::error::AppError;
use admin_core::result::AppResult;

use super::claims::Claims;

/// Validates session tokens.
///
/// Time-based claims are checked against the caller's clock rather than
/// inside `jsonwebtoken`, so the session authority stays testable with a
/// manual clock.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Signature validation configuration.
    validation: Validation,
    /// Tolerated clock skew in seconds.
    leeway: i64,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "nbf".to_string(), "iat".to_string()]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            leeway: config.leeway_seconds as i64,
        }
    }

    /// Rejects anything that is not a three-part compact JWS with a
    /// decodable header.
    pub fn check_structure(&self, token: &str) -> AppResult<()> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(AppError::malformed_credential(
                "Token is not a compact three-part JWS",
            ));
        }
        decode_header(token)
            .map_err(|_| AppError::malformed_credential("Token header cannot be decoded"))?;
        Ok(())
    }

    /// Verifies the signature and decodes the claims without checking time.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidToken
                | JwtErrorKind::Base64(_)
                | JwtErrorKind::Utf8(_) => AppError::malformed_credential("Invalid token format"),
                JwtErrorKind::InvalidSignature => {
                    AppError::invalid_signature("Invalid token signature")
                }
                _ => AppError::invalid_signature(format!("Token validation failed: {e}")),
            })
    }

    /// Checks `nbf` and `exp` against `now_secs`, allowing the configured leeway.
    pub fn check_times(&self, claims: &Claims, now_secs: i64) -> AppResult<()> {
        if claims.nbf > now_secs + self.leeway {
            return Err(AppError::invalid_signature("Token is not valid yet"));
        }
        if claims.exp + self.leeway <= now_secs {
            return Err(AppError::revoked_or_expired("Token has expired"));
        }
        Ok(())
    }

    /// Full verification: signature followed by time checks.
    pub fn decode(&self, token: &str, now_secs: i64) -> AppResult<Claims> {
        let claims = self.verify(token)?;
        self.check_times(&claims, now_secs)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use admin_core::error::ErrorKind;
    use admin_core::types::UserId;
    use chrono::Utc;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_roundtrip_claims() {
        let cfg = config("0123456789abcdef0123");
        let now = Utc::now().timestamp();
        let (token, claims) = JwtEncoder::new(&cfg)
            .encode(UserId(42), "alice", &[], now)
            .unwrap();
        let decoded = JwtDecoder::new(&cfg).decode(&token, now).unwrap();
        assert_eq!(decoded.user_id, 42);
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.exp, now + 24 * 3600);
        assert!(decoded.menus.is_none());
    }

    #[test]
    fn test_structure_checks() {
        let decoder = JwtDecoder::new(&config("0123456789abcdef0123"));
        for bad in ["", "abc", "a.b", "a..c", "a.b.c.d", "!!!.b.c"] {
            let err = decoder.check_structure(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::MalformedCredential, "input {bad:?}");
        }
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let now = Utc::now().timestamp();
        let (token, _) = JwtEncoder::new(&config("first-secret-0123456"))
            .encode(UserId(1), "bob", &[], now)
            .unwrap();
        let err = JwtDecoder::new(&config("second-secret-012345"))
            .decode(&token, now)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSignature);
    }

    #[test]
    fn test_expired_is_revoked_or_expired() {
        let cfg = config("0123456789abcdef0123");
        let issued = Utc::now().timestamp() - 25 * 3600;
        let (token, _) = JwtEncoder::new(&cfg)
            .encode(UserId(1), "bob", &[], issued)
            .unwrap();
        let err = JwtDecoder::new(&cfg)
            .decode(&token, Utc::now().timestamp())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RevokedOrExpired);
    }

    #[test]
    fn test_leeway_tolerates_skew() {
        let mut cfg = config("0123456789abcdef0123");
        cfg.leeway_seconds = 10;
        let now = Utc::now().timestamp();
        let (token, _) = JwtEncoder::new(&cfg)
            .encode(UserId(1), "bob", &[], now + 5)
            .unwrap();
        assert!(JwtDecoder::new(&cfg).decode(&token, now).is_ok());
    }
}
