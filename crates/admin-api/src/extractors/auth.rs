//! `AuthUser` extractor: the session placed by `require_auth` plus request metadata.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};

use admin_auth::AuthSession;
use admin_core::error::AppError;
use admin_service::RequestContext;

use crate::error::ApiError;

/// Authenticated caller, available to handlers behind `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The verified session.
    pub session: AuthSession,
    /// Context handed to services.
    pub context: RequestContext,
}

impl AuthUser {
    /// Returns the service-level request context.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .ok_or_else(|| AppError::missing_credential("Route is not behind authentication"))?;

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let context = RequestContext::from_session(&session, client_ip(&parts.headers), user_agent);

        Ok(Self { session, context })
    }
}

/// Best-effort client address: first `X-Forwarded-For` hop, then `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(client_ip(&headers), "10.0.0.9");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }
}
