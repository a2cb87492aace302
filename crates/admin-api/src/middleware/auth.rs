//! Token authentication middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use admin_auth::{Authenticated, TokenSessionAuthority};

use crate::error::ApiError;

/// Response header carrying a renewed token.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// Any other scheme counts as no credential at all.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Authenticates the request and stores the typed `AuthSession` in its
/// extensions.
///
/// When the token was close to expiry, the successor is returned to the
/// client in the `X-Refresh-Token` header. The request itself still runs as
/// the same user.
pub async fn require_auth(
    State(authority): State<Arc<TokenSessionAuthority>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).map(str::to_owned);

    let Authenticated {
        mut session,
        renewed,
    } = authority.authenticate(token.as_deref()).await?;
    debug!(user_id = %session.user_id, path = %request.uri().path(), "Request authenticated");

    // Renewal deleted the presented token's entry; logout must address the
    // successor. Guards check the permission snapshot instead.
    if let Some(issued) = &renewed {
        session.token = issued.token.clone();
        session.expires_at = issued.expires_at;
    }
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;

    if let Some(issued) = renewed {
        match HeaderValue::from_str(&issued.token) {
            Ok(value) => {
                response.headers_mut().insert(REFRESH_TOKEN_HEADER, value);
            }
            Err(e) => warn!(error = %e, "Renewed token is not a valid header value"),
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use axum::{Extension, middleware};
    use chrono::Utc;
    use tower::ServiceExt;

    use admin_auth::AuthSession;
    use admin_cache::CacheManager;
    use admin_core::config::AuthConfig;
    use admin_core::id::ManualClock;
    use admin_core::types::UserId;

    use super::*;

    fn authority() -> (Arc<TokenSessionAuthority>, Arc<ManualClock>) {
        let config = AuthConfig {
            jwt_secret: "middleware-secret-0123456789".to_string(),
            ..AuthConfig::default()
        };
        let clock = Arc::new(ManualClock::new(Utc::now().timestamp_millis()));
        let authority = TokenSessionAuthority::with_clock(
            &config,
            Arc::new(CacheManager::in_memory()),
            clock.clone(),
        );
        (Arc::new(authority), clock)
    }

    async fn whoami(Extension(session): Extension<AuthSession>) -> String {
        session.username
    }

    fn app(authority: Arc<TokenSessionAuthority>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(authority, require_auth))
    }

    fn request(token: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/whoami");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer a.b.c"));
        assert_eq!(bearer_token(&headers), Some("a.b.c"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (authority, _) = authority();
        let response = app(authority).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (authority, _) = authority();
        let response = app(authority)
            .oneshot(request(Some("not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let (authority, _) = authority();
        let issued = authority.issue(UserId(42), "carol", vec![]).await.unwrap();

        let response = app(authority)
            .oneshot(request(Some(&issued.token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(REFRESH_TOKEN_HEADER).is_none());

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"carol");
    }

    #[tokio::test]
    async fn test_revoked_token_is_unauthorized() {
        let (authority, _) = authority();
        let issued = authority.issue(UserId(42), "carol", vec![]).await.unwrap();
        authority.revoke(&issued.token).await.unwrap();

        let response = app(authority)
            .oneshot(request(Some(&issued.token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_near_expiry_token_gets_refresh_header() {
        let (authority, clock) = authority();
        let issued = authority.issue(UserId(42), "carol", vec![]).await.unwrap();
        clock.advance((24 * 3600 - 100) * 1000);

        let response = app(authority.clone())
            .oneshot(request(Some(&issued.token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let renewed = response
            .headers()
            .get(REFRESH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .expect("refresh header");
        assert_ne!(renewed, issued.token);
        assert!(authority.authenticate(Some(&renewed)).await.is_ok());
    }
}
