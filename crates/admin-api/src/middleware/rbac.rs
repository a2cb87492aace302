//! Per-route permission guards.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use admin_auth::AuthSession;
use admin_core::error::AppError;

use crate::error::ApiError;

/// The permission codes a route accepts. Holding any one of them is enough.
#[derive(Debug, Clone)]
pub struct PermissionGuard {
    required: &'static [&'static str],
}

impl PermissionGuard {
    /// Creates a guard accepting any of `required`.
    pub fn new(required: &'static [&'static str]) -> Self {
        Self { required }
    }
}

/// Rejects the request with 403 unless the session holds one of the guard's
/// permissions. Must run inside [`require_auth`](super::auth::require_auth),
/// whose session carries the permission set it authenticated with; the
/// whitelist is not read again here.
pub async fn require_permissions(
    State(guard): State<PermissionGuard>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = request
        .extensions()
        .get::<AuthSession>()
        .ok_or_else(|| AppError::missing_credential("No authenticated session on request"))?;

    session.authorize(guard.required)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::middleware;
    use axum::routing::get;
    use chrono::Utc;
    use tower::ServiceExt;

    use admin_cache::CacheManager;
    use admin_core::config::AuthConfig;
    use admin_core::id::ManualClock;
    use admin_core::types::{MenuId, UserId};
    use admin_entity::session::MenuSnapshot;

    use admin_auth::TokenSessionAuthority;

    use super::*;
    use crate::middleware::auth::{REFRESH_TOKEN_HEADER, require_auth};

    fn authority() -> Arc<TokenSessionAuthority> {
        let config = AuthConfig {
            jwt_secret: "guard-secret-0123456789".to_string(),
            ..AuthConfig::default()
        };
        Arc::new(TokenSessionAuthority::new(
            &config,
            Arc::new(CacheManager::in_memory()),
        ))
    }

    fn menu(id: i64, permission: Option<&str>, children: Vec<MenuSnapshot>) -> MenuSnapshot {
        MenuSnapshot {
            id: MenuId(id),
            name: format!("menu-{id}"),
            route: String::new(),
            permission: permission.map(str::to_string),
            sort: 0,
            children,
        }
    }

    fn app(authority: Arc<TokenSessionAuthority>, required: &'static [&'static str]) -> Router {
        let guard = PermissionGuard::new(required);
        Router::new()
            .route(
                "/guarded",
                get(|| async { "ok" })
                    .route_layer(middleware::from_fn_with_state(guard, require_permissions)),
            )
            .route_layer(middleware::from_fn_with_state(authority, require_auth))
    }

    async fn call(app: Router, token: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .uri("/guarded")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_nested_permission_grants_access() {
        let authority = authority();
        let menus = vec![menu(1, None, vec![menu(2, Some("org:read"), vec![])])];
        let issued = authority.issue(UserId(1), "dave", menus).await.unwrap();

        let status = call(app(authority, &["org:read"]), &issued.token).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_any_of_several_codes_is_enough() {
        let authority = authority();
        let menus = vec![menu(1, Some("user:list"), vec![])];
        let issued = authority.issue(UserId(1), "dave", menus).await.unwrap();

        let status = call(app(authority, &["user:read", "user:list"]), &issued.token).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_permission_is_forbidden() {
        let authority = authority();
        let menus = vec![menu(1, Some("org:read"), vec![])];
        let issued = authority.issue(UserId(1), "dave", menus).await.unwrap();

        let status = call(app(authority, &["org:delete"]), &issued.token).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_guard_passes_on_the_request_that_renews() {
        let config = AuthConfig {
            jwt_secret: "guard-secret-0123456789".to_string(),
            ..AuthConfig::default()
        };
        let clock = Arc::new(ManualClock::new(Utc::now().timestamp_millis()));
        let authority = Arc::new(TokenSessionAuthority::with_clock(
            &config,
            Arc::new(CacheManager::in_memory()),
            clock.clone(),
        ));
        let menus = vec![menu(1, Some("org:read"), vec![])];
        let issued = authority.issue(UserId(1), "dave", menus).await.unwrap();
        clock.advance((24 * 3600 - 60) * 1000);

        let request = HttpRequest::builder()
            .uri("/guarded")
            .header("Authorization", format!("Bearer {}", issued.token))
            .body(Body::empty())
            .unwrap();
        let response = app(authority, &["org:read"]).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REFRESH_TOKEN_HEADER));
    }

    #[tokio::test]
    async fn test_guard_without_session_is_unauthorized() {
        let guard = PermissionGuard::new(&["org:read"]);
        let app: Router = Router::new().route(
            "/guarded",
            get(|| async { "ok" })
                .route_layer(middleware::from_fn_with_state(guard, require_permissions)),
        );
        let request = HttpRequest::builder()
            .uri("/guarded")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
