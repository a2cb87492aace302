//! End-to-end session flow through the public crates: issue, authenticate,
//! sliding renewal, authorization, and revocation, backed by the in-memory
//! cache.

use std::sync::Arc;

use chrono::Utc;

use admin_auth::TokenSessionAuthority;
use admin_cache::CacheManager;
use admin_core::config::AuthConfig;
use admin_core::error::ErrorKind;
use admin_core::id::ManualClock;
use admin_core::types::{MenuId, UserId};
use admin_entity::session::MenuSnapshot;

fn menu(id: i64, permission: Option<&str>, children: Vec<MenuSnapshot>) -> MenuSnapshot {
    MenuSnapshot {
        id: MenuId(id),
        name: format!("menu-{id}"),
        route: format!("/m/{id}"),
        permission: permission.map(str::to_string),
        sort: 0,
        children,
    }
}

fn setup() -> (TokenSessionAuthority, Arc<ManualClock>) {
    let config = AuthConfig {
        jwt_secret: "integration-secret-0123456789".to_string(),
        ..AuthConfig::default()
    };
    let clock = Arc::new(ManualClock::new(Utc::now().timestamp_millis()));
    let authority =
        TokenSessionAuthority::with_clock(&config, Arc::new(CacheManager::in_memory()), clock.clone());
    (authority, clock)
}

#[tokio::test]
async fn test_login_renew_revoke_flow() {
    let (authority, clock) = setup();
    let menus = vec![menu(
        1,
        None,
        vec![menu(2, Some("org:read"), vec![]), menu(3, Some("org:update"), vec![])],
    )];

    // Fresh token: accepted, no renewal.
    let issued = authority.issue(UserId(100), "admin", menus).await.unwrap();
    let first = authority.authenticate(Some(&issued.token)).await.unwrap();
    assert_eq!(first.session.user_id, UserId(100));
    assert!(first.renewed.is_none());

    authority.authorize(&issued.token, &["org:read"]).await.unwrap();
    let denied = authority
        .authorize(&issued.token, &["user:delete"])
        .await
        .unwrap_err();
    assert_eq!(denied.kind, ErrorKind::Authorization);

    // Within the refresh window: a successor is minted once.
    clock.advance((24 * 3600 - 600) * 1000);
    let second = authority.authenticate(Some(&issued.token)).await.unwrap();
    let renewed = second.renewed.expect("token should be renewed");
    assert_ne!(renewed.token, issued.token);
    assert!(renewed.expires_at > issued.expires_at);

    // A second renewal of the same token hands back the same successor.
    let replay = authority.renew(&issued.token).await.unwrap();
    assert_eq!(replay.map(|t| t.token), Some(renewed.token.clone()));

    // The old token was renewed away.
    let err = authority.authenticate(Some(&issued.token)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::RevokedOrExpired);

    // The successor carries the same permissions.
    authority.authorize(&renewed.token, &["org:update"]).await.unwrap();

    // Logging out the successor ends that session.
    authority.revoke(&renewed.token).await.unwrap();
    let err = authority
        .authenticate(Some(&renewed.token))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RevokedOrExpired);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (authority, clock) = setup();
    let issued = authority.issue(UserId(5), "eve", vec![]).await.unwrap();

    clock.advance((24 * 3600 + 1) * 1000);
    let err = authority.authenticate(Some(&issued.token)).await.unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_missing_credential() {
    let (authority, _) = setup();
    let err = authority.authenticate(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingCredential);
}
