//! Token session authority: issue, authenticate, renew, revoke, authorize.
//!
//! A token authenticates only while it is both cryptographically valid and
//! present in the cache whitelist. Whitelist presence is checked before the
//! signature so that server-side revocation always wins.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use admin_cache::provider::CacheManager;
use admin_core::config::AuthConfig;
use admin_core::error::AppError;
use admin_core::id::{Clock, SystemClock};
use admin_core::result::AppResult;
use admin_core::types::UserId;
use admin_entity::session::{MenuSnapshot, WhitelistEntry};

use super::whitelist::WhitelistStore;
use crate::jwt::{Claims, JwtDecoder, JwtEncoder};
use crate::permission::{has_any, resolve_permissions};

/// A freshly minted token handed back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// Compact JWS.
    pub token: String,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

/// Identity attached to an authenticated request.
#[derive(Clone)]
pub struct AuthSession {
    /// Authenticated user.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Token presented with the request.
    pub token: String,
    /// Token id, safe to log.
    pub jti: Uuid,
    /// Expiry of the presented token.
    pub expires_at: DateTime<Utc>,
    /// Permission codes resolved from the whitelist entry that admitted the
    /// request.
    pub permissions: Arc<BTreeSet<String>>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("jti", &self.jti)
            .field("expires_at", &self.expires_at)
            .field("permissions", &self.permissions.len())
            .finish()
    }
}

impl AuthSession {
    fn new(token: &str, claims: &Claims, entry: &WhitelistEntry) -> Self {
        Self {
            user_id: claims.user_id(),
            username: claims.username.clone(),
            token: token.to_string(),
            jti: claims.jti,
            expires_at: claims.expires_at(),
            permissions: Arc::new(resolve_permissions(&entry.menus)),
        }
    }

    /// Checks `required` against the permissions captured at authentication.
    ///
    /// Never touches the cache, so it keeps working after a concurrent
    /// renewal has retired the presented token.
    pub fn authorize<S: AsRef<str>>(&self, required: &[S]) -> AppResult<()> {
        check_granted(&self.permissions, required)
    }
}

/// Longest time a request that lost the renewal race waits for the winner's
/// successor entry.
const SUCCESSOR_WAIT: Duration = Duration::from_millis(500);
const SUCCESSOR_POLL: Duration = Duration::from_millis(10);

fn check_granted<S: AsRef<str>>(granted: &BTreeSet<String>, required: &[S]) -> AppResult<()> {
    if required.is_empty() || has_any(granted, required) {
        return Ok(());
    }
    let wanted: Vec<&str> = required.iter().map(AsRef::as_ref).collect();
    Err(AppError::authorization(format!(
        "Requires any of: {}",
        wanted.join(", ")
    )))
}

/// Outcome of [`TokenSessionAuthority::authenticate`].
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// Identity of the presented token.
    pub session: AuthSession,
    /// Successor token when sliding renewal ran during this call.
    pub renewed: Option<IssuedToken>,
}

/// Issues and validates whitelist-backed session tokens.
pub struct TokenSessionAuthority {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    whitelist: WhitelistStore,
    clock: Arc<dyn Clock>,
    refresh_ahead_seconds: u64,
    renewal_lock_ttl: Duration,
}

impl std::fmt::Debug for TokenSessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSessionAuthority")
            .field("lifetime_seconds", &self.encoder.lifetime_seconds())
            .field("refresh_ahead_seconds", &self.refresh_ahead_seconds)
            .field("renewal_lock_ttl", &self.renewal_lock_ttl)
            .finish()
    }
}

impl TokenSessionAuthority {
    /// Creates an authority using the system clock.
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>) -> Self {
        Self::with_clock(config, cache, Arc::new(SystemClock))
    }

    /// Creates an authority reading time from `clock`.
    pub fn with_clock(config: &AuthConfig, cache: Arc<CacheManager>, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            whitelist: WhitelistStore::new(cache),
            clock,
            refresh_ahead_seconds: config.refresh_ahead_seconds,
            renewal_lock_ttl: Duration::from_secs(config.renewal_lock_seconds.max(1)),
        }
    }

    fn now_secs(&self) -> i64 {
        self.clock.now_ms().div_euclid(1000)
    }

    fn lifetime(&self) -> Duration {
        Duration::from_secs(self.encoder.lifetime_seconds().max(0) as u64)
    }

    /// Mints a token and records its whitelist entry.
    ///
    /// A failed whitelist write is logged and does not fail the call.
    pub async fn issue(
        &self,
        user_id: UserId,
        username: &str,
        menus: Vec<MenuSnapshot>,
    ) -> AppResult<IssuedToken> {
        let (token, claims) = self
            .encoder
            .encode(user_id, username, &menus, self.now_secs())?;

        let entry = WhitelistEntry {
            user_id,
            username: username.to_string(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            menus,
        };
        if let Err(e) = self.whitelist.put(&token, &entry, self.lifetime()).await {
            warn!(
                user_id = %user_id,
                jti = %claims.jti,
                error = %e,
                "Failed to record whitelist entry, token will not authenticate"
            );
        }

        info!(user_id = %user_id, username = %username, jti = %claims.jti, "Session token issued");

        Ok(IssuedToken {
            token,
            issued_at: entry.issued_at,
            expires_at: entry.expires_at,
        })
    }

    /// Validates a presented token.
    ///
    /// When the remaining validity is within the refresh window, the token
    /// is renewed and the successor is returned in
    /// [`Authenticated::renewed`]. The returned identity is always the
    /// presented token's.
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<Authenticated> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::missing_credential("No credential supplied"))?;

        self.decoder.check_structure(token)?;

        let entry = self
            .whitelist
            .get(token)
            .await?
            .ok_or_else(|| AppError::revoked_or_expired("Token is not active"))?;

        let now = self.now_secs();
        let claims = self.decoder.decode(token, now)?;
        if claims.user_id() != entry.user_id {
            return Err(AppError::invalid_signature(
                "Token does not match its whitelist entry",
            ));
        }

        let renewed = if claims.remaining_seconds(now) <= self.refresh_ahead_seconds {
            match self.renew(token).await {
                Ok(renewed) => renewed,
                Err(e) => {
                    warn!(jti = %claims.jti, error = %e, "Sliding renewal failed");
                    None
                }
            }
        } else {
            None
        };

        Ok(Authenticated {
            session: AuthSession::new(token, &claims, &entry),
            renewed,
        })
    }

    /// Replaces `old` with a fresh token for the same identity, carrying the
    /// whitelist snapshot over unchanged.
    ///
    /// Concurrent calls for the same `old` token elect one renewer through a
    /// `SET NX` lock that also records the successor. Every other caller
    /// waits briefly for the successor entry and returns it, or `None` if the
    /// winner has not finished by then.
    pub async fn renew(&self, old: &str) -> AppResult<Option<IssuedToken>> {
        self.decoder.check_structure(old)?;

        if self.whitelist.renewal_successor(old).await?.is_some() {
            return self.await_successor(old).await;
        }

        let entry = match self.whitelist.get(old).await? {
            Some(entry) => entry,
            None => {
                // The winner deletes the old entry only after recording the lock.
                return match self.whitelist.renewal_successor(old).await? {
                    Some(_) => self.await_successor(old).await,
                    None => Err(AppError::revoked_or_expired("Token is not active")),
                };
            }
        };

        let now = self.now_secs();
        let claims = self.decoder.decode(old, now)?;
        let (token, fresh) =
            self.encoder
                .encode(claims.user_id(), &claims.username, &entry.menus, now)?;

        if !self
            .whitelist
            .claim_renewal(old, &token, self.renewal_lock_ttl)
            .await?
        {
            debug!(jti = %claims.jti, "Renewal already claimed by a concurrent request");
            return self.await_successor(old).await;
        }

        let migrated = WhitelistEntry {
            user_id: entry.user_id,
            username: entry.username,
            issued_at: fresh.issued_at(),
            expires_at: fresh.expires_at(),
            menus: entry.menus,
        };
        if let Err(e) = self.whitelist.put(&token, &migrated, self.lifetime()).await {
            if let Err(release) = self.whitelist.release_renewal(old).await {
                warn!(jti = %claims.jti, error = %release, "Failed to release renewal lock");
            }
            return Err(e);
        }
        if let Err(e) = self.whitelist.remove(old).await {
            warn!(jti = %claims.jti, error = %e, "Old token stays live until its entry expires");
        }

        info!(
            user_id = %migrated.user_id,
            old_jti = %claims.jti,
            new_jti = %fresh.jti,
            "Session token renewed"
        );

        Ok(Some(IssuedToken {
            token,
            issued_at: migrated.issued_at,
            expires_at: migrated.expires_at,
        }))
    }

    /// Polls the renewal lock of `old` until the successor it names has a
    /// whitelist entry, for at most [`SUCCESSOR_WAIT`].
    async fn await_successor(&self, old: &str) -> AppResult<Option<IssuedToken>> {
        let deadline = tokio::time::Instant::now() + SUCCESSOR_WAIT;
        loop {
            if let Some(successor) = self.whitelist.renewal_successor(old).await? {
                if let Some(issued) = self.successor(&successor).await? {
                    return Ok(Some(issued));
                }
            }
            if tokio::time::Instant::now() >= deadline {
                debug!("Renewal winner did not publish a successor in time");
                return Ok(None);
            }
            tokio::time::sleep(SUCCESSOR_POLL).await;
        }
    }

    async fn successor(&self, token: &str) -> AppResult<Option<IssuedToken>> {
        Ok(self.whitelist.get(token).await?.map(|entry| IssuedToken {
            token: token.to_string(),
            issued_at: entry.issued_at,
            expires_at: entry.expires_at,
        }))
    }

    /// Removes the whitelist entry. The token stops authenticating at once.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        self.whitelist.remove(token).await?;
        info!("Session token revoked");
        Ok(())
    }

    /// Menu snapshot stored with a live token.
    pub async fn menus(&self, token: &str) -> AppResult<Vec<MenuSnapshot>> {
        self.whitelist
            .get(token)
            .await?
            .map(|entry| entry.menus)
            .ok_or_else(|| AppError::revoked_or_expired("Token is not active"))
    }

    /// Permission codes granted to a live token.
    pub async fn permissions(&self, token: &str) -> AppResult<BTreeSet<String>> {
        Ok(resolve_permissions(&self.menus(token).await?))
    }

    /// Passes when `required` is empty or the token holds any of its codes.
    ///
    /// Reads the whitelist. Request guards use [`AuthSession::authorize`]
    /// instead, which checks the snapshot taken at authentication.
    pub async fn authorize<S: AsRef<str>>(&self, token: &str, required: &[S]) -> AppResult<()> {
        if required.is_empty() {
            return Ok(());
        }
        check_granted(&self.permissions(token).await?, required)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use chrono::Utc;

    use admin_core::error::ErrorKind;
    use admin_core::id::ManualClock;
    use admin_core::traits::CacheProvider;
    use admin_core::types::MenuId;

    use super::*;

    const SECRET: &str = "test-secret-0123456789";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            ..AuthConfig::default()
        }
    }

    fn authority() -> (TokenSessionAuthority, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now().timestamp_millis()));
        let authority = TokenSessionAuthority::with_clock(
            &config(),
            Arc::new(CacheManager::in_memory()),
            clock.clone(),
        );
        (authority, clock)
    }

    fn node(id: i64, permission: Option<&str>, children: Vec<MenuSnapshot>) -> MenuSnapshot {
        MenuSnapshot {
            id: MenuId(id),
            name: format!("menu-{id}"),
            route: String::new(),
            permission: permission.map(str::to_string),
            sort: 0,
            children,
        }
    }

    fn menus() -> Vec<MenuSnapshot> {
        vec![node(
            1,
            Some("user:read"),
            vec![node(2, None, vec![node(3, Some("user:write"), vec![])])],
        )]
    }

    #[tokio::test]
    async fn test_issue_then_authenticate() {
        let (authority, _) = authority();
        let issued = authority.issue(UserId(7), "alice", menus()).await.unwrap();

        let auth = authority.authenticate(Some(&issued.token)).await.unwrap();
        assert_eq!(auth.session.user_id, UserId(7));
        assert_eq!(auth.session.username, "alice");
        assert!(auth.renewed.is_none());
    }

    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let (authority, _) = authority();
        let issued = authority.issue(UserId(7), "alice", menus()).await.unwrap();
        authority.revoke(&issued.token).await.unwrap();

        let err = authority.authenticate(Some(&issued.token)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RevokedOrExpired);
    }

    #[tokio::test]
    async fn test_credential_failures() {
        let (authority, _) = authority();

        let err = authority.authenticate(None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingCredential);
        let err = authority.authenticate(Some("  ")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingCredential);

        let err = authority.authenticate(Some("not-a-token")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedCredential);
    }

    #[tokio::test]
    async fn test_whitelist_checked_before_signature() {
        let (authority, _) = authority();
        let foreign = JwtEncoder::new(&AuthConfig {
            jwt_secret: "some-other-secret-xyz".to_string(),
            ..AuthConfig::default()
        })
        .encode(UserId(7), "alice", &[], Utc::now().timestamp())
        .unwrap()
        .0;

        let err = authority.authenticate(Some(&foreign)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RevokedOrExpired);
    }

    #[tokio::test]
    async fn test_bad_signature_with_whitelist_entry() {
        let cache = Arc::new(CacheManager::in_memory());
        let authority = TokenSessionAuthority::new(&config(), cache.clone());
        let forger = TokenSessionAuthority::new(
            &AuthConfig {
                jwt_secret: "some-other-secret-xyz".to_string(),
                ..AuthConfig::default()
            },
            cache,
        );
        let forged = forger.issue(UserId(7), "alice", vec![]).await.unwrap();

        let err = authority.authenticate(Some(&forged.token)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSignature);
    }

    #[tokio::test]
    async fn test_sliding_renewal() {
        let (authority, clock) = authority();
        let issued = authority.issue(UserId(7), "alice", menus()).await.unwrap();

        clock.advance((24 * 3600 - 100) * 1000);
        let auth = authority.authenticate(Some(&issued.token)).await.unwrap();
        assert_eq!(auth.session.user_id, UserId(7));
        let renewed = auth.renewed.expect("token should have been renewed");
        assert_ne!(renewed.token, issued.token);
        assert!(renewed.expires_at > issued.expires_at);

        let err = authority.authenticate(Some(&issued.token)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RevokedOrExpired);

        let next = authority.authenticate(Some(&renewed.token)).await.unwrap();
        assert!(next.renewed.is_none());
        let granted = authority.permissions(&renewed.token).await.unwrap();
        assert!(granted.contains("user:write"));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let (authority, clock) = authority();
        let issued = authority.issue(UserId(7), "alice", menus()).await.unwrap();

        clock.advance((24 * 3600 + 1) * 1000);
        let err = authority.authenticate(Some(&issued.token)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RevokedOrExpired);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_renewal_single_successor() {
        let (authority, _) = authority();
        let authority = Arc::new(authority);
        let issued = authority.issue(UserId(7), "alice", menus()).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let authority = authority.clone();
                let token = issued.token.clone();
                tokio::spawn(async move { authority.renew(&token).await })
            })
            .collect();

        let mut successors = HashSet::new();
        for result in futures::future::join_all(handles).await {
            if let Some(token) = result.unwrap().unwrap() {
                successors.insert(token.token);
            }
        }
        assert_eq!(successors.len(), 1);

        let successor = successors.into_iter().next().unwrap();
        let auth = authority.authenticate(Some(&successor)).await.unwrap();
        assert_eq!(auth.session.username, "alice");

        let again = authority.renew(&issued.token).await.unwrap().unwrap();
        assert_eq!(again.token, successor);
    }

    #[tokio::test]
    async fn test_authorize_or_semantics() {
        let (authority, _) = authority();
        let issued = authority.issue(UserId(7), "alice", menus()).await.unwrap();

        let granted = authority.permissions(&issued.token).await.unwrap();
        let expected: BTreeSet<String> =
            ["user:read", "user:write"].iter().map(|s| s.to_string()).collect();
        assert_eq!(granted, expected);

        let err = authority
            .authorize(&issued.token, &["user:delete"])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        authority
            .authorize(&issued.token, &["user:write", "user:delete"])
            .await
            .unwrap();
        authority.authorize::<&str>(&issued.token, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_session_authorizes_from_its_snapshot() {
        let (authority, _) = authority();
        let issued = authority.issue(UserId(7), "alice", menus()).await.unwrap();
        let auth = authority.authenticate(Some(&issued.token)).await.unwrap();

        authority.revoke(&issued.token).await.unwrap();

        auth.session.authorize(&["user:write"]).unwrap();
        let err = auth.session.authorize(&["user:delete"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[derive(Debug)]
    struct BrokenCache;

    #[async_trait]
    impl CacheProvider for BrokenCache {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("connection refused"))
        }
        async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn remove(&self, _key: &str) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn put_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
            Err(AppError::cache("connection refused"))
        }
        async fn ping(&self) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
    }

    /// Memory store whose writes and whitelist misses are slow, so a renewal
    /// loser looks up the successor before the winner has stored it.
    #[derive(Debug)]
    struct SlowCache {
        inner: admin_cache::memory::MemoryCacheProvider,
    }

    #[async_trait]
    impl CacheProvider for SlowCache {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            let value = self.inner.get(key).await?;
            if value.is_none() && key.starts_with("jwt:whitelist:") {
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            Ok(value)
        }
        async fn put(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.inner.put(key, value, ttl).await
        }
        async fn remove(&self, key: &str) -> AppResult<()> {
            self.inner.remove(key).await
        }
        async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
            self.inner.put_if_absent(key, value, ttl).await
        }
        async fn ping(&self) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_in_refresh_window_both_authorized() {
        let slow = SlowCache {
            inner: admin_cache::memory::MemoryCacheProvider::new(&Default::default()),
        };
        let cache = Arc::new(CacheManager::from_provider(Arc::new(slow)));
        let clock = Arc::new(ManualClock::new(Utc::now().timestamp_millis()));
        let authority = Arc::new(TokenSessionAuthority::with_clock(&config(), cache, clock.clone()));

        let issued = authority.issue(UserId(7), "alice", menus()).await.unwrap();
        clock.advance((24 * 3600 - 100) * 1000);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let authority = authority.clone();
                let token = issued.token.clone();
                tokio::spawn(async move {
                    let auth = authority.authenticate(Some(&token)).await?;
                    auth.session.authorize(&["user:read"])?;
                    Ok::<_, AppError>(auth.renewed)
                })
            })
            .collect();

        let mut successors = HashSet::new();
        for result in futures::future::join_all(handles).await {
            let renewed = result.unwrap().unwrap();
            successors.insert(renewed.expect("both requests see the successor").token);
        }
        assert_eq!(successors.len(), 1);
        assert!(!successors.contains(&issued.token));
    }

    #[tokio::test]
    async fn test_cache_outage_degrades_issue_and_rejects_authentication() {
        let cache = Arc::new(CacheManager::from_provider(Arc::new(BrokenCache)));
        let authority = TokenSessionAuthority::new(&config(), cache);

        let issued = authority.issue(UserId(7), "alice", vec![]).await.unwrap();
        let err = authority.authenticate(Some(&issued.token)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cache);
    }
}
