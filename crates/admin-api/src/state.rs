//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use admin_auth::{Argon2PasswordHasher, PasswordHasher, TokenSessionAuthority};
use admin_cache::CacheManager;
use admin_core::config::AppConfig;
use admin_core::id::IdAllocator;
use admin_core::result::AppResult;
use admin_database::DatabasePool;
use admin_database::repositories::{
    AccessLogRepository, DictRepository, MenuRepository, OrganizationRepository, RoleRepository,
    UserRepository,
};
use admin_service::{
    AccessLogService, AuthService, DictService, MenuService, OrganizationService, RoleService,
    UserService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Database connection pool
    pub db: DatabasePool,
    /// Cache manager holding the session whitelist
    pub cache: Arc<CacheManager>,
    /// Distributed ID allocator
    pub ids: Arc<IdAllocator>,

    // ── Auth ─────────────────────────────────────────────────
    /// Token issuance, verification, renewal, and permission checks
    pub authority: Arc<TokenSessionAuthority>,

    // ── Services ─────────────────────────────────────────────
    /// Login and session introspection
    pub auth_service: Arc<AuthService>,
    /// Organization tree
    pub organization_service: Arc<OrganizationService>,
    /// Menu tree
    pub menu_service: Arc<MenuService>,
    /// User accounts
    pub user_service: Arc<UserService>,
    /// Roles and their grants
    pub role_service: Arc<RoleService>,
    /// Dictionaries
    pub dict_service: Arc<DictService>,
    /// Access log
    pub access_log_service: Arc<AccessLogService>,
}

impl AppState {
    /// Wires repositories, the token authority, and services on top of an
    /// open database pool and cache.
    pub fn build(config: AppConfig, db: DatabasePool, cache: CacheManager) -> AppResult<Self> {
        let pool = db.pool().clone();
        let cache = Arc::new(cache);
        let ids = Arc::new(IdAllocator::new(&config.id)?);

        // ── Repositories ─────────────────────────────────────────
        let org_repo = Arc::new(OrganizationRepository::new(pool.clone()));
        let menu_repo = Arc::new(MenuRepository::new(pool.clone()));
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let role_repo = Arc::new(RoleRepository::new(pool.clone()));
        let dict_repo = Arc::new(DictRepository::new(pool.clone()));
        let log_repo = Arc::new(AccessLogRepository::new(pool));

        // ── Auth ─────────────────────────────────────────────────
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
        let authority = Arc::new(TokenSessionAuthority::new(&config.auth, Arc::clone(&cache)));

        // ── Services ─────────────────────────────────────────────
        let menu_service = Arc::new(MenuService::new(menu_repo, Arc::clone(&ids)));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repo),
            Arc::clone(&menu_service),
            Arc::clone(&hasher),
            Arc::clone(&authority),
        ));
        let organization_service = Arc::new(OrganizationService::new(
            Arc::clone(&org_repo),
            Arc::clone(&ids),
        ));
        let user_service = Arc::new(UserService::new(
            user_repo,
            org_repo,
            hasher,
            Arc::clone(&ids),
        ));
        let role_service = Arc::new(RoleService::new(role_repo, Arc::clone(&ids)));
        let dict_service = Arc::new(DictService::new(dict_repo, Arc::clone(&ids)));
        let access_log_service = Arc::new(AccessLogService::new(log_repo, Arc::clone(&ids)));

        Ok(Self {
            config: Arc::new(config),
            db,
            cache,
            ids,
            authority,
            auth_service,
            organization_service,
            menu_service,
            user_service,
            role_service,
            dict_service,
            access_log_service,
        })
    }
}
