//! Credential login on top of the token session authority.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use admin_auth::{AuthSession, IssuedToken, PasswordHasher, TokenSessionAuthority};
use admin_core::error::AppError;
use admin_core::result::AppResult;
use admin_core::types::{OrganizationId, UserId};
use admin_entity::role::Role;
use admin_entity::session::MenuSnapshot;
use admin_entity::user::User;
use admin_database::repositories::UserRepository;

use super::credentials::{self, DecoyHash};
use crate::menu::MenuService;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// The issued session token.
    #[serde(flatten)]
    pub token: IssuedToken,
    /// The authenticated user.
    pub user: User,
    /// Menu tree captured into the session.
    pub menus: Vec<MenuSnapshot>,
}

/// The current user together with their grants.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    /// Account row.
    #[serde(flatten)]
    pub user: User,
    /// Granted roles.
    pub roles: Vec<Role>,
    /// Organizations the user belongs to.
    pub organization_ids: Vec<OrganizationId>,
}

/// Handles login, logout, and session introspection.
#[derive(Debug, Clone)]
pub struct AuthService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Menu service, for the session snapshot.
    menus: Arc<MenuService>,
    /// Password hasher.
    hasher: Arc<dyn PasswordHasher>,
    /// Token session authority.
    authority: Arc<TokenSessionAuthority>,
    /// Verified in place of a stored hash for unknown usernames.
    decoy: Arc<DecoyHash>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        menus: Arc<MenuService>,
        hasher: Arc<dyn PasswordHasher>,
        authority: Arc<TokenSessionAuthority>,
    ) -> Self {
        Self {
            user_repo,
            menus,
            hasher,
            authority,
            decoy: Arc::new(DecoyHash::default()),
        }
    }

    /// Verifies credentials and opens a session.
    ///
    /// Unknown usernames and wrong passwords produce the same error after the
    /// same hashing work.
    pub async fn login(&self, username: &str, password: &str, ip_address: &str) -> AppResult<LoginResult> {
        let invalid = || AppError::validation("Invalid username or password");

        let Some(user) = self.user_repo.find_by_username(username.trim()).await? else {
            self.decoy.verify(&self.hasher, password.to_string()).await?;
            warn!(username = %username, ip = %ip_address, "Login failed: unknown user");
            return Err(invalid());
        };

        if !credentials::verify(&self.hasher, password.to_string(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, ip = %ip_address, "Login failed: wrong password");
            return Err(invalid());
        }

        if !user.can_login() {
            warn!(user_id = %user.id, ip = %ip_address, "Login refused: account disabled");
            return Err(AppError::authorization("User account is disabled"));
        }

        self.user_repo.touch_last_login(user.id).await?;

        let menus = self.menus.user_menus(user.id).await?;
        let token = self
            .authority
            .issue(user.id, &user.username, menus.clone())
            .await?;

        info!(user_id = %user.id, username = %user.username, ip = %ip_address, "User logged in");

        Ok(LoginResult { token, user, menus })
    }

    /// Closes the session of the presented token.
    pub async fn logout(&self, session: &AuthSession) -> AppResult<()> {
        self.authority.revoke(&session.token).await?;
        info!(user_id = %session.user_id, jti = %session.jti, "User logged out");
        Ok(())
    }

    /// Profile of the authenticated user.
    pub async fn current_user(&self, user_id: UserId) -> AppResult<UserProfile> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        let roles = self.user_repo.roles_of(user_id).await?;
        let organization_ids = self.user_repo.organization_ids_of(user_id).await?;
        Ok(UserProfile {
            user,
            roles,
            organization_ids,
        })
    }

    /// Menu tree stored with the session.
    pub async fn session_menus(&self, session: &AuthSession) -> AppResult<Vec<MenuSnapshot>> {
        self.authority.menus(&session.token).await
    }
}
