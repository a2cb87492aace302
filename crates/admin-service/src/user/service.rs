//! User CRUD, role/organization assignment, and password changes.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use admin_auth::PasswordHasher;
use admin_core::error::AppError;
use admin_core::id::IdAllocator;
use admin_core::result::AppResult;
use admin_core::traits::HierarchyRepository;
use admin_core::types::pagination::{PageRequest, PageResponse};
use admin_core::types::{OrganizationId, RoleId, UserId};
use admin_database::repositories::{OrganizationRepository, UserRepository};
use admin_entity::user::{CreateUser, UpdateProfile, UpdateUser, User, UserFilter};

use crate::auth::credentials;
use crate::context::RequestContext;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Request to change a password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password, required when users change their own password.
    #[serde(default, skip_serializing)]
    pub old_password: Option<String>,
    /// New password.
    #[serde(skip_serializing)]
    pub new_password: String,
}

/// Manages operator accounts.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Organization repository, for organization-scoped listings.
    org_repo: Arc<OrganizationRepository>,
    /// Password hasher.
    hasher: Arc<dyn PasswordHasher>,
    /// ID allocator.
    ids: Arc<IdAllocator>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        org_repo: Arc<OrganizationRepository>,
        hasher: Arc<dyn PasswordHasher>,
        ids: Arc<IdAllocator>,
    ) -> Self {
        Self {
            user_repo,
            org_repo,
            hasher,
            ids,
        }
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: UserId) -> AppResult<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Lists users matching `filter`.
    pub async fn list(&self, filter: &UserFilter, page: &PageRequest) -> AppResult<PageResponse<User>> {
        self.user_repo.list(filter, &page.normalized()).await
    }

    /// Lists users of an organization and all of its descendants.
    pub async fn list_by_organization(
        &self,
        org_id: OrganizationId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let org = self
            .org_repo
            .find_by_id(org_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Organization {org_id} not found")))?;
        self.user_repo
            .list_by_organization_path(&org.path, &page.normalized())
            .await
    }

    /// Creates a user with a hashed password and its initial links.
    pub async fn create(&self, ctx: &RequestContext, req: CreateUser) -> AppResult<User> {
        let username = req.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::validation("Username cannot be empty"));
        }
        check_password(&req.password)?;

        let password_hash = credentials::hash(&self.hasher, req.password).await?;
        let now = Utc::now();
        let user = User {
            id: UserId::from(self.ids.next_id()?),
            username,
            password_hash,
            email: req.email.filter(|e| !e.trim().is_empty()),
            phone: req.phone,
            real_name: req.real_name,
            avatar: req.avatar,
            status: req.status,
            last_login_at: None,
            created_by: ctx.actor(),
            updated_by: ctx.actor(),
            deleted_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self
            .user_repo
            .create(&user, &req.role_ids, &req.organization_ids)
            .await?;
        info!(user_id = %created.id, username = %created.username, actor = %ctx.user_id, "User created");
        Ok(created)
    }

    /// Applies a profile update.
    pub async fn update(&self, ctx: &RequestContext, id: UserId, req: UpdateUser) -> AppResult<User> {
        let mut user = self.get(id).await?;
        req.apply(&mut user, ctx.actor());
        self.user_repo.update(&user).await
    }

    /// Applies the caller's own contact details.
    pub async fn update_profile(&self, ctx: &RequestContext, profile: UpdateProfile) -> AppResult<User> {
        let user = self.update(ctx, ctx.user_id, profile.into()).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Soft-deletes one user.
    pub async fn delete(&self, ctx: &RequestContext, id: UserId) -> AppResult<()> {
        if self.batch_delete(ctx, &[id]).await? == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    /// Soft-deletes several users, returning how many were removed.
    pub async fn batch_delete(&self, ctx: &RequestContext, ids: &[UserId]) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::validation("No users selected"));
        }
        if ids.contains(&ctx.user_id) {
            return Err(AppError::validation("You cannot delete your own account"));
        }
        let removed = self.user_repo.soft_delete(ids, ctx.actor()).await?;
        info!(count = removed, actor = %ctx.user_id, "Users deleted");
        Ok(removed)
    }

    /// Replaces the roles of a user.
    pub async fn assign_roles(&self, ctx: &RequestContext, id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        self.get(id).await?;
        self.user_repo.replace_roles(id, role_ids).await?;
        info!(user_id = %id, roles = role_ids.len(), actor = %ctx.user_id, "User roles assigned");
        Ok(())
    }

    /// Replaces the organizations of a user.
    pub async fn assign_organizations(
        &self,
        ctx: &RequestContext,
        id: UserId,
        organization_ids: &[OrganizationId],
    ) -> AppResult<()> {
        self.get(id).await?;
        self.user_repo
            .replace_organizations(id, organization_ids)
            .await?;
        info!(
            user_id = %id,
            organizations = organization_ids.len(),
            actor = %ctx.user_id,
            "User organizations assigned"
        );
        Ok(())
    }

    /// Changes a password. Users changing their own password must supply
    /// the current one.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        id: UserId,
        req: ChangePasswordRequest,
    ) -> AppResult<()> {
        check_password(&req.new_password)?;
        let user = self.get(id).await?;

        if ctx.user_id == id {
            let old = req
                .old_password
                .ok_or_else(|| AppError::validation("Current password is required"))?;
            if !credentials::verify(&self.hasher, old, user.password_hash.clone()).await? {
                return Err(AppError::validation("Current password is incorrect"));
            }
        }

        let hash = credentials::hash(&self.hasher, req.new_password).await?;
        self.user_repo.update_password(id, &hash).await?;
        info!(user_id = %id, actor = %ctx.user_id, "Password changed");
        Ok(())
    }
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_length_counts_chars() {
        assert!(check_password("12345").is_err());
        assert!(check_password("123456").is_ok());
        assert!(check_password("密码密码密码").is_ok());
    }
}
