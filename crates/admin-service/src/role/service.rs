//! Role CRUD plus menu and user grants.

use std::sync::Arc;

use tracing::info;

use admin_core::error::AppError;
use admin_core::id::IdAllocator;
use admin_core::result::AppResult;
use admin_core::types::pagination::{PageRequest, PageResponse};
use admin_core::types::{MenuId, RoleId, UserId};
use admin_database::repositories::RoleRepository;
use admin_entity::role::{CreateRole, Role, UpdateRole};

use crate::context::RequestContext;

/// Manages roles.
#[derive(Debug, Clone)]
pub struct RoleService {
    /// Role repository.
    role_repo: Arc<RoleRepository>,
    /// ID allocator.
    ids: Arc<IdAllocator>,
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(role_repo: Arc<RoleRepository>, ids: Arc<IdAllocator>) -> Self {
        Self { role_repo, ids }
    }

    /// Gets a role by ID.
    pub async fn get(&self, id: RoleId) -> AppResult<Role> {
        self.role_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }

    /// Lists roles.
    pub async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Role>> {
        self.role_repo.list(&page.normalized()).await
    }

    /// Creates a role.
    pub async fn create(&self, ctx: &RequestContext, req: CreateRole) -> AppResult<Role> {
        if req.name.trim().is_empty() || req.code.trim().is_empty() {
            return Err(AppError::validation("Role name and code are required"));
        }
        let role = req.into_row(RoleId::from(self.ids.next_id()?));
        let created = self.role_repo.create(&role).await?;
        info!(role_id = %created.id, code = %created.code, actor = %ctx.user_id, "Role created");
        Ok(created)
    }

    /// Applies a partial update.
    pub async fn update(&self, ctx: &RequestContext, id: RoleId, req: UpdateRole) -> AppResult<Role> {
        if req.code.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::validation("Role code cannot be empty"));
        }
        let mut role = self.get(id).await?;
        req.apply(&mut role);
        let saved = self.role_repo.update(&role).await?;
        info!(role_id = %id, actor = %ctx.user_id, "Role updated");
        Ok(saved)
    }

    /// Soft-deletes a role and drops its grants.
    ///
    /// Sessions already issued keep their menu snapshot until they expire.
    pub async fn delete(&self, ctx: &RequestContext, id: RoleId) -> AppResult<()> {
        self.role_repo.delete(id).await?;
        info!(role_id = %id, actor = %ctx.user_id, "Role deleted");
        Ok(())
    }

    /// Menus granted to a role.
    pub async fn menus_of(&self, id: RoleId) -> AppResult<Vec<MenuId>> {
        self.get(id).await?;
        self.role_repo.menu_ids_of(id).await
    }

    /// Replaces the menus granted to a role.
    pub async fn assign_menus(&self, ctx: &RequestContext, id: RoleId, menu_ids: &[MenuId]) -> AppResult<()> {
        self.get(id).await?;
        self.role_repo.replace_menus(id, menu_ids).await?;
        info!(role_id = %id, menus = menu_ids.len(), actor = %ctx.user_id, "Role menus assigned");
        Ok(())
    }

    /// Replaces the users holding a role.
    pub async fn assign_users(&self, ctx: &RequestContext, id: RoleId, user_ids: &[UserId]) -> AppResult<()> {
        self.get(id).await?;
        self.role_repo.replace_users(id, user_ids).await?;
        info!(role_id = %id, users = user_ids.len(), actor = %ctx.user_id, "Role users assigned");
        Ok(())
    }
}
