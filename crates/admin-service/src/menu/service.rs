//! Menu CRUD, tree queries, and user menu snapshots.

use std::sync::Arc;

use tracing::info;

use admin_auth::PermissionTree;
use admin_core::error::AppError;
use admin_core::id::IdAllocator;
use admin_core::result::AppResult;
use admin_core::types::{MenuId, UserId};
use admin_database::repositories::MenuRepository;
use admin_entity::TreeNode;
use admin_entity::menu::{CreateMenu, Menu, UpdateMenu};
use admin_entity::session::MenuSnapshot;

use crate::context::RequestContext;
use crate::hierarchy::HierarchyManager;

/// Manages the menu tree.
#[derive(Debug, Clone)]
pub struct MenuService {
    /// Path-maintaining manager.
    hierarchy: HierarchyManager<Menu, MenuRepository>,
    /// Menu repository for role-based lookups.
    menu_repo: Arc<MenuRepository>,
}

impl MenuService {
    /// Creates a new menu service.
    pub fn new(menu_repo: Arc<MenuRepository>, ids: Arc<IdAllocator>) -> Self {
        Self {
            hierarchy: HierarchyManager::new(menu_repo.clone(), ids),
            menu_repo,
        }
    }

    /// Gets a menu by ID.
    pub async fn get(&self, id: MenuId) -> AppResult<Menu> {
        self.hierarchy.get(id).await
    }

    /// Lists all menus ordered by sort key.
    pub async fn list(&self) -> AppResult<Vec<Menu>> {
        self.hierarchy.list().await
    }

    /// Returns the whole menu forest.
    pub async fn tree(&self) -> AppResult<Vec<TreeNode<Menu>>> {
        self.hierarchy.tree().await
    }

    /// Creates a menu under its requested parent.
    pub async fn create(&self, ctx: &RequestContext, req: CreateMenu) -> AppResult<Menu> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Menu name cannot be empty"));
        }
        let menu = self.hierarchy.create(req.into_row()).await?;
        info!(menu_id = %menu.id, actor = %ctx.user_id, "Menu created");
        Ok(menu)
    }

    /// Applies a partial update. A changed parent moves the whole subtree.
    pub async fn update(&self, ctx: &RequestContext, id: MenuId, req: UpdateMenu) -> AppResult<Menu> {
        if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::validation("Menu name cannot be empty"));
        }
        let mut menu = self.hierarchy.get(id).await?;
        req.apply(&mut menu);
        let saved = self.hierarchy.update(menu).await?;
        info!(menu_id = %id, actor = %ctx.user_id, "Menu updated");
        Ok(saved)
    }

    /// Soft-deletes a leaf menu that no role references.
    pub async fn delete(&self, ctx: &RequestContext, id: MenuId) -> AppResult<()> {
        self.hierarchy.soft_delete(id, ctx.user_id).await?;
        info!(menu_id = %id, actor = %ctx.user_id, "Menu deleted");
        Ok(())
    }

    /// Menus visible to `user_id` through its roles, as a nested snapshot.
    ///
    /// This is the permission-bearing tree stored with every session.
    pub async fn user_menus(&self, user_id: UserId) -> AppResult<Vec<MenuSnapshot>> {
        let menus = self.menu_repo.find_for_user(user_id).await?;
        Ok(PermissionTree::from_menus(&menus).to_snapshot())
    }
}
