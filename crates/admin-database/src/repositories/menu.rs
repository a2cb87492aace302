//! Menu repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;
use admin_core::traits::HierarchyRepository;
use admin_core::types::{EntityId, MenuId, UserId};
use admin_entity::menu::Menu;

use super::support::{lock_tree, locked_path, place_node, rebase_descendants};

const TABLE: &str = "sys_menus";
const KIND: &str = "Menu";

/// Repository for the menu and button tree.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: PgPool,
}

impl MenuRepository {
    /// Create a new menu repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinct menus reachable from the user's enabled roles.
    ///
    /// Only enabled, visible, live menus are returned, ordered by sort key
    /// then id.
    pub async fn find_for_user(&self, user_id: UserId) -> AppResult<Vec<Menu>> {
        sqlx::query_as::<_, Menu>(
            "SELECT DISTINCT m.* FROM sys_menus m \
             JOIN sys_role_menus rm ON rm.menu_id = m.id \
             JOIN sys_user_roles ur ON ur.role_id = rm.role_id \
             JOIN sys_roles r ON r.id = ur.role_id \
                AND r.deleted_at IS NULL AND r.status = 'enabled' \
             WHERE ur.user_id = $1 \
               AND m.deleted_at IS NULL \
               AND m.status = 'enabled' \
               AND m.hidden = FALSE \
             ORDER BY m.sort ASC, m.id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user menus", e))
    }
}

#[async_trait]
impl HierarchyRepository<Menu> for MenuRepository {
    async fn find_by_id(&self, id: MenuId) -> AppResult<Option<Menu>> {
        sqlx::query_as::<_, Menu>("SELECT * FROM sys_menus WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find menu", e))
    }

    async fn find_by_ids(&self, ids: &[MenuId]) -> AppResult<Vec<Menu>> {
        sqlx::query_as::<_, Menu>(
            "SELECT * FROM sys_menus WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch menus by id", e))
    }

    async fn find_by_path_prefix(&self, prefix: &str) -> AppResult<Vec<Menu>> {
        sqlx::query_as::<_, Menu>(
            "SELECT * FROM sys_menus WHERE path LIKE $1 AND deleted_at IS NULL \
             ORDER BY sort ASC, id ASC",
        )
        .bind(format!("{prefix}%"))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list menus by path", e))
    }

    async fn find_all(&self) -> AppResult<Vec<Menu>> {
        sqlx::query_as::<_, Menu>(
            "SELECT * FROM sys_menus WHERE deleted_at IS NULL ORDER BY sort ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list menus", e))
    }

    async fn insert(&self, menu: &Menu) -> AppResult<Menu> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        lock_tree(&mut tx, TABLE).await?;
        let path = place_node(
            &mut tx,
            TABLE,
            KIND,
            menu.id.raw(),
            menu.parent_id.map(EntityId::raw),
        )
        .await?;

        let created = sqlx::query_as::<_, Menu>(
            "INSERT INTO sys_menus \
             (id, name, parent_id, path, component, icon, kind, sort, status, permission, \
              route, hidden, keep_alive) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING *",
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.parent_id)
        .bind(&path)
        .bind(&menu.component)
        .bind(&menu.icon)
        .bind(menu.kind)
        .bind(menu.sort)
        .bind(menu.status)
        .bind(&menu.permission)
        .bind(&menu.route)
        .bind(menu.hidden)
        .bind(menu.keep_alive)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create menu", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit menu insert", e)
        })?;
        Ok(created)
    }

    async fn save_with_cascade(&self, menu: &Menu) -> AppResult<Menu> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        lock_tree(&mut tx, TABLE).await?;
        let old_path = locked_path(&mut tx, TABLE, menu.id.raw())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Menu {} not found", menu.id)))?;
        let new_path = place_node(
            &mut tx,
            TABLE,
            KIND,
            menu.id.raw(),
            menu.parent_id.map(EntityId::raw),
        )
        .await?;

        let saved = sqlx::query_as::<_, Menu>(
            "UPDATE sys_menus SET name = $2, parent_id = $3, path = $4, component = $5, \
             icon = $6, kind = $7, sort = $8, status = $9, permission = $10, route = $11, \
             hidden = $12, keep_alive = $13, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.parent_id)
        .bind(&new_path)
        .bind(&menu.component)
        .bind(&menu.icon)
        .bind(menu.kind)
        .bind(menu.sort)
        .bind(menu.status)
        .bind(&menu.permission)
        .bind(&menu.route)
        .bind(menu.hidden)
        .bind(menu.keep_alive)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update menu", e))?
        .ok_or_else(|| AppError::not_found(format!("Menu {} not found", menu.id)))?;

        if old_path != saved.path {
            let moved = rebase_descendants(&mut tx, TABLE, &old_path, &saved.path).await?;
            debug!(id = %saved.id, moved, "Rebased menu descendants");
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit menu update", e)
        })?;
        Ok(saved)
    }

    async fn count_children(&self, id: MenuId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sys_menus WHERE parent_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count child menus", e))?;
        Ok(count as u64)
    }

    async fn count_dependents(&self, id: MenuId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sys_role_menus rm \
             JOIN sys_roles r ON r.id = rm.role_id AND r.deleted_at IS NULL \
             WHERE rm.menu_id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count menu grants", e))?;
        Ok(count as u64)
    }

    async fn delete(&self, id: MenuId, deleted_by: Option<UserId>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE sys_menus SET deleted_at = NOW(), deleted_by = $2 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(deleted_by)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete menu", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Menu {id} not found")));
        }
        Ok(())
    }
}
