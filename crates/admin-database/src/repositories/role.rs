//! Role repository implementation.

use sqlx::PgPool;

use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;
use admin_core::types::pagination::{PageRequest, PageResponse};
use admin_core::types::{MenuId, RoleId, UserId};
use admin_entity::role::Role;

use super::support::map_write_error;

const CODE_INDEX: &str = "sys_roles_code_live_idx";

/// Repository for roles and their menu/user grants.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a live role by id.
    pub async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM sys_roles WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    /// List roles ordered by sort key, then id.
    pub async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Role>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sys_roles WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count roles", e)
                })?;

        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM sys_roles WHERE deleted_at IS NULL \
             ORDER BY sort ASC, id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))?;

        Ok(PageResponse::new(roles, page, total as u64))
    }

    /// Insert a new role.
    pub async fn create(&self, role: &Role) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO sys_roles (id, name, code, description, status, sort) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.code)
        .bind(&role.description)
        .bind(role.status)
        .bind(role.sort)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                CODE_INDEX,
                || format!("Role code '{}' already exists", role.code),
                "Failed to create role",
            )
        })
    }

    /// Persist changed role fields.
    pub async fn update(&self, role: &Role) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE sys_roles SET name = $2, code = $3, description = $4, status = $5, \
             sort = $6, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.code)
        .bind(&role.description)
        .bind(role.status)
        .bind(role.sort)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                CODE_INDEX,
                || format!("Role code '{}' already exists", role.code),
                "Failed to update role",
            )
        })?
        .ok_or_else(|| AppError::not_found(format!("Role {} not found", role.id)))
    }

    /// Soft-delete a role and drop its grants in one transaction.
    pub async fn delete(&self, id: RoleId) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let result = sqlx::query(
            "UPDATE sys_roles SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete role", e))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Role {id} not found")));
        }

        for sql in [
            "DELETE FROM sys_role_menus WHERE role_id = $1",
            "DELETE FROM sys_user_roles WHERE role_id = $1",
        ] {
            sqlx::query(sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to drop role grants", e)
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit role delete", e))
    }

    /// Menus granted to a role.
    pub async fn menu_ids_of(&self, id: RoleId) -> AppResult<Vec<MenuId>> {
        sqlx::query_scalar::<_, MenuId>(
            "SELECT menu_id FROM sys_role_menus WHERE role_id = $1 ORDER BY menu_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load role menus", e))
    }

    /// Replace all menu grants of a role.
    pub async fn replace_menus(&self, id: RoleId, menu_ids: &[MenuId]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM sys_role_menus WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear role menus", e))?;

        if !menu_ids.is_empty() {
            sqlx::query(
                "INSERT INTO sys_role_menus (role_id, menu_id) \
                 SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(menu_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to grant role menus", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit role menus", e))
    }

    /// Replace the set of users holding a role.
    pub async fn replace_users(&self, id: RoleId, user_ids: &[UserId]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM sys_user_roles WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear role users", e))?;

        if !user_ids.is_empty() {
            sqlx::query(
                "INSERT INTO sys_user_roles (user_id, role_id) \
                 SELECT UNNEST($2::BIGINT[]), $1 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(user_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to grant role users", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit role users", e))
    }
}
