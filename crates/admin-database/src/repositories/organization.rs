//! Organization repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;
use admin_core::traits::HierarchyRepository;
use admin_core::types::{EntityId, OrganizationId, UserId};
use admin_entity::organization::Organization;

use super::support::{lock_tree, locked_path, map_write_error, place_node, rebase_descendants};

const TABLE: &str = "sys_organizations";
const CODE_INDEX: &str = "sys_organizations_code_live_idx";
const KIND: &str = "Organization";

/// Repository for the organization tree.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a live organization by its business code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT * FROM sys_organizations WHERE code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find organization by code", e)
        })
    }
}

#[async_trait]
impl HierarchyRepository<Organization> for OrganizationRepository {
    async fn find_by_id(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT * FROM sys_organizations WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find organization", e))
    }

    async fn find_by_ids(&self, ids: &[OrganizationId]) -> AppResult<Vec<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT * FROM sys_organizations WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch organizations by id", e)
        })
    }

    async fn find_by_path_prefix(&self, prefix: &str) -> AppResult<Vec<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT * FROM sys_organizations WHERE path LIKE $1 AND deleted_at IS NULL \
             ORDER BY sort ASC, id ASC",
        )
        .bind(format!("{prefix}%"))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list organizations by path", e)
        })
    }

    async fn find_all(&self) -> AppResult<Vec<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT * FROM sys_organizations WHERE deleted_at IS NULL ORDER BY sort ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list organizations", e))
    }

    async fn insert(&self, org: &Organization) -> AppResult<Organization> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        lock_tree(&mut tx, TABLE).await?;
        let path = place_node(
            &mut tx,
            TABLE,
            KIND,
            org.id.raw(),
            org.parent_id.map(EntityId::raw),
        )
        .await?;

        let created = sqlx::query_as::<_, Organization>(
            "INSERT INTO sys_organizations \
             (id, name, code, parent_id, path, sort, status, description, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(org.id)
        .bind(&org.name)
        .bind(&org.code)
        .bind(org.parent_id)
        .bind(&path)
        .bind(org.sort)
        .bind(org.status)
        .bind(&org.description)
        .bind(org.created_by)
        .bind(org.updated_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                CODE_INDEX,
                || format!("Organization code '{}' already exists", org.code),
                "Failed to create organization",
            )
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit organization insert", e)
        })?;
        Ok(created)
    }

    async fn save_with_cascade(&self, org: &Organization) -> AppResult<Organization> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        lock_tree(&mut tx, TABLE).await?;
        let old_path = locked_path(&mut tx, TABLE, org.id.raw())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Organization {} not found", org.id)))?;
        let new_path = place_node(
            &mut tx,
            TABLE,
            KIND,
            org.id.raw(),
            org.parent_id.map(EntityId::raw),
        )
        .await?;

        let saved = sqlx::query_as::<_, Organization>(
            "UPDATE sys_organizations SET name = $2, code = $3, parent_id = $4, path = $5, \
             sort = $6, status = $7, description = $8, updated_by = $9, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING *",
        )
        .bind(org.id)
        .bind(&org.name)
        .bind(&org.code)
        .bind(org.parent_id)
        .bind(&new_path)
        .bind(org.sort)
        .bind(org.status)
        .bind(&org.description)
        .bind(org.updated_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                CODE_INDEX,
                || format!("Organization code '{}' already exists", org.code),
                "Failed to update organization",
            )
        })?
        .ok_or_else(|| AppError::not_found(format!("Organization {} not found", org.id)))?;

        if old_path != saved.path {
            let moved = rebase_descendants(&mut tx, TABLE, &old_path, &saved.path).await?;
            debug!(id = %saved.id, moved, "Rebased organization descendants");
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit organization update", e)
        })?;
        Ok(saved)
    }

    async fn count_children(&self, id: OrganizationId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sys_organizations WHERE parent_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count child organizations", e)
        })?;
        Ok(count as u64)
    }

    async fn count_dependents(&self, id: OrganizationId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sys_user_organizations uo \
             JOIN sys_users u ON u.id = uo.user_id AND u.deleted_at IS NULL \
             WHERE uo.organization_id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count organization members", e)
        })?;
        Ok(count as u64)
    }

    async fn delete(&self, id: OrganizationId, deleted_by: Option<UserId>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE sys_organizations SET deleted_at = NOW(), deleted_by = $2 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(deleted_by)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete organization", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Organization {id} not found")));
        }
        Ok(())
    }
}

