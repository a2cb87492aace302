//! Dictionary type and item repository implementation.

use sqlx::PgPool;

use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;
use admin_core::types::pagination::{PageRequest, PageResponse};
use admin_core::types::{DictItemId, DictTypeId};
use admin_entity::dict::{DictItem, DictType};

use super::support::map_write_error;

const CODE_INDEX: &str = "sys_dict_types_code_live_idx";

/// Repository for dictionaries.
#[derive(Debug, Clone)]
pub struct DictRepository {
    pool: PgPool,
}

impl DictRepository {
    /// Create a new dictionary repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a live dictionary type by id.
    pub async fn find_type(&self, id: DictTypeId) -> AppResult<Option<DictType>> {
        sqlx::query_as::<_, DictType>(
            "SELECT * FROM sys_dict_types WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find dict type", e))
    }

    /// Find a live dictionary type by code.
    pub async fn find_type_by_code(&self, code: &str) -> AppResult<Option<DictType>> {
        sqlx::query_as::<_, DictType>(
            "SELECT * FROM sys_dict_types WHERE code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find dict type by code", e)
        })
    }

    /// List dictionary types.
    pub async fn list_types(&self, page: &PageRequest) -> AppResult<PageResponse<DictType>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sys_dict_types WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count dict types", e)
                })?;

        let types = sqlx::query_as::<_, DictType>(
            "SELECT * FROM sys_dict_types WHERE deleted_at IS NULL \
             ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list dict types", e))?;

        Ok(PageResponse::new(types, page, total as u64))
    }

    /// Insert a dictionary type.
    pub async fn create_type(&self, dict: &DictType) -> AppResult<DictType> {
        sqlx::query_as::<_, DictType>(
            "INSERT INTO sys_dict_types (id, name, code, status, description) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(dict.id)
        .bind(&dict.name)
        .bind(&dict.code)
        .bind(dict.status)
        .bind(&dict.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                CODE_INDEX,
                || format!("Dictionary code '{}' already exists", dict.code),
                "Failed to create dict type",
            )
        })
    }

    /// Persist changed dictionary type fields.
    pub async fn update_type(&self, dict: &DictType) -> AppResult<DictType> {
        sqlx::query_as::<_, DictType>(
            "UPDATE sys_dict_types SET name = $2, code = $3, status = $4, description = $5, \
             updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(dict.id)
        .bind(&dict.name)
        .bind(&dict.code)
        .bind(dict.status)
        .bind(&dict.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                CODE_INDEX,
                || format!("Dictionary code '{}' already exists", dict.code),
                "Failed to update dict type",
            )
        })?
        .ok_or_else(|| AppError::not_found(format!("Dictionary {} not found", dict.id)))
    }

    /// Soft-delete a dictionary type together with its items.
    pub async fn delete_type(&self, id: DictTypeId) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let result = sqlx::query(
            "UPDATE sys_dict_types SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete dict type", e))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Dictionary {id} not found")));
        }

        sqlx::query(
            "UPDATE sys_dict_items SET deleted_at = NOW() \
             WHERE dict_type_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete dict items", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit dict delete", e)
        })
    }

    /// Find a live item by id.
    pub async fn find_item(&self, id: DictItemId) -> AppResult<Option<DictItem>> {
        sqlx::query_as::<_, DictItem>(
            "SELECT * FROM sys_dict_items WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find dict item", e))
    }

    /// Every live type ordered by id.
    pub async fn all_types(&self) -> AppResult<Vec<DictType>> {
        sqlx::query_as::<_, DictType>(
            "SELECT * FROM sys_dict_types WHERE deleted_at IS NULL ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list dict types", e))
    }

    /// Every live item of a live type, grouped by type and ordered by sort
    /// key, then id.
    pub async fn all_items(&self) -> AppResult<Vec<DictItem>> {
        sqlx::query_as::<_, DictItem>(
            "SELECT i.* FROM sys_dict_items i \
             JOIN sys_dict_types t ON t.id = i.dict_type_id AND t.deleted_at IS NULL \
             WHERE i.deleted_at IS NULL \
             ORDER BY i.dict_type_id ASC, i.sort ASC, i.id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list dict items", e))
    }

    /// Items of a dictionary type ordered by sort key, then id.
    pub async fn items_of(&self, dict_type_id: DictTypeId) -> AppResult<Vec<DictItem>> {
        sqlx::query_as::<_, DictItem>(
            "SELECT * FROM sys_dict_items WHERE dict_type_id = $1 AND deleted_at IS NULL \
             ORDER BY sort ASC, id ASC",
        )
        .bind(dict_type_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list dict items", e))
    }

    /// Insert a dictionary item.
    pub async fn create_item(&self, item: &DictItem) -> AppResult<DictItem> {
        sqlx::query_as::<_, DictItem>(
            "INSERT INTO sys_dict_items (id, dict_type_id, label, value, sort, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(item.id)
        .bind(item.dict_type_id)
        .bind(&item.label)
        .bind(&item.value)
        .bind(item.sort)
        .bind(item.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create dict item", e))
    }

    /// Persist changed item fields.
    pub async fn update_item(&self, item: &DictItem) -> AppResult<DictItem> {
        sqlx::query_as::<_, DictItem>(
            "UPDATE sys_dict_items SET label = $2, value = $3, sort = $4, status = $5, \
             updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(item.id)
        .bind(&item.label)
        .bind(&item.value)
        .bind(item.sort)
        .bind(item.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update dict item", e))?
        .ok_or_else(|| AppError::not_found(format!("Dictionary item {} not found", item.id)))
    }

    /// Soft-delete an item.
    pub async fn delete_item(&self, id: DictItemId) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE sys_dict_items SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete dict item", e))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Dictionary item {id} not found")));
        }
        Ok(())
    }
}
