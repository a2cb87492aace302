//! Access log repository implementation.

use sqlx::PgPool;

use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;
use admin_core::types::AccessLogId;
use admin_core::types::pagination::{PageRequest, PageResponse};
use admin_entity::audit::{AccessLog, AccessLogFilter};

/// Append-only store of access log entries.
#[derive(Debug, Clone)]
pub struct AccessLogRepository {
    pool: PgPool,
}

impl AccessLogRepository {
    /// Create a new access log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn create(&self, entry: &AccessLog) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO sys_access_logs \
             (id, username, path, method, ip, status_code, user_agent, latency_ms, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(entry.id)
        .bind(&entry.username)
        .bind(&entry.path)
        .bind(&entry.method)
        .bind(&entry.ip)
        .bind(entry.status_code)
        .bind(&entry.user_agent)
        .bind(entry.latency_ms)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write access log", e))?;
        Ok(())
    }

    /// Delete entries by id, returning how many existed.
    pub async fn delete_many(&self, ids: &[AccessLogId]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sys_access_logs WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete access logs", e)
            })?;
        Ok(result.rows_affected())
    }

    /// List entries matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AccessLog>> {
        const WHERE: &str = "WHERE ($1::text IS NULL OR username ILIKE '%' || $1 || '%') \
             AND ($2::text IS NULL OR path ILIKE '%' || $2 || '%') \
             AND ($3::timestamptz IS NULL OR created_at >= $3) \
             AND ($4::timestamptz IS NULL OR created_at <= $4)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM sys_access_logs {WHERE}"))
                .bind(filter.username.as_deref())
                .bind(filter.path.as_deref())
                .bind(filter.start_time)
                .bind(filter.end_time)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count access logs", e)
                })?;

        let entries = sqlx::query_as::<_, AccessLog>(&format!(
            "SELECT * FROM sys_access_logs {WHERE} ORDER BY created_at DESC, id DESC \
             LIMIT $5 OFFSET $6"
        ))
        .bind(filter.username.as_deref())
        .bind(filter.path.as_deref())
        .bind(filter.start_time)
        .bind(filter.end_time)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list access logs", e))?;

        Ok(PageResponse::new(entries, page, total as u64))
    }
}
