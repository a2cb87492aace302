//! Access log service.

use std::sync::Arc;

use tracing::info;

use admin_core::error::AppError;
use admin_core::id::IdAllocator;
use admin_core::result::AppResult;
use admin_core::types::AccessLogId;
use admin_core::types::pagination::{PageRequest, PageResponse};
use admin_database::repositories::AccessLogRepository;
use admin_entity::audit::{AccessLog, AccessLogFilter, CreateAccessLog};

use crate::context::RequestContext;

/// Records and lists access log entries.
#[derive(Debug, Clone)]
pub struct AccessLogService {
    log_repo: Arc<AccessLogRepository>,
    ids: Arc<IdAllocator>,
}

impl AccessLogService {
    /// Creates a new access log service.
    pub fn new(log_repo: Arc<AccessLogRepository>, ids: Arc<IdAllocator>) -> Self {
        Self { log_repo, ids }
    }

    /// Appends one entry.
    pub async fn record(&self, entry: CreateAccessLog) -> AppResult<()> {
        let row = entry.into_row(AccessLogId::from(self.ids.next_id()?));
        self.log_repo.create(&row).await
    }

    /// Lists entries matching `filter`, newest first.
    pub async fn list(
        &self,
        filter: &AccessLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AccessLog>> {
        self.log_repo.list(filter, &page.normalized()).await
    }

    /// Deletes entries by id, returning how many were removed. Unknown ids
    /// are skipped.
    pub async fn batch_delete(&self, ctx: &RequestContext, ids: &[AccessLogId]) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::validation("No log entries selected"));
        }
        let removed = self.log_repo.delete_many(ids).await?;
        info!(requested = ids.len(), removed, actor = %ctx.user_id, "Access logs deleted");
        Ok(removed)
    }
}
