//! Access log handlers.

use axum::Json;
use axum::extract::{Query, State};
use validator::Validate;

use admin_core::types::pagination::PageResponse;
use admin_entity::audit::AccessLog;

use crate::dto::request::{AccessLogIdsRequest, AccessLogQuery};
use crate::dto::response::{ApiResponse, BatchDeleteResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/logs
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AccessLogQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<AccessLog>>>> {
    let (filter, page) = query.into_parts();
    let logs = state.access_log_service.list(&filter, &page).await?;
    Ok(Json(ApiResponse::ok(logs)))
}

/// DELETE /api/logs
pub async fn batch_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AccessLogIdsRequest>,
) -> ApiResult<Json<ApiResponse<BatchDeleteResponse>>> {
    req.validate()?;
    let deleted = state
        .access_log_service
        .batch_delete(auth.context(), &req.ids)
        .await?;
    Ok(Json(ApiResponse::ok(BatchDeleteResponse { deleted })))
}
