//! Dictionary handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use admin_core::types::pagination::PageResponse;
use admin_core::types::{DictItemId, DictTypeId};
use admin_entity::dict::{DictItem, DictType, UpdateDictItem, UpdateDictType};

use crate::dto::request::{CreateDictItemRequest, CreateDictTypeRequest};
use crate::dto::response::{AllDictsResponse, ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/dicts
pub async fn list_types(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<DictType>>>> {
    let dicts = state
        .dict_service
        .list_types(&params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(dicts)))
}

/// GET /api/dicts/all-with-items
pub async fn all_with_items(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<AllDictsResponse>>> {
    let dicts = state.dict_service.all_with_items().await?;
    Ok(Json(ApiResponse::ok(AllDictsResponse { dicts })))
}

/// GET /api/dicts/{id}
pub async fn get_type(
    State(state): State<AppState>,
    Path(id): Path<DictTypeId>,
) -> ApiResult<Json<ApiResponse<DictType>>> {
    let dict = state.dict_service.get_type(id).await?;
    Ok(Json(ApiResponse::ok(dict)))
}

/// POST /api/dicts
pub async fn create_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateDictTypeRequest>,
) -> ApiResult<Json<ApiResponse<DictType>>> {
    req.validate()?;
    let dict = state
        .dict_service
        .create_type(auth.context(), req.into())
        .await?;
    Ok(Json(ApiResponse::ok(dict)))
}

/// PUT /api/dicts/{id}
pub async fn update_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DictTypeId>,
    Json(req): Json<UpdateDictType>,
) -> ApiResult<Json<ApiResponse<DictType>>> {
    let dict = state
        .dict_service
        .update_type(auth.context(), id, req)
        .await?;
    Ok(Json(ApiResponse::ok(dict)))
}

/// DELETE /api/dicts/{id}
pub async fn delete_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DictTypeId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.dict_service.delete_type(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("Dictionary deleted")))
}

/// GET /api/dicts/{code}/items
pub async fn items(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<DictItem>>>> {
    let items = state.dict_service.items_by_code(&code).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// POST /api/dicts/{code}/items
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(code): Path<String>,
    Json(req): Json<CreateDictItemRequest>,
) -> ApiResult<Json<ApiResponse<DictItem>>> {
    req.validate()?;
    let item = state
        .dict_service
        .create_item(auth.context(), &code, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// PUT /api/dict-items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DictItemId>,
    Json(req): Json<UpdateDictItem>,
) -> ApiResult<Json<ApiResponse<DictItem>>> {
    let item = state
        .dict_service
        .update_item(auth.context(), id, req)
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}

/// DELETE /api/dict-items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DictItemId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.dict_service.delete_item(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("Dictionary item deleted")))
}
