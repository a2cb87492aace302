//! Role handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use admin_core::types::pagination::PageResponse;
use admin_core::types::{MenuId, RoleId};
use admin_entity::role::{Role, UpdateRole};

use crate::dto::request::{CreateRoleRequest, MenuIdsRequest, RoleUsersRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/roles
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Role>>>> {
    let roles = state
        .role_service
        .list(&params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(roles)))
}

/// GET /api/roles/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
) -> ApiResult<Json<ApiResponse<Role>>> {
    let role = state.role_service.get(id).await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// POST /api/roles
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRoleRequest>,
) -> ApiResult<Json<ApiResponse<Role>>> {
    req.validate()?;
    let role = state.role_service.create(auth.context(), req.into()).await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// PUT /api/roles/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RoleId>,
    Json(req): Json<UpdateRole>,
) -> ApiResult<Json<ApiResponse<Role>>> {
    let role = state.role_service.update(auth.context(), id, req).await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// DELETE /api/roles/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RoleId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.role_service.delete(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("Role deleted")))
}

/// GET /api/roles/{id}/menus
pub async fn menus(
    State(state): State<AppState>,
    Path(id): Path<RoleId>,
) -> ApiResult<Json<ApiResponse<Vec<MenuId>>>> {
    let menu_ids = state.role_service.menus_of(id).await?;
    Ok(Json(ApiResponse::ok(menu_ids)))
}

/// PUT /api/roles/{id}/menus
pub async fn assign_menus(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RoleId>,
    Json(req): Json<MenuIdsRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .role_service
        .assign_menus(auth.context(), id, &req.menu_ids)
        .await?;
    Ok(Json(ApiResponse::message("Menus assigned")))
}

/// PUT /api/roles/{id}/users
pub async fn assign_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RoleId>,
    Json(req): Json<RoleUsersRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .role_service
        .assign_users(auth.context(), id, &req.user_ids)
        .await?;
    Ok(Json(ApiResponse::message("Users assigned")))
}
