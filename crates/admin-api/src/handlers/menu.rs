//! Menu tree handlers.

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use admin_core::types::MenuId;
use admin_entity::TreeNode;
use admin_entity::menu::{Menu, UpdateMenu};

use crate::dto::request::CreateMenuRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/menus
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Menu>>>> {
    let menus = state.menu_service.list().await?;
    Ok(Json(ApiResponse::ok(menus)))
}

/// GET /api/menus/tree
pub async fn tree(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<TreeNode<Menu>>>>> {
    let tree = state.menu_service.tree().await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/menus/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<MenuId>,
) -> ApiResult<Json<ApiResponse<Menu>>> {
    let menu = state.menu_service.get(id).await?;
    Ok(Json(ApiResponse::ok(menu)))
}

/// POST /api/menus
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateMenuRequest>,
) -> ApiResult<Json<ApiResponse<Menu>>> {
    req.validate()?;
    let menu = state.menu_service.create(auth.context(), req.into()).await?;
    Ok(Json(ApiResponse::ok(menu)))
}

/// PUT /api/menus/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MenuId>,
    Json(req): Json<UpdateMenu>,
) -> ApiResult<Json<ApiResponse<Menu>>> {
    let menu = state.menu_service.update(auth.context(), id, req).await?;
    Ok(Json(ApiResponse::ok(menu)))
}

/// DELETE /api/menus/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<MenuId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.menu_service.delete(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("Menu deleted")))
}
