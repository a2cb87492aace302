//! User management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use admin_core::types::UserId;
use admin_core::types::pagination::PageResponse;
use admin_entity::user::{UpdateUser, User};

use crate::dto::request::{
    ChangePasswordBody, CreateUserRequest, OrganizationIdsRequest, RoleIdsRequest, UserIdsRequest,
    UserListQuery,
};
use crate::dto::response::{ApiResponse, BatchDeleteResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<User>>>> {
    let (filter, page) = query.into_parts();
    let users = state.user_service.list(&filter, &page).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.user_service.get(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    req.validate()?;
    let user = state.user_service.create(auth.context(), req.into()).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(req): Json<UpdateUser>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.user_service.update(auth.context(), id, req).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.user_service.delete(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("User deleted")))
}

/// POST /api/users/batch-delete
pub async fn batch_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UserIdsRequest>,
) -> ApiResult<Json<ApiResponse<BatchDeleteResponse>>> {
    req.validate()?;
    let deleted = state
        .user_service
        .batch_delete(auth.context(), &req.ids)
        .await?;
    Ok(Json(ApiResponse::ok(BatchDeleteResponse { deleted })))
}

/// PUT /api/users/{id}/roles
pub async fn assign_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(req): Json<RoleIdsRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .user_service
        .assign_roles(auth.context(), id, &req.role_ids)
        .await?;
    Ok(Json(ApiResponse::message("Roles assigned")))
}

/// PUT /api/users/{id}/organizations
pub async fn assign_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(req): Json<OrganizationIdsRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .user_service
        .assign_organizations(auth.context(), id, &req.organization_ids)
        .await?;
    Ok(Json(ApiResponse::message("Organizations assigned")))
}

/// PUT /api/users/{id}/password
///
/// Anyone may change their own password given the current one; resetting
/// another user's password needs `user:update`.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(req): Json<ChangePasswordBody>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    req.validate()?;
    if id != auth.user_id {
        auth.session.authorize(&["user:update"])?;
    }
    state
        .user_service
        .change_password(auth.context(), id, req.into())
        .await?;
    Ok(Json(ApiResponse::message("Password changed")))
}
