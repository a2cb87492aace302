//! Organization tree handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use admin_core::types::pagination::PageResponse;
use admin_core::types::OrganizationId;
use admin_entity::TreeNode;
use admin_entity::organization::{Organization, UpdateOrganization};
use admin_entity::user::User;

use crate::dto::request::{CreateOrganizationRequest, MoveOrganizationRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/organizations
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<Organization>>>> {
    let orgs = state.organization_service.list().await?;
    Ok(Json(ApiResponse::ok(orgs)))
}

/// GET /api/organizations/tree
pub async fn tree(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<TreeNode<Organization>>>>> {
    let tree = state.organization_service.tree().await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/organizations/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
) -> ApiResult<Json<ApiResponse<Organization>>> {
    let org = state.organization_service.get(id).await?;
    Ok(Json(ApiResponse::ok(org)))
}

/// POST /api/organizations
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateOrganizationRequest>,
) -> ApiResult<Json<ApiResponse<Organization>>> {
    req.validate()?;
    let org = state
        .organization_service
        .create(auth.context(), req.into())
        .await?;
    Ok(Json(ApiResponse::ok(org)))
}

/// PUT /api/organizations/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<OrganizationId>,
    Json(req): Json<UpdateOrganization>,
) -> ApiResult<Json<ApiResponse<Organization>>> {
    let org = state
        .organization_service
        .update(auth.context(), id, req)
        .await?;
    Ok(Json(ApiResponse::ok(org)))
}

/// PUT /api/organizations/{id}/parent
pub async fn move_to(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<OrganizationId>,
    Json(req): Json<MoveOrganizationRequest>,
) -> ApiResult<Json<ApiResponse<Organization>>> {
    let org = state
        .organization_service
        .move_to(auth.context(), id, req.parent_id)
        .await?;
    Ok(Json(ApiResponse::ok(org)))
}

/// DELETE /api/organizations/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<OrganizationId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.organization_service.delete(auth.context(), id).await?;
    Ok(Json(ApiResponse::message("Organization deleted")))
}

/// GET /api/organizations/{id}/ancestors
pub async fn ancestors(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
) -> ApiResult<Json<ApiResponse<Vec<Organization>>>> {
    let orgs = state.organization_service.ancestors(id).await?;
    Ok(Json(ApiResponse::ok(orgs)))
}

/// GET /api/organizations/{id}/descendants
pub async fn descendants(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
) -> ApiResult<Json<ApiResponse<Vec<Organization>>>> {
    let orgs = state.organization_service.descendants(id).await?;
    Ok(Json(ApiResponse::ok(orgs)))
}

/// GET /api/organizations/{id}/subtree
pub async fn subtree(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
) -> ApiResult<Json<ApiResponse<TreeNode<Organization>>>> {
    let tree = state.organization_service.subtree(id).await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/organizations/{id}/users
pub async fn users(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<User>>>> {
    let page = state
        .user_service
        .list_by_organization(id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
