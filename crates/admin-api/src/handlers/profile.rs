//! Self-service profile handlers.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use admin_entity::user::User;

use crate::dto::request::UpdateProfileRequest;
use crate::dto::response::{ApiResponse, ProfileUpdateResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/profile
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.user_service.get(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/profile
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<ProfileUpdateResponse>>> {
    let req = req.normalized();
    req.validate()?;
    let user = state
        .user_service
        .update_profile(auth.context(), req.into())
        .await?;
    Ok(Json(ApiResponse::ok(ProfileUpdateResponse {
        message: "Profile updated".to_string(),
        user,
    })))
}
