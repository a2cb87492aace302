//! Auth handlers: login, logout, me, menus.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use validator::Validate;

use admin_entity::session::MenuSnapshot;
use admin_service::{LoginResult, UserProfile};

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, client_ip};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResult>>> {
    req.validate()?;
    let ip = client_ip(&headers);

    let result = state
        .auth_service
        .login(&req.username, &req.password, &ip)
        .await?;

    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.auth_service.logout(&auth.session).await?;
    Ok(Json(ApiResponse::message("Logged out successfully")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
    let profile = state.auth_service.current_user(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /api/auth/menus
pub async fn menus(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<MenuSnapshot>>>> {
    let menus = state.auth_service.session_menus(&auth.session).await?;
    Ok(Json(ApiResponse::ok(menus)))
}
