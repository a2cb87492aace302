//! Health check handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use admin_core::traits::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = state.db.health_check().await.unwrap_or_else(|e| {
        warn!(error = %e, "Database health check failed");
        false
    });
    let cache = match state.cache.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            false
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        status: if database && cache { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        cache,
    }))
}
