//! Access log middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

use admin_auth::AuthSession;
use admin_entity::audit::CreateAccessLog;
use admin_service::AccessLogService;

use crate::extractors::client_ip;

/// Records every mutating request (anything but `GET`/`HEAD`/`OPTIONS`) in
/// the access log.
///
/// The row is written on a spawned task after the response is produced;
/// write failures are only logged.
pub async fn record_access(
    State(logs): State<Arc<AccessLogService>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    if matches!(method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let ip = client_ip(request.headers());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let username = request
        .extensions()
        .get::<AuthSession>()
        .map(|s| s.username.clone())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(request).await;

    let entry = CreateAccessLog {
        username,
        path,
        method: method.to_string(),
        ip,
        status_code: i32::from(response.status().as_u16()),
        user_agent,
        latency_ms: i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX),
    };

    info!(
        method = %entry.method,
        path = %entry.path,
        status = entry.status_code,
        duration_ms = entry.latency_ms,
        "HTTP request"
    );

    tokio::spawn(async move {
        if let Err(e) = logs.record(entry).await {
            warn!(error = %e, "Failed to write access log");
        }
    });

    response
}
