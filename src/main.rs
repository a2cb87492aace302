//! Siqian Admin Server: RBAC administration backend.
//!
//! Main entry point that loads configuration, wires all crates together,
//! and starts the HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use admin_api::{AppState, build_app};
use admin_cache::CacheManager;
use admin_core::config::{AppConfig, LogFormat};
use admin_core::error::AppError;
use admin_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `ADMIN_ENV` overlay, and `ADMIN__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("ADMIN_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Siqian admin server");

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;

    // ── Step 2: Cache (session whitelist) ────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 3: Services and HTTP app ────────────────────────────
    let cors = config.server.cors.clone();
    let addr = config.server.bind_address();
    let state = AppState::build(config, db.clone(), cache)?;
    tracing::info!(machine_id = state.ids.machine_id(), "ID allocator ready");
    let app = build_app(state, &cors);

    // ── Step 4: Serve until Ctrl-C ───────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Shutting down, closing database pool");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
