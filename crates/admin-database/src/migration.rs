//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use admin_core::error::{AppError, ErrorKind};
use admin_core::result::AppResult;

/// Apply every migration under `migrations/` that has not run yet.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations applied");
    Ok(())
}
