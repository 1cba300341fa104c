//! Database connection pool creation.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use taskhub_core::config::DatabaseConfig;
use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;

/// Creates a PostgreSQL connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect(&config.url)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to connect to database", e))
}
