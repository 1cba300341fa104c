//! TaskHub Server — real-time collaboration backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use taskhub_api::AppState;
use taskhub_auth::jwt::decoder::JwtDecoder;
use taskhub_core::config::AppConfig;
use taskhub_core::error::AppError;
use taskhub_core::traits::SystemClock;
use taskhub_database::repositories::{NotificationRepository, TaskRepository, UserRepository};
use taskhub_database::store::{NotificationStore, TaskStore, UserStore};
use taskhub_realtime::RealtimeEngine;
use taskhub_service::{NotificationProducer, NotificationService};
use taskhub_worker::{DueDateScanner, SweepScheduler};

#[tokio::main]
async fn main() {
    let env = std::env::var("TASKHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TaskHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection ──────────────────────────────────────
    tracing::info!("Connecting to database...");
    let pool = taskhub_database::connection::create_pool(&config.database).await?;

    // ── Repositories ─────────────────────────────────────────────
    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
    let tasks: Arc<dyn TaskStore> = Arc::new(TaskRepository::new(pool.clone()));
    let notifications: Arc<dyn NotificationStore> =
        Arc::new(NotificationRepository::new(pool.clone()));

    // ── Services ─────────────────────────────────────────────────
    let producer = Arc::new(NotificationProducer::new(notifications.clone()));
    let notification_service = Arc::new(NotificationService::new(notifications.clone()));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    // ── Real-time engine ─────────────────────────────────────────
    let engine = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        jwt_decoder.clone(),
        users,
        producer,
    ));

    // ── Due-date sweeps ──────────────────────────────────────────
    let scanner = Arc::new(DueDateScanner::new(
        tasks,
        notifications,
        engine.clone(),
        Arc::new(SystemClock),
        config.scheduler.clone(),
    ));
    let scheduler = SweepScheduler::new(scanner, config.scheduler.clone()).await?;
    scheduler.register_sweeps().await?;
    scheduler.start().await?;

    // ── HTTP server ──────────────────────────────────────────────
    let state = AppState {
        engine: engine.clone(),
        notifications: notification_service,
        jwt_decoder,
    };
    let app = taskhub_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Graceful teardown ────────────────────────────────────────
    engine.shutdown();
    scheduler.shutdown().await?;

    tracing::info!("TaskHub stopped");
    Ok(())
}

/// Resolves when the process receives a termination signal.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
