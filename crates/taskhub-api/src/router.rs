//! Route table.

use axum::Router;
use axum::routing::{delete, get, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, notification, ws};
use crate::state::AppState;

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/health", get(health::health_check))
        .route("/api/notifications", get(notification::list_notifications))
        .route(
            "/api/notifications/unread-count",
            get(notification::unread_count),
        )
        .route(
            "/api/notifications/read-all",
            put(notification::mark_all_read),
        )
        .route("/api/notifications/{id}/read", put(notification::mark_read))
        .route(
            "/api/notifications/{id}",
            delete(notification::delete_notification),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
