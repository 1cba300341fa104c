//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.engine.registry.connection_count(),
    }))
}
