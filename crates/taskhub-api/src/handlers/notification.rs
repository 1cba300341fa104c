//! Notification handlers — recipient-scoped read-state transitions.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use taskhub_core::types::pagination::PageRequest;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state
        .notifications
        .list_notifications(auth.user_id, page)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = state.notifications.unread_count(auth.user_id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "count": count } }),
    ))
}

/// PUT /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notifications.mark_read(auth.user_id, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Marked as read" } }),
    ))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = state.notifications.mark_all_read(auth.user_id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "marked": count } }),
    ))
}

/// DELETE /api/notifications/:id
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notifications.delete(auth.user_id, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Deleted" } }),
    ))
}
