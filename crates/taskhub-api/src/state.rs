//! Shared application state for HTTP handlers.

use std::sync::Arc;

use taskhub_auth::jwt::decoder::JwtDecoder;
use taskhub_realtime::RealtimeEngine;
use taskhub_service::NotificationService;

/// State threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    /// Real-time engine.
    pub engine: Arc<RealtimeEngine>,
    /// Recipient-facing notification service.
    pub notifications: Arc<NotificationService>,
    /// JWT decoder for the `AuthUser` extractor.
    pub jwt_decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}
