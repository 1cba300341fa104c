//! Connection authentication — resolves bearer tokens to user summaries.

use std::sync::Arc;

use taskhub_auth::jwt::decoder::JwtDecoder;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_database::store::UserStore;
use taskhub_entity::user::UserSummary;

/// Authenticates connections using JWT bearer tokens.
#[derive(Clone)]
pub struct WsAuthenticator {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
    /// User lookup collaborator.
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new authenticator.
    pub fn new(decoder: Arc<JwtDecoder>, users: Arc<dyn UserStore>) -> Self {
        Self { decoder, users }
    }

    /// Resolves a bearer token to the public summary of an active user.
    ///
    /// Tolerates a "Bearer " prefix. Fails with an authentication error
    /// when the token is missing, invalid, expired, or resolves to a user
    /// id with no matching active record.
    pub async fn authenticate(&self, token: &str) -> AppResult<UserSummary> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        if token.is_empty() {
            return Err(AppError::authentication("Missing authentication token"));
        }

        let claims = self.decoder.decode_access_token(token)?;

        self.users
            .find_summary(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("No active user for token"))
    }
}
