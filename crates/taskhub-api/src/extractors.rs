//! `AuthUser` extractor — pulls the JWT from the Authorization header and
//! validates it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use taskhub_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller, available to any handler that asks for it.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The caller's user id.
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode_access_token(token)?;

        Ok(AuthUser {
            user_id: claims.user_id(),
        })
    }
}
