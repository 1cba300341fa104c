//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::user::UserSummary;

use crate::store::UserStore;

/// Repository for user lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_summary(&self, user_id: Uuid) -> AppResult<Option<UserSummary>> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT u.id, u.name, u.email, u.role, u.department_id, d.name AS department_name \
             FROM users u \
             LEFT JOIN departments d ON d.id = u.department_id \
             WHERE u.id = $1 AND u.is_active = TRUE",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user summary", e))
    }
}
