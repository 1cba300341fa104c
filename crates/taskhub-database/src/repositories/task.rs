//! Task repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::task::{Task, TaskStatus};

use crate::store::TaskStore;

/// Repository for task deadline queries.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn find_due_within(
        &self,
        from: DateTime<Utc>,
        horizon: Duration,
    ) -> AppResult<Vec<Task>> {
        let until = from + horizon;

        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks \
             WHERE due_at > $1 AND due_at <= $2 AND status <> $3 \
             ORDER BY due_at ASC",
        )
        .bind(from)
        .bind(until)
        .bind(TaskStatus::Completed)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query due tasks", e))
    }
}
