//! Task comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A comment left on a task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskComment {
    /// Unique comment identifier.
    pub id: Uuid,
    /// The task this comment belongs to.
    pub task_id: Uuid,
    /// The user who wrote the comment.
    pub author_id: Uuid,
    /// Comment body.
    pub content: String,
    /// When the comment was created.
    pub created_at: DateTime<Utc>,
}
