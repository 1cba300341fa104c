//! Task entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::priority::Priority;

use super::status::TaskStatus;

/// A work item assigned within a department.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique task identifier.
    pub id: Uuid,
    /// Short title.
    pub title: String,
    /// Longer free-form description.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Priority level.
    pub priority: Priority,
    /// Deadline, if one is set.
    pub due_at: Option<DateTime<Utc>>,
    /// The user this task is assigned to.
    pub assignee_id: Option<Uuid>,
    /// The department this task belongs to.
    pub department_id: Option<Uuid>,
    /// The project this task belongs to.
    pub project_id: Option<Uuid>,
    /// The user who created the task.
    pub created_by: Uuid,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Check whether the task is overdue relative to the given instant.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_at.map(|due| due < now).unwrap_or(false) && !self.status.is_completed()
    }
}
