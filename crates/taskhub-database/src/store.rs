//! Store traits consumed by the real-time and worker layers.
//!
//! The concrete implementations live in [`crate::repositories`]; tests
//! substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use taskhub_core::result::AppResult;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_entity::notification::{Notification, NotificationDraft};
use taskhub_entity::task::Task;
use taskhub_entity::user::UserSummary;

/// Resolves user ids to public summaries.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Loads the public summary of an active user. Returns `None` when no
    /// matching active user exists.
    async fn find_summary(&self, user_id: Uuid) -> AppResult<Option<UserSummary>>;
}

/// Task deadline queries used by the due-date sweeps.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns tasks whose deadline lies in `(from, from + horizon]` and
    /// whose status is not the terminal completed state.
    async fn find_due_within(
        &self,
        from: DateTime<Utc>,
        horizon: Duration,
    ) -> AppResult<Vec<Task>>;
}

/// Durable notification storage.
///
/// The unread-existence check doubles as the deduplication ledger for the
/// due-date sweeps; there is no separate scan cursor.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persists a new notification and returns the stored row.
    async fn create(&self, draft: &NotificationDraft) -> AppResult<Notification>;

    /// Checks whether an unread notification already exists for the given
    /// (recipient, related task, type) triple.
    async fn exists_unread(
        &self,
        recipient_id: Uuid,
        related_task_id: Uuid,
        notification_type: &str,
    ) -> AppResult<bool>;

    /// Lists notifications addressed to a recipient, newest first.
    async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Counts unread notifications for a recipient.
    async fn count_unread(&self, recipient_id: Uuid) -> AppResult<i64>;

    /// Flips the read flag and stamps the read time. Returns `false` when
    /// the notification does not exist or belongs to someone else.
    async fn mark_read(
        &self,
        notification_id: Uuid,
        recipient_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Marks all of a recipient's notifications read. Returns the number
    /// of rows updated.
    async fn mark_all_read(&self, recipient_id: Uuid, read_at: DateTime<Utc>) -> AppResult<u64>;

    /// Deletes a notification. Recipient-initiated only. Returns `false`
    /// when nothing was deleted.
    async fn delete(&self, notification_id: Uuid, recipient_id: Uuid) -> AppResult<bool>;
}
