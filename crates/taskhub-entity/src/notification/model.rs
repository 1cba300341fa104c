//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::priority::Priority;

/// A durable, recipient-addressed message.
///
/// Created through the notification producer; mutated only by read-state
/// transitions; deleted only by the recipient.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub recipient_id: Uuid,
    /// The user whose action produced this notification. `None` means
    /// system-generated (e.g. a deadline reminder).
    pub sender_id: Option<Uuid>,
    /// Free-form type tag (e.g. "due_date_reminder").
    pub notification_type: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Related task, if any.
    pub related_task_id: Option<Uuid>,
    /// Related project, if any.
    pub related_project_id: Option<Uuid>,
    /// Priority level.
    pub priority: Priority,
    /// Whether the recipient has read this notification.
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

/// Parameters for creating a new notification.
///
/// The producer turns a draft into a persisted [`Notification`] unless the
/// self-notify suppression rule applies (recipient equals sender).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// The recipient user.
    pub recipient_id: Uuid,
    /// The acting user, or `None` for system-generated notifications.
    pub sender_id: Option<Uuid>,
    /// Free-form type tag.
    pub notification_type: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Related task, if any.
    pub related_task_id: Option<Uuid>,
    /// Related project, if any.
    pub related_project_id: Option<Uuid>,
    /// Priority level.
    pub priority: Priority,
}

impl NotificationDraft {
    /// Check whether the draft would notify its own sender.
    pub fn is_self_notification(&self) -> bool {
        self.sender_id == Some(self.recipient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(recipient: Uuid, sender: Option<Uuid>) -> NotificationDraft {
        NotificationDraft {
            recipient_id: recipient,
            sender_id: sender,
            notification_type: "test".to_string(),
            title: "t".to_string(),
            message: "m".to_string(),
            related_task_id: None,
            related_project_id: None,
            priority: Priority::default(),
        }
    }

    #[test]
    fn test_self_notification_detection() {
        let id = Uuid::new_v4();
        assert!(draft(id, Some(id)).is_self_notification());
        assert!(!draft(id, Some(Uuid::new_v4())).is_self_notification());
        assert!(!draft(id, None).is_self_notification());
    }
}
