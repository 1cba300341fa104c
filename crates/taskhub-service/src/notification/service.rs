//! Recipient-facing notification management.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_database::store::NotificationStore;
use taskhub_entity::notification::Notification;

/// Manages a recipient's own notifications.
///
/// Every operation is scoped to the calling recipient; nobody can read or
/// mutate someone else's notifications through this service.
#[derive(Clone)]
pub struct NotificationService {
    /// Durable notification storage.
    store: Arc<dyn NotificationStore>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Lists notifications for the given recipient, newest first.
    pub async fn list_notifications(
        &self,
        recipient_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.store.find_by_recipient(recipient_id, &page).await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, recipient_id: Uuid) -> AppResult<i64> {
        self.store.count_unread(recipient_id).await
    }

    /// Marks a notification as read, stamping the read time.
    pub async fn mark_read(&self, recipient_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let updated = self
            .store
            .mark_read(notification_id, recipient_id, Utc::now())
            .await?;
        if !updated {
            return Err(AppError::not_found("Notification not found"));
        }
        Ok(())
    }

    /// Marks all notifications as read for the recipient.
    pub async fn mark_all_read(&self, recipient_id: Uuid) -> AppResult<u64> {
        self.store.mark_all_read(recipient_id, Utc::now()).await
    }

    /// Deletes a notification.
    pub async fn delete(&self, recipient_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let deleted = self.store.delete(notification_id, recipient_id).await?;
        if !deleted {
            return Err(AppError::not_found("Notification not found"));
        }
        Ok(())
    }
}
