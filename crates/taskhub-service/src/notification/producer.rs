//! Notification producer — the single creation funnel.

use std::sync::Arc;

use tracing::debug;

use taskhub_core::result::AppResult;
use taskhub_database::store::NotificationStore;
use taskhub_entity::notification::{Notification, NotificationDraft};

/// Creates notifications on behalf of every producer in the system (the
/// due-date sweeps here, CRUD handlers elsewhere).
///
/// Self-notifications are suppressed at this single point: a draft whose
/// sender equals its recipient performs no write and yields `None`. That
/// is a defined no-op, not an error.
#[derive(Clone)]
pub struct NotificationProducer {
    /// Durable notification storage.
    store: Arc<dyn NotificationStore>,
}

impl std::fmt::Debug for NotificationProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationProducer").finish()
    }
}

impl NotificationProducer {
    /// Create a new producer over the given store.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Persist a notification, unless the draft would notify its own
    /// sender.
    pub async fn create(&self, draft: NotificationDraft) -> AppResult<Option<Notification>> {
        if draft.is_self_notification() {
            debug!(
                recipient_id = %draft.recipient_id,
                notification_type = %draft.notification_type,
                "Suppressed self-notification"
            );
            return Ok(None);
        }

        let notification = self.store.create(&draft).await?;
        Ok(Some(notification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;
    use uuid::Uuid;

    use taskhub_core::types::pagination::{PageRequest, PageResponse};
    use taskhub_entity::priority::Priority;

    /// In-memory notification store used across service and worker tests.
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationStore for MemoryStore {
        async fn create(&self, draft: &NotificationDraft) -> AppResult<Notification> {
            let row = Notification {
                id: Uuid::new_v4(),
                recipient_id: draft.recipient_id,
                sender_id: draft.sender_id,
                notification_type: draft.notification_type.clone(),
                title: draft.title.clone(),
                message: draft.message.clone(),
                related_task_id: draft.related_task_id,
                related_project_id: draft.related_project_id,
                priority: draft.priority,
                is_read: false,
                read_at: None,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn exists_unread(
            &self,
            recipient_id: Uuid,
            related_task_id: Uuid,
            notification_type: &str,
        ) -> AppResult<bool> {
            Ok(self.rows.lock().unwrap().iter().any(|n| {
                n.recipient_id == recipient_id
                    && n.related_task_id == Some(related_task_id)
                    && n.notification_type == notification_type
                    && !n.is_read
            }))
        }

        async fn find_by_recipient(
            &self,
            recipient_id: Uuid,
            page: &PageRequest,
        ) -> AppResult<PageResponse<Notification>> {
            let rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.recipient_id == recipient_id)
                .cloned()
                .collect();
            let total = rows.len() as u64;
            Ok(PageResponse::new(rows, page.page, page.page_size, total))
        }

        async fn count_unread(&self, recipient_id: Uuid) -> AppResult<i64> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.recipient_id == recipient_id && !n.is_read)
                .count() as i64)
        }

        async fn mark_read(
            &self,
            notification_id: Uuid,
            recipient_id: Uuid,
            read_at: DateTime<Utc>,
        ) -> AppResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            for n in rows.iter_mut() {
                if n.id == notification_id && n.recipient_id == recipient_id {
                    n.is_read = true;
                    n.read_at = Some(read_at);
                    return Ok(true);
                }
            }
            Ok(false)
        }

        async fn mark_all_read(
            &self,
            recipient_id: Uuid,
            read_at: DateTime<Utc>,
        ) -> AppResult<u64> {
            let mut rows = self.rows.lock().unwrap();
            let mut updated = 0;
            for n in rows.iter_mut() {
                if n.recipient_id == recipient_id && !n.is_read {
                    n.is_read = true;
                    n.read_at = Some(read_at);
                    updated += 1;
                }
            }
            Ok(updated)
        }

        async fn delete(&self, notification_id: Uuid, recipient_id: Uuid) -> AppResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|n| !(n.id == notification_id && n.recipient_id == recipient_id));
            Ok(rows.len() < before)
        }
    }

    fn draft(recipient: Uuid, sender: Option<Uuid>) -> NotificationDraft {
        NotificationDraft {
            recipient_id: recipient,
            sender_id: sender,
            notification_type: "task_assigned".to_string(),
            title: "New Task".to_string(),
            message: "You have been assigned a task".to_string(),
            related_task_id: Some(Uuid::new_v4()),
            related_project_id: None,
            priority: Priority::Medium,
        }
    }

    #[tokio::test]
    async fn test_create_persists_and_returns_row() {
        let store = Arc::new(MemoryStore::default());
        let producer = NotificationProducer::new(store.clone());

        let recipient = Uuid::new_v4();
        let created = producer
            .create(draft(recipient, Some(Uuid::new_v4())))
            .await
            .unwrap();

        let row = created.expect("notification should be created");
        assert_eq!(row.recipient_id, recipient);
        assert!(row.is_unread());
        assert_eq!(store.count_unread(recipient).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_self_notification_is_suppressed() {
        let store = Arc::new(MemoryStore::default());
        let producer = NotificationProducer::new(store.clone());

        let user = Uuid::new_v4();
        let created = producer.create(draft(user, Some(user))).await.unwrap();

        assert!(created.is_none());
        assert_eq!(store.count_unread(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_system_notification_has_no_sender() {
        let store = Arc::new(MemoryStore::default());
        let producer = NotificationProducer::new(store);

        let created = producer
            .create(draft(Uuid::new_v4(), None))
            .await
            .unwrap()
            .expect("system notifications are never suppressed");
        assert!(created.sender_id.is_none());
    }
}
