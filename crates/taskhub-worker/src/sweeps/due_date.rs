//! Due-date scanner — deduplicated deadline reminders.
//!
//! Two independently scheduled sweeps query tasks nearing their deadline,
//! skip any task that already has a pending unread reminder of the same
//! kind, and otherwise persist a notification and push it live. The unread
//! check makes the notification store itself the deduplication ledger;
//! once the recipient marks a reminder read, the next sweep re-notifies.
//!
//! The existence check and the subsequent insert are separate store
//! round-trips, so two sweeps interleaving around the same check can both
//! create a reminder. Accepted as a low-probability duplicate; a unique
//! index on (recipient, task, type, unread) would close it at the store
//! layer.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use taskhub_core::config::scheduler::SchedulerConfig;
use taskhub_core::result::AppResult;
use taskhub_core::traits::Clock;
use taskhub_database::store::{NotificationStore, TaskStore};
use taskhub_entity::notification::{NotificationDraft, kind};
use taskhub_entity::priority::Priority;
use taskhub_entity::task::Task;
use taskhub_realtime::RealtimeEngine;

/// Which sweep is running; controls horizon, wording, and priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReminderKind {
    /// Coarse horizon, day-granularity count, task's own priority.
    Upcoming,
    /// 24-hour horizon, hour-granularity count, escalated priority.
    Urgent,
}

/// Counts from one sweep execution.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepOutcome {
    /// Tasks returned by the deadline query.
    pub scanned: usize,
    /// New reminders created and pushed live.
    pub notified: usize,
    /// Tasks skipped (no assignee, no deadline, or pending unread reminder).
    pub skipped: usize,
}

/// Scans for approaching deadlines and emits deduplicated reminders.
pub struct DueDateScanner {
    /// Task deadline queries.
    tasks: Arc<dyn TaskStore>,
    /// Dedup ledger (unread-existence checks).
    notifications: Arc<dyn NotificationStore>,
    /// Persist-and-push funnel.
    engine: Arc<RealtimeEngine>,
    /// Time source, injectable for tests.
    clock: Arc<dyn Clock>,
    /// Horizon configuration.
    config: SchedulerConfig,
}

impl std::fmt::Debug for DueDateScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DueDateScanner").finish()
    }
}

impl DueDateScanner {
    /// Creates a new scanner.
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        notifications: Arc<dyn NotificationStore>,
        engine: Arc<RealtimeEngine>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            tasks,
            notifications,
            engine,
            clock,
            config,
        }
    }

    /// Runs the upcoming-deadline sweep (default horizon: 3 days).
    ///
    /// A store failure aborts this execution with an error; the next
    /// scheduled firing retries independently.
    pub async fn run_upcoming_sweep(&self) -> AppResult<SweepOutcome> {
        self.run_sweep(
            Duration::days(self.config.upcoming_horizon_days),
            ReminderKind::Upcoming,
        )
        .await
    }

    /// Runs the urgent-deadline sweep (default horizon: 24 hours).
    pub async fn run_urgent_sweep(&self) -> AppResult<SweepOutcome> {
        self.run_sweep(
            Duration::hours(self.config.urgent_horizon_hours),
            ReminderKind::Urgent,
        )
        .await
    }

    async fn run_sweep(&self, horizon: Duration, sweep: ReminderKind) -> AppResult<SweepOutcome> {
        let now = self.clock.now();
        let due = self.tasks.find_due_within(now, horizon).await?;

        let mut outcome = SweepOutcome {
            scanned: due.len(),
            ..SweepOutcome::default()
        };

        for task in &due {
            match self.remind(task, now, sweep).await {
                Ok(true) => outcome.notified += 1,
                Ok(false) => outcome.skipped += 1,
                Err(e) => {
                    // One bad task must not starve the rest of the sweep.
                    warn!(task_id = %task.id, error = %e, "Failed to emit reminder");
                    outcome.skipped += 1;
                }
            }
        }

        info!(
            sweep = ?sweep,
            scanned = outcome.scanned,
            notified = outcome.notified,
            skipped = outcome.skipped,
            "Due-date sweep finished"
        );

        Ok(outcome)
    }

    /// Emits one reminder for a task, unless the dedup predicate or a
    /// missing assignee/deadline rules it out. Returns whether a
    /// notification was created.
    async fn remind(
        &self,
        task: &Task,
        now: DateTime<Utc>,
        sweep: ReminderKind,
    ) -> AppResult<bool> {
        let Some(assignee_id) = task.assignee_id else {
            return Ok(false);
        };
        let Some(due_at) = task.due_at else {
            return Ok(false);
        };

        let (notification_type, title, message, priority) = match sweep {
            ReminderKind::Upcoming => {
                let days = days_until(now, due_at);
                (
                    kind::DUE_DATE_REMINDER,
                    "Task Due Soon",
                    format!(
                        "Task \"{}\" is due in {} day{}",
                        task.title,
                        days,
                        plural(days)
                    ),
                    task.priority,
                )
            }
            ReminderKind::Urgent => {
                let hours = hours_until(now, due_at);
                (
                    kind::URGENT_DUE_DATE_REMINDER,
                    "Urgent: Task Due Soon",
                    format!(
                        "Task \"{}\" is due in {} hour{}",
                        task.title,
                        hours,
                        plural(hours)
                    ),
                    escalate(task.priority),
                )
            }
        };

        if self
            .notifications
            .exists_unread(assignee_id, task.id, notification_type)
            .await?
        {
            debug!(
                task_id = %task.id,
                assignee_id = %assignee_id,
                notification_type,
                "Unread reminder already pending, skipping"
            );
            return Ok(false);
        }

        let draft = NotificationDraft {
            recipient_id: assignee_id,
            sender_id: None,
            notification_type: notification_type.to_string(),
            title: title.to_string(),
            message,
            related_task_id: Some(task.id),
            related_project_id: task.project_id,
            priority,
        };

        Ok(self.engine.deliver(draft).await?.is_some())
    }
}

/// Ceiling of the remaining time in whole days.
fn days_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let seconds = (due - now).num_seconds();
    (seconds + 86_399) / 86_400
}

/// Ceiling of the remaining time in whole hours.
fn hours_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let seconds = (due - now).num_seconds();
    (seconds + 3_599) / 3_600
}

/// Urgent-sweep escalation: urgent stays urgent, everything else is
/// forced to high.
fn escalate(priority: Priority) -> Priority {
    if priority == Priority::Urgent {
        Priority::Urgent
    } else {
        Priority::High
    }
}

fn plural(count: i64) -> &'static str {
    if count == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    use taskhub_auth::jwt::decoder::JwtDecoder;
    use taskhub_auth::jwt::encoder::JwtEncoder;
    use taskhub_core::config::auth::AuthConfig;
    use taskhub_core::config::realtime::RealtimeConfig;
    use taskhub_core::error::AppError;
    use taskhub_core::types::pagination::{PageRequest, PageResponse};
    use taskhub_database::store::UserStore;
    use taskhub_entity::notification::Notification;
    use taskhub_entity::task::TaskStatus;
    use taskhub_entity::user::{UserRole, UserSummary};
    use taskhub_service::notification::producer::NotificationProducer;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[derive(Default)]
    struct MemoryNotificationStore {
        rows: Mutex<Vec<Notification>>,
    }

    impl MemoryNotificationStore {
        fn all(&self) -> Vec<Notification> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationStore for MemoryNotificationStore {
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

    struct FakeTaskStore {
        tasks: Vec<Task>,
    }

    #[async_trait]
    impl TaskStore for FakeTaskStore {
        async fn find_due_within(
            &self,
            from: DateTime<Utc>,
            horizon: Duration,
        ) -> AppResult<Vec<Task>> {
            let until = from + horizon;
            Ok(self
                .tasks
                .iter()
                .filter(|t| {
                    t.due_at
                        .map(|due| due > from && due <= until)
                        .unwrap_or(false)
                        && !t.status.is_completed()
                })
                .cloned()
                .collect())
        }
    }

    struct FailingTaskStore;

    #[async_trait]
    impl TaskStore for FailingTaskStore {
        async fn find_due_within(&self, _: DateTime<Utc>, _: Duration) -> AppResult<Vec<Task>> {
            Err(AppError::database("connection refused"))
        }
    }

    struct FakeUserStore {
        users: Vec<UserSummary>,
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn find_summary(&self, user_id: Uuid) -> AppResult<Option<UserSummary>> {
            Ok(self.users.iter().find(|u| u.id == user_id).cloned())
        }
    }

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "sweep-test-secret".to_string(),
            jwt_access_ttl_minutes: 15,
        }
    }

    fn engine(
        store: Arc<MemoryNotificationStore>,
        users: Vec<UserSummary>,
    ) -> Arc<RealtimeEngine> {
        Arc::new(RealtimeEngine::new(
            RealtimeConfig::default(),
            Arc::new(JwtDecoder::new(&auth_config())),
            Arc::new(FakeUserStore { users }),
            Arc::new(NotificationProducer::new(store)),
        ))
    }

    fn scanner(
        tasks: Vec<Task>,
        store: Arc<MemoryNotificationStore>,
        engine: Arc<RealtimeEngine>,
        now: DateTime<Utc>,
    ) -> DueDateScanner {
        DueDateScanner::new(
            Arc::new(FakeTaskStore { tasks }),
            store,
            engine,
            Arc::new(FixedClock(now)),
            SchedulerConfig::default(),
        )
    }

    fn task_due_in(now: DateTime<Utc>, until_due: Duration, priority: Priority) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Quarterly report".to_string(),
            description: None,
            status: TaskStatus::InProgress,
            priority,
            due_at: Some(now + until_due),
            assignee_id: Some(Uuid::new_v4()),
            department_id: None,
            project_id: None,
            created_by: Uuid::new_v4(),
            created_at: now - Duration::days(7),
            updated_at: now - Duration::days(1),
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-03-02T10:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn test_upcoming_sweep_creates_one_reminder() {
        let now = now();
        let task = task_due_in(now, Duration::days(2), Priority::High);
        let assignee = task.assignee_id.unwrap();

        let store = Arc::new(MemoryNotificationStore::default());
        let engine = engine(store.clone(), vec![]);
        let scanner = scanner(vec![task.clone()], store.clone(), engine, now);

        let outcome = scanner.run_upcoming_sweep().await.unwrap();
        assert_eq!(outcome.notified, 1);

        let rows = store.all();
        assert_eq!(rows.len(), 1);
        let n = &rows[0];
        assert_eq!(n.recipient_id, assignee);
        assert_eq!(n.notification_type, kind::DUE_DATE_REMINDER);
        assert_eq!(n.title, "Task Due Soon");
        assert_eq!(n.message, "Task \"Quarterly report\" is due in 2 days");
        assert_eq!(n.priority, Priority::High);
        assert_eq!(n.related_task_id, Some(task.id));
        assert!(n.sender_id.is_none());
        assert!(n.is_unread());
    }

    #[tokio::test]
    async fn test_second_sweep_is_deduplicated_while_unread() {
        let now = now();
        let task = task_due_in(now, Duration::days(2), Priority::Medium);

        let store = Arc::new(MemoryNotificationStore::default());
        let engine = engine(store.clone(), vec![]);
        let scanner = scanner(vec![task], store.clone(), engine, now);

        scanner.run_upcoming_sweep().await.unwrap();
        let outcome = scanner.run_upcoming_sweep().await.unwrap();

        assert_eq!(outcome.notified, 0);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn test_read_reminder_allows_renotification() {
        let now = now();
        let task = task_due_in(now, Duration::days(2), Priority::Medium);
        let assignee = task.assignee_id.unwrap();

        let store = Arc::new(MemoryNotificationStore::default());
        let engine = engine(store.clone(), vec![]);
        let scanner = scanner(vec![task], store.clone(), engine, now);

        scanner.run_upcoming_sweep().await.unwrap();
        let first = store.all()[0].clone();
        store
            .mark_read(first.id, assignee, Utc::now())
            .await
            .unwrap();

        let outcome = scanner.run_upcoming_sweep().await.unwrap();
        assert_eq!(outcome.notified, 1);
        assert_eq!(store.all().len(), 2);
    }

    #[tokio::test]
    async fn test_urgent_sweep_escalates_priority() {
        let now = now();
        let medium = task_due_in(now, Duration::hours(5), Priority::Medium);
        let urgent = task_due_in(now, Duration::hours(5), Priority::Urgent);

        let store = Arc::new(MemoryNotificationStore::default());
        let engine = engine(store.clone(), vec![]);
        let scanner = scanner(vec![medium.clone(), urgent.clone()], store.clone(), engine, now);

        scanner.run_urgent_sweep().await.unwrap();

        let rows = store.all();
        assert_eq!(rows.len(), 2);

        let for_medium = rows
            .iter()
            .find(|n| n.related_task_id == Some(medium.id))
            .unwrap();
        assert_eq!(for_medium.priority, Priority::High);
        assert_eq!(for_medium.notification_type, kind::URGENT_DUE_DATE_REMINDER);
        assert_eq!(for_medium.title, "Urgent: Task Due Soon");
        assert_eq!(
            for_medium.message,
            "Task \"Quarterly report\" is due in 5 hours"
        );

        let for_urgent = rows
            .iter()
            .find(|n| n.related_task_id == Some(urgent.id))
            .unwrap();
        assert_eq!(for_urgent.priority, Priority::Urgent);
    }

    #[tokio::test]
    async fn test_sweeps_deduplicate_independently() {
        // An unread upcoming reminder does not suppress the urgent sweep:
        // the dedup triple includes the notification type.
        let now = now();
        let task = task_due_in(now, Duration::hours(20), Priority::Medium);

        let store = Arc::new(MemoryNotificationStore::default());
        let engine = engine(store.clone(), vec![]);
        let scanner = scanner(vec![task], store.clone(), engine, now);

        scanner.run_upcoming_sweep().await.unwrap();
        scanner.run_urgent_sweep().await.unwrap();

        assert_eq!(store.all().len(), 2);
    }

    #[tokio::test]
    async fn test_unassigned_and_undated_tasks_are_skipped() {
        let now = now();
        let mut unassigned = task_due_in(now, Duration::days(1), Priority::Medium);
        unassigned.assignee_id = None;

        let store = Arc::new(MemoryNotificationStore::default());
        let engine = engine(store.clone(), vec![]);
        let scanner = scanner(vec![unassigned], store.clone(), engine, now);

        let outcome = scanner.run_upcoming_sweep().await.unwrap();
        assert_eq!(outcome.notified, 0);
        assert_eq!(outcome.skipped, 1);
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_aborts_sweep_with_error() {
        let now = now();
        let store = Arc::new(MemoryNotificationStore::default());
        let engine = engine(store.clone(), vec![]);

        let scanner = DueDateScanner::new(
            Arc::new(FailingTaskStore),
            store.clone(),
            engine,
            Arc::new(FixedClock(now)),
            SchedulerConfig::default(),
        );

        assert!(scanner.run_upcoming_sweep().await.is_err());
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn test_reminder_is_pushed_live_to_connected_assignee() {
        let now = now();
        let task = task_due_in(now, Duration::days(2), Priority::Medium);
        let assignee_id = task.assignee_id.unwrap();

        let assignee = UserSummary {
            id: assignee_id,
            name: "Noor".to_string(),
            email: "noor@example.com".to_string(),
            role: UserRole::Employee,
            department_id: None,
            department_name: None,
        };

        let store = Arc::new(MemoryNotificationStore::default());
        let engine = engine(store.clone(), vec![assignee]);

        let (handle, mut rx) = engine.connections.connect();
        let encoder = JwtEncoder::new(&auth_config());
        let (token, _) = encoder.generate_access_token(assignee_id).unwrap();
        engine.connections.authenticate(&handle.id, &token).await;
        while rx.try_recv().is_ok() {}

        let scanner = scanner(vec![task], store, engine, now);
        scanner.run_upcoming_sweep().await.unwrap();

        let live = rx.try_recv().expect("live notification expected");
        let event: serde_json::Value = serde_json::from_str(&live).unwrap();
        assert_eq!(event["event"], "notification");
        assert_eq!(
            event["notification"]["recipient_id"],
            assignee_id.to_string()
        );
    }

    #[test]
    fn test_days_until_is_ceiling() {
        let now = now();
        assert_eq!(days_until(now, now + Duration::days(2)), 2);
        assert_eq!(days_until(now, now + Duration::hours(36)), 2);
        assert_eq!(days_until(now, now + Duration::seconds(1)), 1);
        assert_eq!(days_until(now, now + Duration::hours(49)), 3);
    }

    #[test]
    fn test_hours_until_is_ceiling() {
        let now = now();
        assert_eq!(hours_until(now, now + Duration::hours(5)), 5);
        assert_eq!(hours_until(now, now + Duration::minutes(270)), 5);
        assert_eq!(hours_until(now, now + Duration::seconds(1)), 1);
    }

    #[test]
    fn test_escalation_rules() {
        assert_eq!(escalate(Priority::Low), Priority::High);
        assert_eq!(escalate(Priority::Medium), Priority::High);
        assert_eq!(escalate(Priority::High), Priority::High);
        assert_eq!(escalate(Priority::Urgent), Priority::Urgent);
    }
}
