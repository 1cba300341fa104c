//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use taskhub_auth::jwt::decoder::JwtDecoder;
use taskhub_core::config::realtime::RealtimeConfig;
use taskhub_core::result::AppResult;
use taskhub_database::store::UserStore;
use taskhub_entity::notification::{Notification, NotificationDraft};
use taskhub_entity::task::{Task, TaskComment};
use taskhub_service::notification::producer::NotificationProducer;

use crate::connection::authenticator::WsAuthenticator;
use crate::connection::manager::ConnectionManager;
use crate::connection::registry::ConnectionRegistry;
use crate::events::fanout::TaskEventFanout;
use crate::message::types::{ActorRef, OutboundEvent, PushTarget};
use crate::presence::tracker::PresenceTracker;
use crate::room::registry::RoomRegistry;
use crate::router::BroadcastRouter;

/// Central engine coordinating connections, rooms, presence, fan-out, and
/// live notification delivery.
///
/// Constructed once at process start and torn down at shutdown; every
/// collaborator receives a handle rather than reaching into globals.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager (lifecycle + inbound dispatch).
    pub connections: Arc<ConnectionManager>,
    /// Connection and binding tables.
    pub registry: Arc<ConnectionRegistry>,
    /// Room membership tables.
    pub rooms: Arc<RoomRegistry>,
    /// Delivery channel.
    pub router: Arc<BroadcastRouter>,
    /// Presence derivation.
    pub presence: Arc<PresenceTracker>,
    /// Task fan-out.
    pub events: Arc<TaskEventFanout>,
    /// Notification creation funnel.
    producer: Arc<NotificationProducer>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        decoder: Arc<JwtDecoder>,
        users: Arc<dyn UserStore>,
        producer: Arc<NotificationProducer>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());
        let router = Arc::new(BroadcastRouter::new(registry.clone(), rooms.clone()));
        let presence = Arc::new(PresenceTracker::new(router.clone()));
        let events = Arc::new(TaskEventFanout::new(router.clone()));
        let authenticator = WsAuthenticator::new(decoder, users);
        let connections = Arc::new(ConnectionManager::new(
            config,
            registry.clone(),
            rooms.clone(),
            router.clone(),
            presence.clone(),
            events.clone(),
            authenticator,
        ));

        info!("Real-time engine initialized");

        Self {
            connections,
            registry,
            rooms,
            router,
            presence,
            events,
            producer,
            shutdown_tx,
        }
    }

    /// A task was created. Fire-and-forget; invoked after the mutation
    /// commits.
    pub fn on_task_created(&self, task: &Task, actor: &ActorRef) {
        self.events.task_created(task, actor);
    }

    /// A task was updated. Fire-and-forget.
    pub fn on_task_updated(&self, task: &Task, actor: &ActorRef) {
        self.events.task_updated(task, actor);
    }

    /// A task was deleted. The department id must be captured before the
    /// record is destroyed. Fire-and-forget.
    pub fn on_task_deleted(&self, task_id: Uuid, department_id: Option<Uuid>, actor: &ActorRef) {
        self.events.task_deleted(task_id, department_id, actor);
    }

    /// A comment was added. Fire-and-forget.
    pub fn on_comment_added(&self, comment: &TaskComment, author: &ActorRef) {
        self.events.comment_added(comment, author);
    }

    /// Generic push to one user or to everyone.
    pub fn broadcast_to_user(&self, target: PushTarget, event: &OutboundEvent) {
        self.router.push(target, event);
    }

    /// Persists a notification through the producer and, unless it was
    /// suppressed, delivers it live to the recipient's room.
    ///
    /// This is the single funnel shared by the due-date sweeps and the
    /// CRUD collaborators.
    pub async fn deliver(&self, draft: NotificationDraft) -> AppResult<Option<Notification>> {
        let Some(notification) = self.producer.create(draft).await? else {
            return Ok(None);
        };

        self.router.push(
            PushTarget::User(notification.recipient_id),
            &OutboundEvent::Notification {
                notification: notification.clone(),
            },
        );

        Ok(Some(notification))
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");

        let _ = self.shutdown_tx.send(());
        self.connections.disconnect_all();

        info!("Real-time engine shut down");
    }
}
