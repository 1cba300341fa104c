//! Connection manager — inbound dispatch and the per-connection state
//! machine (connected → authenticated → disconnected).

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use taskhub_core::config::realtime::RealtimeConfig;
use taskhub_entity::task::{Task, TaskComment};
use uuid::Uuid;

use crate::events::fanout::TaskEventFanout;
use crate::message::types::{ActorRef, InboundEvent, OutboundEvent};
use crate::presence::tracker::PresenceTracker;
use crate::room::names;
use crate::room::registry::RoomRegistry;
use crate::router::BroadcastRouter;

use super::authenticator::WsAuthenticator;
use super::handle::{ConnectionHandle, ConnectionId};
use super::registry::ConnectionRegistry;

/// Orchestrates connection lifecycle and client-originated events.
///
/// All mutations of the registry tables flow through here; a connection's
/// faults are isolated to that connection and never propagate.
pub struct ConnectionManager {
    /// Configuration.
    config: RealtimeConfig,
    /// Connection and binding tables.
    registry: Arc<ConnectionRegistry>,
    /// Room membership tables.
    rooms: Arc<RoomRegistry>,
    /// Delivery channel.
    router: Arc<BroadcastRouter>,
    /// Presence derivation.
    presence: Arc<PresenceTracker>,
    /// Task fan-out for client-relayed updates.
    events: Arc<TaskEventFanout>,
    /// Token verification + user resolution.
    authenticator: WsAuthenticator,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager").finish()
    }
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomRegistry>,
        router: Arc<BroadcastRouter>,
        presence: Arc<PresenceTracker>,
        events: Arc<TaskEventFanout>,
        authenticator: WsAuthenticator,
    ) -> Self {
        Self {
            config,
            registry,
            rooms,
            router,
            presence,
            events,
            authenticator,
        }
    }

    /// Registers a new, not yet authenticated connection.
    ///
    /// Returns the handle and the receiver half of its outbound queue for
    /// the transport task to pump.
    pub fn connect(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(tx));

        self.registry.insert(handle.clone());

        info!(conn_id = %handle.id, "Connection registered");

        (handle, rx)
    }

    /// Processes one inbound message from a client.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        let event: InboundEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "Ignoring malformed message");
                return;
            }
        };

        match event {
            InboundEvent::Authenticate { token } => self.authenticate(conn_id, &token).await,
            InboundEvent::JoinRoom { room } => self.join_room(conn_id, room),
            InboundEvent::LeaveRoom { room } => self.leave_room(conn_id, &room),
            InboundEvent::TaskUpdate { task } => self.relay_task_update(conn_id, &task),
            InboundEvent::TaskComment { comment } => self.relay_task_comment(conn_id, &comment),
            InboundEvent::TypingStart { task_id } => self.relay_typing(conn_id, task_id, true),
            InboundEvent::TypingStop { task_id } => self.relay_typing(conn_id, task_id, false),
            InboundEvent::UserOnline => self.reannounce_presence(conn_id),
        }
    }

    /// Authenticates a connection with a bearer token.
    ///
    /// On success: binds the identity (overwriting any prior binding for
    /// this connection or this user), auto-joins the user and department
    /// rooms, acknowledges, and announces presence. On failure: informs
    /// the connection and forcibly terminates it — no retry at this layer.
    pub async fn authenticate(&self, conn_id: &ConnectionId, token: &str) {
        let user = match self.authenticator.authenticate(token).await {
            Ok(user) => user,
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "Authentication failed");
                self.router.send_to_connection(
                    conn_id,
                    &OutboundEvent::AuthError {
                        message: e.message.clone(),
                    },
                );
                if let Some(handle) = self.registry.get(conn_id) {
                    handle.close();
                }
                return;
            }
        };

        // The connection may have gone away while the lookup was in flight.
        let Some(handle) = self.registry.get(conn_id) else {
            return;
        };

        self.registry.bind(handle.id, user.clone());
        self.rooms.join(names::user(user.id), handle.id);
        if let Some(department_id) = user.department_id {
            self.rooms.join(names::department(department_id), handle.id);
        }

        self.router
            .send_to_connection(conn_id, &OutboundEvent::Authenticated { user: user.clone() });
        self.presence.broadcast_online(&user);

        info!(conn_id = %conn_id, user_id = %user.id, "Connection authenticated");
    }

    /// Joins a room. Silently ignored for unauthenticated connections —
    /// only authenticated connections may manipulate membership.
    pub fn join_room(&self, conn_id: &ConnectionId, room: String) {
        if !self.registry.is_authenticated(conn_id) {
            debug!(
                conn_id = %conn_id,
                room = %room,
                "Ignoring join from unauthenticated connection"
            );
            return;
        }

        if self.rooms.membership_count(*conn_id) >= self.config.max_rooms_per_connection {
            warn!(conn_id = %conn_id, room = %room, "Room membership limit reached, ignoring join");
            return;
        }

        self.rooms.join(room.clone(), *conn_id);
        self.router
            .send_to_connection(conn_id, &OutboundEvent::JoinedRoom { room });
    }

    /// Leaves a room. Silently ignored for unauthenticated connections.
    pub fn leave_room(&self, conn_id: &ConnectionId, room: &str) {
        if !self.registry.is_authenticated(conn_id) {
            debug!(
                conn_id = %conn_id,
                room = %room,
                "Ignoring leave from unauthenticated connection"
            );
            return;
        }

        self.rooms.leave(room, *conn_id);
        self.router.send_to_connection(
            conn_id,
            &OutboundEvent::LeftRoom {
                room: room.to_string(),
            },
        );
    }

    /// Tears down all registry state for a connection.
    ///
    /// If an identity was bound, broadcasts one "offline" presence event.
    /// Idempotent: the second call finds nothing to remove.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        let Some((handle, binding)) = self.registry.remove(conn_id) else {
            return;
        };

        if let Some(user) = binding {
            self.presence.broadcast_offline(&user);
            info!(conn_id = %conn_id, user_id = %user.id, "Connection disconnected");
        } else {
            info!(conn_id = %conn_id, "Connection disconnected (unauthenticated)");
        }

        self.rooms.leave_all(*conn_id);
        handle.close();
    }

    /// Closes every live connection (shutdown path).
    pub fn disconnect_all(&self) {
        for handle in self.registry.all_handles() {
            self.disconnect(&handle.id);
        }
    }

    fn relay_task_update(&self, conn_id: &ConnectionId, task: &Task) {
        let Some(user) = self.registry.identity(conn_id) else {
            return;
        };
        self.events.task_updated(task, &ActorRef::from(&user));
    }

    fn relay_task_comment(&self, conn_id: &ConnectionId, comment: &TaskComment) {
        let Some(user) = self.registry.identity(conn_id) else {
            return;
        };
        self.events.comment_added(comment, &ActorRef::from(&user));
    }

    /// Relays a typing indicator to the task room, excluding the
    /// originator. Ephemeral: no persistence, no debounce — rapid
    /// repeated starts simply re-emit.
    fn relay_typing(&self, conn_id: &ConnectionId, task_id: Uuid, started: bool) {
        let Some(user) = self.registry.identity(conn_id) else {
            return;
        };

        let event = if started {
            OutboundEvent::UserTyping {
                task_id,
                user_id: user.id,
                user_name: user.name.clone(),
            }
        } else {
            OutboundEvent::UserStoppedTyping {
                task_id,
                user_id: user.id,
                user_name: user.name.clone(),
            }
        };

        self.router
            .emit_except(&names::task(task_id), *conn_id, &event);
    }

    fn reannounce_presence(&self, conn_id: &ConnectionId) {
        if let Some(user) = self.registry.identity(conn_id) {
            self.presence.broadcast_online(&user);
        }
    }
}
