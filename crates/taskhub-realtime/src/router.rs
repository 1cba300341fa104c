//! Broadcast router — pure delivery of events to rooms and connections.

use std::sync::Arc;

use tracing::{error, trace, warn};

use crate::connection::handle::ConnectionId;
use crate::connection::registry::ConnectionRegistry;
use crate::message::types::{OutboundEvent, PushTarget};
use crate::room::names;
use crate::room::registry::RoomRegistry;

/// Delivers events to every connection currently in a room.
///
/// Delivery to a room with no members is a silent no-op, not an error.
/// Per-room delivery order across members is unspecified.
#[derive(Debug)]
pub struct BroadcastRouter {
    /// Live connection table.
    connections: Arc<ConnectionRegistry>,
    /// Room membership table.
    rooms: Arc<RoomRegistry>,
}

impl BroadcastRouter {
    /// Creates a new router over the given registries.
    pub fn new(connections: Arc<ConnectionRegistry>, rooms: Arc<RoomRegistry>) -> Self {
        Self { connections, rooms }
    }

    /// Delivers an event to every member of a room.
    pub fn emit(&self, room: &str, event: &OutboundEvent) {
        self.emit_filtered(room, event, None);
    }

    /// Delivers an event to every member of a room except one connection
    /// (used for typing relays, which skip the originator).
    pub fn emit_except(&self, room: &str, exclude: ConnectionId, event: &OutboundEvent) {
        self.emit_filtered(room, event, Some(exclude));
    }

    fn emit_filtered(&self, room: &str, event: &OutboundEvent, exclude: Option<ConnectionId>) {
        let members = self.rooms.members(room);
        if members.is_empty() {
            trace!(room = %room, "Broadcast to empty room");
            return;
        }

        let Some(msg) = serialize(event) else { return };

        for conn_id in &members {
            if exclude == Some(*conn_id) {
                continue;
            }
            if let Some(handle) = self.connections.get(conn_id) {
                if !handle.send(msg.clone()) {
                    warn!(conn_id = %conn_id, room = %room, "Failed to deliver broadcast");
                }
            }
        }
    }

    /// Delivers an event to a single connection.
    pub fn send_to_connection(&self, conn_id: &ConnectionId, event: &OutboundEvent) -> bool {
        let Some(handle) = self.connections.get(conn_id) else {
            return false;
        };
        let Some(msg) = serialize(event) else {
            return false;
        };
        handle.send(msg)
    }

    /// Delivers an event to every live connection regardless of rooms.
    pub fn broadcast_all(&self, event: &OutboundEvent) {
        let Some(msg) = serialize(event) else { return };

        for handle in self.connections.all_handles() {
            handle.send(msg.clone());
        }
    }

    /// Delivers an event to a push target: one user's room, or everyone.
    pub fn push(&self, target: PushTarget, event: &OutboundEvent) {
        match target {
            PushTarget::User(user_id) => self.emit(&names::user(user_id), event),
            PushTarget::Everyone => self.broadcast_all(event),
        }
    }
}

fn serialize(event: &OutboundEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(msg) => Some(msg),
        Err(e) => {
            error!(error = %e, "Failed to serialize outbound event");
            None
        }
    }
}
