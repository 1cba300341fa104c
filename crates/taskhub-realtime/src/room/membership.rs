//! Membership tracking — which connections belong to which rooms.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Tracks connection-to-room membership mappings (reverse index).
#[derive(Debug)]
pub struct MembershipTracker {
    /// Connection ID → set of room names.
    conn_to_rooms: DashMap<ConnectionId, HashSet<String>>,
}

impl MembershipTracker {
    /// Creates a new membership tracker.
    pub fn new() -> Self {
        Self {
            conn_to_rooms: DashMap::new(),
        }
    }

    /// Records a membership.
    pub fn add(&self, conn_id: ConnectionId, room: String) {
        self.conn_to_rooms.entry(conn_id).or_default().insert(room);
    }

    /// Removes a membership.
    pub fn remove(&self, conn_id: ConnectionId, room: &str) {
        if let Some(mut rooms) = self.conn_to_rooms.get_mut(&conn_id) {
            rooms.remove(room);
        }
    }

    /// Gets all rooms a connection belongs to.
    pub fn get_rooms(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns the number of memberships for a connection.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes all memberships for a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.conn_to_rooms
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}

impl Default for MembershipTracker {
    fn default() -> Self {
        Self::new()
    }
}
