//! Room registry — owns all rooms and memberships.

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::membership::MembershipTracker;
use super::room::Room;

/// Registry of all active rooms.
///
/// Rooms come into existence on first join and are dropped when the last
/// member leaves; the table never accumulates empty rooms.
#[derive(Debug)]
pub struct RoomRegistry {
    /// Room name → Room.
    rooms: DashMap<String, Room>,
    /// Membership tracker (reverse index).
    memberships: MembershipTracker,
}

impl RoomRegistry {
    /// Creates a new room registry.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: MembershipTracker::new(),
        }
    }

    /// Joins a connection to a room.
    pub fn join(&self, room_name: String, conn_id: ConnectionId) {
        self.rooms
            .entry(room_name.clone())
            .or_insert_with(|| Room::new(room_name.clone()))
            .join(conn_id);

        self.memberships.add(conn_id, room_name);
    }

    /// Removes a connection from a room.
    pub fn leave(&self, room_name: &str, conn_id: ConnectionId) {
        if let Some(mut room) = self.rooms.get_mut(room_name) {
            room.leave(conn_id);
            if room.is_empty() {
                drop(room);
                self.rooms.remove(room_name);
            }
        }
        self.memberships.remove(conn_id, room_name);
    }

    /// Removes a connection from all rooms it belongs to.
    pub fn leave_all(&self, conn_id: ConnectionId) {
        let rooms = self.memberships.remove_all(conn_id);
        for room_name in &rooms {
            if let Some(mut room) = self.rooms.get_mut(room_name) {
                room.leave(conn_id);
                if room.is_empty() {
                    drop(room);
                    self.rooms.remove(room_name);
                }
            }
        }
    }

    /// Returns all member connection IDs for a room.
    pub fn members(&self, room_name: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room_name)
            .map(|room| room.get_members())
            .unwrap_or_default()
    }

    /// Returns the membership count for a connection.
    pub fn membership_count(&self, conn_id: ConnectionId) -> usize {
        self.memberships.count(conn_id)
    }

    /// Checks whether a connection is a member of a room.
    pub fn is_member(&self, room_name: &str, conn_id: ConnectionId) -> bool {
        self.memberships.get_rooms(conn_id).contains(room_name)
    }

    /// Returns member count for a room.
    pub fn member_count(&self, room_name: &str) -> usize {
        self.rooms
            .get(room_name)
            .map(|room| room.member_count())
            .unwrap_or(0)
    }

    /// Returns total number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
