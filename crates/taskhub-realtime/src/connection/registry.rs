//! Connection registry — live connections, identity bindings, and the
//! direct-addressing directory.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use taskhub_entity::user::UserSummary;

use super::handle::{ConnectionHandle, ConnectionId};

/// Owns all registry state for live connections.
///
/// Three tables:
/// - `connections`: every live connection, authenticated or not
/// - `bindings`: connection → authenticated identity
/// - `directory`: user id → most recent bound connection. One user may
///   hold several simultaneous bindings (multi-device); the directory
///   keeps only the last-authenticated one for direct addressing, while
///   room broadcasts still reach every bound connection.
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// Connection ID → handle.
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// Connection ID → authenticated identity.
    bindings: DashMap<ConnectionId, UserSummary>,
    /// User ID → last-authenticated connection.
    directory: DashMap<Uuid, ConnectionId>,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            bindings: DashMap::new(),
            directory: DashMap::new(),
        }
    }

    /// Adds a new (unauthenticated) connection.
    pub fn insert(&self, handle: Arc<ConnectionHandle>) {
        self.connections.insert(handle.id, handle);
    }

    /// Gets a connection handle by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections
            .get(conn_id)
            .map(|entry| entry.value().clone())
    }

    /// Binds an identity to a connection.
    ///
    /// Overwrites any prior binding for the same connection (re-auth) and
    /// takes over the directory slot for the user (last-connection-wins).
    pub fn bind(&self, conn_id: ConnectionId, user: UserSummary) {
        self.directory.insert(user.id, conn_id);
        self.bindings.insert(conn_id, user);
    }

    /// Returns the identity bound to a connection, if any.
    pub fn identity(&self, conn_id: &ConnectionId) -> Option<UserSummary> {
        self.bindings.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Checks whether a connection has authenticated.
    pub fn is_authenticated(&self, conn_id: &ConnectionId) -> bool {
        self.bindings.contains_key(conn_id)
    }

    /// Returns the most recently bound connection for a user.
    pub fn connection_for_user(&self, user_id: &Uuid) -> Option<ConnectionId> {
        self.directory.get(user_id).map(|entry| *entry.value())
    }

    /// Removes a connection and its binding.
    ///
    /// The directory entry is cleared only if it still points at the
    /// removed connection; a newer binding from another device survives.
    /// Returns `None` when the connection was already removed, making
    /// repeated disconnects a no-op.
    pub fn remove(
        &self,
        conn_id: &ConnectionId,
    ) -> Option<(Arc<ConnectionHandle>, Option<UserSummary>)> {
        let (_, handle) = self.connections.remove(conn_id)?;
        let binding = self.bindings.remove(conn_id).map(|(_, user)| user);

        if let Some(user) = &binding {
            self.directory
                .remove_if(&user.id, |_, bound| *bound == *conn_id);
        }

        Some((handle, binding))
    }

    /// Returns all live connection handles.
    pub fn all_handles(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskhub_entity::user::UserRole;
    use tokio::sync::mpsc;

    fn summary(id: Uuid) -> UserSummary {
        UserSummary {
            id,
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            role: UserRole::Employee,
            department_id: None,
            department_name: None,
        }
    }

    fn handle() -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(8);
        Arc::new(ConnectionHandle::new(tx))
    }

    #[test]
    fn test_last_connection_wins_directory() {
        let registry = ConnectionRegistry::new();
        let user_id = Uuid::new_v4();

        let first = handle();
        let second = handle();
        registry.insert(first.clone());
        registry.insert(second.clone());

        registry.bind(first.id, summary(user_id));
        registry.bind(second.id, summary(user_id));

        assert_eq!(registry.connection_for_user(&user_id), Some(second.id));
        // Both connections keep their bindings.
        assert!(registry.is_authenticated(&first.id));
        assert!(registry.is_authenticated(&second.id));
    }

    #[test]
    fn test_remove_preserves_newer_directory_entry() {
        let registry = ConnectionRegistry::new();
        let user_id = Uuid::new_v4();

        let first = handle();
        let second = handle();
        registry.insert(first.clone());
        registry.insert(second.clone());
        registry.bind(first.id, summary(user_id));
        registry.bind(second.id, summary(user_id));

        // Removing the older connection must not evict the newer one.
        registry.remove(&first.id);
        assert_eq!(registry.connection_for_user(&user_id), Some(second.id));

        registry.remove(&second.id);
        assert_eq!(registry.connection_for_user(&user_id), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let conn = handle();
        registry.insert(conn.clone());

        assert!(registry.remove(&conn.id).is_some());
        assert!(registry.remove(&conn.id).is_none());
    }
}
