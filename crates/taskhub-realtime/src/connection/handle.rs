//! Individual connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single live connection.
///
/// Holds the sender half of the outbound message queue plus liveness
/// state. Identity is not stored here — the registry owns the binding.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Sender for serialized outbound messages.
    sender: mpsc::Sender<String>,
    /// Cancelled when the connection is forcibly terminated.
    shutdown: CancellationToken,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle around an outbound sender.
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            shutdown: CancellationToken::new(),
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a serialized message for delivery to this connection.
    ///
    /// Returns `false` when the message could not be queued. A full buffer
    /// drops the message; a closed receiver marks the connection dead.
    pub fn send(&self, msg: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Forcibly terminate the connection. The transport task observes the
    /// cancelled token and closes the socket.
    pub fn close(&self) {
        self.mark_dead();
        self.shutdown.cancel();
    }

    /// Returns a clone of the shutdown token for the transport task.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
