//! Presence tracker — derives online/offline transitions from registry
//! mutations.
//!
//! No presence history is retained: a reconnecting client produces a fresh
//! "online" event even if it was online seconds before.

use std::sync::Arc;

use chrono::Utc;

use taskhub_entity::user::UserSummary;

use crate::message::types::{OutboundEvent, PresenceStatus};
use crate::room::names;
use crate::router::BroadcastRouter;

/// Broadcasts presence transitions to the user's department room.
#[derive(Debug)]
pub struct PresenceTracker {
    /// Delivery channel.
    router: Arc<BroadcastRouter>,
}

impl PresenceTracker {
    /// Creates a new presence tracker.
    pub fn new(router: Arc<BroadcastRouter>) -> Self {
        Self { router }
    }

    /// Announces that a user came online. Fired on every successful
    /// authentication.
    pub fn broadcast_online(&self, user: &UserSummary) {
        self.broadcast(user, PresenceStatus::Online);
    }

    /// Announces that a user went offline. Fired when a bound connection
    /// disconnects.
    pub fn broadcast_offline(&self, user: &UserSummary) {
        self.broadcast(user, PresenceStatus::Offline);
    }

    fn broadcast(&self, user: &UserSummary, status: PresenceStatus) {
        // Users without a department have no presence audience.
        let Some(department_id) = user.department_id else {
            return;
        };

        self.router.emit(
            &names::department(department_id),
            &OutboundEvent::UserPresence {
                user_id: user.id,
                user_name: user.name.clone(),
                status,
                timestamp: Utc::now(),
            },
        );
    }
}
