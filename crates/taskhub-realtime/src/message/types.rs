//! Inbound and outbound wire event definitions.
//!
//! Every event is a closed tagged variant with its exact field set, so the
//! wire contract is checked at compile time rather than carried around as
//! untyped maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_entity::notification::Notification;
use taskhub_entity::task::{Task, TaskComment};
use taskhub_entity::user::UserSummary;

/// Events sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Authenticate this connection with a bearer token.
    Authenticate {
        /// Opaque bearer token; a "Bearer " prefix is tolerated.
        token: String,
    },
    /// Join a named room.
    JoinRoom {
        /// Room name.
        room: String,
    },
    /// Leave a named room.
    LeaveRoom {
        /// Room name.
        room: String,
    },
    /// Relay a task change to its interest rooms.
    TaskUpdate {
        /// The task after the change.
        task: Task,
    },
    /// Relay a new comment to the task room.
    TaskComment {
        /// The comment that was added.
        comment: TaskComment,
    },
    /// The user started typing in a task's comment box.
    TypingStart {
        /// Task being typed on.
        task_id: Uuid,
    },
    /// The user stopped typing.
    TypingStop {
        /// Task being typed on.
        task_id: Uuid,
    },
    /// Re-announce this user's presence to their department.
    UserOnline,
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Authentication succeeded.
    Authenticated {
        /// The authenticated user's public summary.
        user: UserSummary,
    },
    /// Authentication failed; the connection will be closed.
    AuthError {
        /// Failure description.
        message: String,
    },
    /// Room join confirmed.
    JoinedRoom {
        /// Room name.
        room: String,
    },
    /// Room leave confirmed.
    LeftRoom {
        /// Room name.
        room: String,
    },
    /// A task was created or changed.
    TaskUpdated {
        /// The task after the change.
        task: Task,
        /// Who made the change.
        updated_by: ActorRef,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
    /// A task was assigned to the receiving user.
    TaskAssigned {
        /// The assigned task.
        task: Task,
        /// Who made the assignment.
        assigned_by: ActorRef,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
    /// A task was deleted.
    TaskDeleted {
        /// Id of the deleted task.
        task_id: Uuid,
        /// Who deleted it.
        deleted_by: ActorRef,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
    /// A comment was added to a task.
    TaskCommentAdded {
        /// The new comment.
        comment: TaskComment,
        /// Who wrote it.
        author: ActorRef,
        /// When the event was emitted.
        timestamp: DateTime<Utc>,
    },
    /// A user in the department went online or offline.
    UserPresence {
        /// The user whose presence changed.
        user_id: Uuid,
        /// Their display name.
        user_name: String,
        /// New presence status.
        status: PresenceStatus,
        /// When the transition happened.
        timestamp: DateTime<Utc>,
    },
    /// Another user started typing on a task.
    UserTyping {
        /// Task being typed on.
        task_id: Uuid,
        /// The typing user.
        user_id: Uuid,
        /// Their display name.
        user_name: String,
    },
    /// Another user stopped typing on a task.
    UserStoppedTyping {
        /// Task being typed on.
        task_id: Uuid,
        /// The user who stopped.
        user_id: Uuid,
        /// Their display name.
        user_name: String,
    },
    /// A durable notification delivered live.
    Notification {
        /// The persisted notification.
        notification: Notification,
    },
}

/// Online/offline presence state carried in `user_presence` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// The user has at least one authenticated connection.
    Online,
    /// The user's last bound connection went away.
    Offline,
}

impl PresenceStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// Reference to the acting user embedded in fan-out events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    /// User id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

impl ActorRef {
    /// Create an actor reference.
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl From<&UserSummary> for ActorRef {
    fn from(user: &UserSummary) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Addressing target for direct pushes.
///
/// The reserved sentinel `"all"` addresses every connected client
/// regardless of room membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushTarget {
    /// A single user's room.
    User(Uuid),
    /// Every connected client.
    Everyone,
}

impl FromStr for PushTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::Everyone);
        }
        Uuid::parse_str(s)
            .map(Self::User)
            .map_err(|_| AppError::validation(format!("Invalid push target: '{s}'")))
    }
}
