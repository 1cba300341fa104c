//! Fan-out of task mutations to interest rooms.
//!
//! Invoked after the corresponding CRUD mutation commits, either by the
//! external request handlers or by clients relaying through the socket.
//! Fire-and-forget: nothing here returns an error to the caller.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use taskhub_entity::task::{Task, TaskComment};

use crate::message::types::{ActorRef, OutboundEvent};
use crate::room::names;
use crate::router::BroadcastRouter;

/// Broadcasts task lifecycle events to the right subset of rooms.
#[derive(Debug)]
pub struct TaskEventFanout {
    /// Delivery channel.
    router: Arc<BroadcastRouter>,
}

impl TaskEventFanout {
    /// Creates a new fan-out.
    pub fn new(router: Arc<BroadcastRouter>) -> Self {
        Self { router }
    }

    /// A task was created. Broadcasts the same shape as an update.
    pub fn task_created(&self, task: &Task, actor: &ActorRef) {
        self.task_changed(task, actor);
    }

    /// A task was updated.
    pub fn task_updated(&self, task: &Task, actor: &ActorRef) {
        self.task_changed(task, actor);
    }

    fn task_changed(&self, task: &Task, actor: &ActorRef) {
        let timestamp = Utc::now();

        let event = OutboundEvent::TaskUpdated {
            task: task.clone(),
            updated_by: actor.clone(),
            timestamp,
        };

        if let Some(department_id) = task.department_id {
            self.router.emit(&names::department(department_id), &event);
        }
        self.router.emit(&names::task(task.id), &event);

        // Tell the assignee directly, unless they made the change themselves.
        if let Some(assignee_id) = task.assignee_id {
            if assignee_id != actor.id {
                self.router.emit(
                    &names::user(assignee_id),
                    &OutboundEvent::TaskAssigned {
                        task: task.clone(),
                        assigned_by: actor.clone(),
                        timestamp,
                    },
                );
            }
        }
    }

    /// A task was deleted. `department_id` must be captured before the
    /// underlying record is destroyed.
    pub fn task_deleted(&self, task_id: Uuid, department_id: Option<Uuid>, actor: &ActorRef) {
        let event = OutboundEvent::TaskDeleted {
            task_id,
            deleted_by: actor.clone(),
            timestamp: Utc::now(),
        };

        if let Some(department_id) = department_id {
            self.router.emit(&names::department(department_id), &event);
        }
        self.router.emit(&names::task(task_id), &event);
    }

    /// A comment was added. Comments are a finer-grained interest than
    /// task lifecycle, so this goes to the task room only.
    pub fn comment_added(&self, comment: &TaskComment, author: &ActorRef) {
        self.router.emit(
            &names::task(comment.task_id),
            &OutboundEvent::TaskCommentAdded {
                comment: comment.clone(),
                author: author.clone(),
                timestamp: Utc::now(),
            },
        );
    }
}
