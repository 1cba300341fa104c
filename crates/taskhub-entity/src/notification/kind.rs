//! Well-known notification type tags.
//!
//! The `notification_type` column is a free-form tag; these constants cover
//! the kinds produced inside this codebase. External producers may use
//! their own tags.

/// Reminder for a task approaching its deadline.
pub const DUE_DATE_REMINDER: &str = "due_date_reminder";

/// Escalated reminder for a task due within hours.
pub const URGENT_DUE_DATE_REMINDER: &str = "urgent_due_date_reminder";

/// A task was assigned to the recipient.
pub const TASK_ASSIGNED: &str = "task_assigned";
