//! # taskhub-service
//!
//! Business logic around the durable notification store:
//!
//! - [`notification::producer::NotificationProducer`] — the single
//!   creation funnel, enforcing the self-notify suppression rule
//! - [`notification::service::NotificationService`] — recipient-facing
//!   read-state transitions (list, unread count, mark read, delete)

pub mod notification;

pub use notification::producer::NotificationProducer;
pub use notification::service::NotificationService;
