//! # taskhub-realtime
//!
//! Real-time collaboration engine for TaskHub. Provides:
//!
//! - WebSocket connection lifecycle with in-band JWT authentication
//! - Room-based interest groups (`user_<id>`, `department_<id>`, `task_<id>`)
//! - Broadcast routing with typed wire events
//! - User presence derivation (online/offline)
//! - Task lifecycle and comment fan-out
//! - Live delivery of durable notifications

pub mod connection;
pub mod engine;
pub mod events;
pub mod message;
pub mod presence;
pub mod room;
pub mod router;

pub use connection::manager::ConnectionManager;
pub use connection::registry::ConnectionRegistry;
pub use engine::RealtimeEngine;
pub use message::types::{ActorRef, InboundEvent, OutboundEvent, PushTarget};
pub use presence::tracker::PresenceTracker;
pub use room::registry::RoomRegistry;
pub use router::BroadcastRouter;
