//! # taskhub-api
//!
//! HTTP surface for TaskHub: the WebSocket upgrade endpoint feeding the
//! real-time engine, recipient-facing notification endpoints, and the
//! health check. Everything else (task/department/employee/project CRUD,
//! login) is served elsewhere.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
