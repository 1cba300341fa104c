//! # taskhub-database
//!
//! PostgreSQL access layer for TaskHub:
//!
//! - Connection pool creation from [`taskhub_core::config::DatabaseConfig`]
//! - Store traits ([`store::UserStore`], [`store::TaskStore`],
//!   [`store::NotificationStore`]) consumed by the real-time and worker
//!   layers
//! - sqlx repository implementations of those traits

pub mod connection;
pub mod repositories;
pub mod store;

pub use store::{NotificationStore, TaskStore, UserStore};
