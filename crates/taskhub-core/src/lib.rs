//! # taskhub-core
//!
//! Shared foundation for all TaskHub crates:
//!
//! - Unified [`error::AppError`] type and [`result::AppResult`] alias
//! - Configuration schemas loaded from TOML + environment
//! - Pagination types for list endpoints
//! - The [`traits::Clock`] abstraction for test-controllable time

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
