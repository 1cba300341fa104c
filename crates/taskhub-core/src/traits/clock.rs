//! Injectable clock abstraction.
//!
//! Anything that reasons about wall-clock time (the due-date sweeps in
//! particular) takes a `Clock` handle instead of calling `Utc::now()`
//! directly, so tests can pin "now" to a fixed instant.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
