//! # taskhub-worker
//!
//! Background scheduling for TaskHub:
//!
//! - The due-date scanner with its two independent sweeps (upcoming and
//!   urgent deadlines)
//! - The cron scheduler that fires the sweeps on configured cadences

pub mod scheduler;
pub mod sweeps;

pub use scheduler::SweepScheduler;
pub use sweeps::due_date::DueDateScanner;
