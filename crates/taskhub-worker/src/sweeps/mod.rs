//! Scheduled sweep implementations.

pub mod due_date;
