//! User presence derivation.

pub mod tracker;

pub use tracker::PresenceTracker;
