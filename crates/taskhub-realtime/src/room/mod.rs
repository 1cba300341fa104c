//! Room-based interest groups.

pub mod membership;
pub mod names;
pub mod registry;
pub mod room;

pub use registry::RoomRegistry;
