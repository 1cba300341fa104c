//! Well-known room name builders.
//!
//! Rooms may also carry caller-supplied names; these helpers cover the
//! names the rest of the system addresses.

use uuid::Uuid;

/// A user's personal room, joined automatically on authentication.
pub fn user(id: Uuid) -> String {
    format!("user_{id}")
}

/// A department's room, joined automatically when the authenticated user
/// is department-affiliated.
pub fn department(id: Uuid) -> String {
    format!("department_{id}")
}

/// A task's room, joined explicitly (e.g. by an open detail view).
pub fn task(id: Uuid) -> String {
    format!("task_{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_name_prefixes() {
        let id = Uuid::nil();
        assert_eq!(user(id), "user_00000000-0000-0000-0000-000000000000");
        assert_eq!(
            department(id),
            "department_00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(task(id), "task_00000000-0000-0000-0000-000000000000");
    }
}
