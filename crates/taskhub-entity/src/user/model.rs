//! Public user summary model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// Public view of a user, as bound to live connections and embedded in
/// wire events. Credential fields never appear here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// User role.
    pub role: UserRole,
    /// Department the user belongs to, if any.
    pub department_id: Option<Uuid>,
    /// Department display name, if any.
    pub department_name: Option<String>,
}

impl UserSummary {
    /// Check whether the user is affiliated with a department.
    pub fn has_department(&self) -> bool {
        self.department_id.is_some()
    }
}
