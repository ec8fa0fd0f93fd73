//! Staff roles.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260301000001_create_users.sql`.

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STAFF];

/// A staff member's role. Ordered by privilege: every admin is also staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Admin,
}

impl Role {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            ROLE_STAFF => Ok(Self::Staff),
            ROLE_ADMIN => Ok(Self::Admin),
            _ => Err(format!(
                "Invalid role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => ROLE_STAFF,
            Self::Admin => ROLE_ADMIN,
        }
    }

    /// Whether this role grants at least the privileges of `required`.
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

/// Validate that `role` is a known role name.
pub fn validate_role(role: &str) -> Result<(), String> {
    Role::from_str_value(role).map(|_| ())
}
