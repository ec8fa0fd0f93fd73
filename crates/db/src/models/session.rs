//! Signed-in staff devices.

use sqlx::FromRow;
use hearth_core::types::{DbId, Timestamp};

pub const REVOKED_LOGOUT: &str = "logout";
pub const REVOKED_DEACTIVATED: &str = "deactivated";
pub const REVOKED_PASSWORD_RESET: &str = "password_reset";

/// A row from `staff_sessions`.
///
/// `refresh_token_hash` changes on every refresh; `id` does not, and access
/// tokens carry it so a revoked sign-in stops authenticating at once.
#[derive(Debug, Clone, FromRow)]
pub struct StaffSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
    pub last_refreshed_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub revoked_reason: Option<String>,
    pub created_at: Timestamp,
}

pub struct NewStaffSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
}

/// The account behind a live session, as the auth extractor needs it.
#[derive(Debug, Clone, FromRow)]
pub struct SessionPrincipal {
    pub session_id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub role: String,
}
