//! Repository for the `staff_sessions` table.

use sqlx::PgPool;
use hearth_core::types::{DbId, Timestamp};

use crate::models::session::{NewStaffSession, SessionPrincipal, StaffSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, user_agent, expires_at, \
                        last_refreshed_at, revoked_at, revoked_reason, created_at";

/// Live means not revoked and not past `expires_at`.
pub struct SessionRepo;

impl SessionRepo {
    /// Start a session for a successful login.
    pub async fn open(pool: &PgPool, input: &NewStaffSession) -> Result<StaffSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO staff_sessions (user_id, refresh_token_hash, user_agent, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StaffSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(&input.user_agent)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Swap a live session's refresh token for a new one and extend it.
    ///
    /// Returns `None` when `old_hash` matches no live session, including when
    /// a concurrent refresh already rotated it.
    pub async fn rotate(
        pool: &PgPool,
        old_hash: &str,
        new_hash: &str,
        expires_at: Timestamp,
    ) -> Result<Option<StaffSession>, sqlx::Error> {
        let query = format!(
            "UPDATE staff_sessions SET
                refresh_token_hash = $2,
                expires_at = $3,
                last_refreshed_at = NOW()
             WHERE refresh_token_hash = $1
               AND revoked_at IS NULL
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StaffSession>(&query)
            .bind(old_hash)
            .bind(new_hash)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// The active account behind a live session.
    ///
    /// Deactivated users resolve to `None` even before their sessions are
    /// revoked.
    pub async fn principal(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Option<SessionPrincipal>, sqlx::Error> {
        sqlx::query_as::<_, SessionPrincipal>(
            "SELECT s.id AS session_id, u.id AS user_id, u.username, u.role
             FROM staff_sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.id = $1
               AND s.revoked_at IS NULL
               AND s.expires_at > NOW()
               AND u.is_active",
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await
    }

    /// Revoke one session. Returns `false` if it was already revoked.
    pub async fn revoke(pool: &PgPool, id: DbId, reason: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE staff_sessions SET revoked_at = NOW(), revoked_reason = $2
             WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every open session of a user. Returns the count revoked.
    pub async fn revoke_all_for_user(
        pool: &PgPool,
        user_id: DbId,
        reason: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE staff_sessions SET revoked_at = NOW(), revoked_reason = $2
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that expired or were revoked before `cutoff`.
    /// Returns the count deleted.
    pub async fn purge_ended_before(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM staff_sessions
             WHERE expires_at < $1 OR revoked_at < $1",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
