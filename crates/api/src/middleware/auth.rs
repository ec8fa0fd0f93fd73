//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hearth_core::error::CoreError;
use hearth_core::roles::Role;
use hearth_core::types::DbId;
use hearth_db::repositories::SessionRepo;

use crate::auth::jwt::decode_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// The staff member behind a request.
///
/// The token only has to be well-signed; the session it names must also be
/// live and its user active, and the role is read back from `users`. A token
/// therefore stops working as soon as its session is revoked or the account
/// is deactivated, and a role change applies on the next request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub session_id: DbId,
    pub username: String,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

        let claims = decode_access_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        let principal = SessionRepo::principal(&state.pool, claims.sid)
            .await?
            .filter(|p| p.user_id == claims.sub)
            .ok_or_else(|| unauthorized("Session has ended"))?;

        let role = Role::from_str_value(&principal.role).map_err(|msg| {
            tracing::error!(user_id = principal.user_id, %msg, "User row carries an unknown role");
            AppError::Core(CoreError::Forbidden(msg))
        })?;

        Ok(AuthUser {
            user_id: principal.user_id,
            session_id: principal.session_id,
            username: principal.username,
            role,
        })
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}
