//! Role gates layered on [`AuthUser`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hearth_core::error::CoreError;
use hearth_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

fn require(user: AuthUser, required: Role) -> Result<AuthUser, AppError> {
    if user.role.satisfies(required) {
        Ok(user)
    } else {
        Err(AppError::Core(CoreError::Forbidden(format!(
            "{} role required",
            required.as_str()
        ))))
    }
}

/// Any signed-in staff member.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require(user, Role::Staff).map(RequireAuth)
    }
}

/// Admins only; staff get 403.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require(user, Role::Admin).map(RequireAdmin)
    }
}
