//! Handlers for the `/admin` resource (staff user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use hearth_core::error::CoreError;
use hearth_core::roles::validate_role;
use hearth_core::types::DbId;
use hearth_db::models::session::{REVOKED_DEACTIVATED, REVOKED_PASSWORD_RESET};
use hearth_db::models::user::{CreateUser, UpdateUser, UserResponse};
use hearth_db::repositories::{SessionRepo, UserRepo};

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username must not be empty".into()));
    }
    if !input.email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".into()));
    }
    validate_role(&input.role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            email: input.email.trim().to_string(),
            password_hash: hashed,
            role: input.role,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, admin_id = admin.user_id, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(user.into()))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update email, role or active flag. An admin cannot demote or deactivate
/// themselves, so the console always keeps at least the acting admin.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    if let Some(role) = &input.role {
        validate_role(role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if id == admin.user_id
        && (input.is_active == Some(false)
            || input.role.as_deref().is_some_and(|r| r != admin.role.as_str()))
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot demote or deactivate their own account".into(),
        )));
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if !user.is_active {
        let revoked =
            SessionRepo::revoke_all_for_user(&state.pool, id, REVOKED_DEACTIVATED).await?;
        tracing::info!(user_id = id, admin_id = admin.user_id, revoked, "User deactivated");
    }
    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user and revoke their sessions. Returns 204 No Content.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot deactivate their own account".into(),
        )));
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id, REVOKED_DEACTIVATED).await?;
    tracing::info!(user_id = id, admin_id = admin.user_id, revoked, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &hashed).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let revoked =
        SessionRepo::revoke_all_for_user(&state.pool, id, REVOKED_PASSWORD_RESET).await?;
    tracing::info!(user_id = id, admin_id = admin.user_id, revoked, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}
