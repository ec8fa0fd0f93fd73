//! Handlers for the `/auth` resource (login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use hearth_core::error::CoreError;
use hearth_core::types::DbId;
use hearth_core::roles::Role;
use hearth_db::models::session::{NewStaffSession, StaffSession, REVOKED_DEACTIVATED, REVOKED_LOGOUT};
use hearth_db::models::user::{User, UserResponse};
use hearth_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{issue_access_token, new_refresh_token, refresh_token_hash};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Consecutive failed logins before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, input.username.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after failed logins");
        }
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let (refresh_token, refresh_hash) = new_refresh_token();
    let session = SessionRepo::open(
        &state.pool,
        &NewStaffSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            user_agent: user_agent(&headers),
            expires_at: refresh_expiry(&state),
        },
    )
    .await?;
    tracing::info!(user_id = user.id, session_id = session.id, "User logged in");

    auth_response(&state, &user, &session, refresh_token).map(Json)
}

/// POST /api/v1/auth/refresh
///
/// Rotates the refresh token within the same session: the presented token
/// stops working and access tokens keep naming the same session id.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (refresh_token, refresh_hash) = new_refresh_token();

    // A concurrent refresh with the same token loses here.
    let session = SessionRepo::rotate(
        &state.pool,
        &refresh_token_hash(&input.refresh_token),
        &refresh_hash,
        refresh_expiry(&state),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        SessionRepo::revoke(&state.pool, session.id, REVOKED_DEACTIVATED).await?;
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    tracing::debug!(user_id = user.id, session_id = session.id, "Session refreshed");
    auth_response(&state, &user, &session, refresh_token).map(Json)
}

/// POST /api/v1/auth/logout
///
/// Ends the session the access token belongs to. Other devices stay signed in.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke(&state.pool, auth_user.session_id, REVOKED_LOGOUT).await?;
    tracing::info!(
        user_id = auth_user.user_id,
        session_id = auth_user.session_id,
        "User logged out"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    Ok(Json(user.into()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn refresh_expiry(state: &AppState) -> chrono::DateTime<Utc> {
    Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days)
}

fn auth_response(
    state: &AppState,
    user: &User,
    session: &StaffSession,
    refresh_token: String,
) -> AppResult<AuthResponse> {
    let role = Role::from_str_value(&user.role).map_err(AppError::InternalError)?;
    let access_token = issue_access_token(user.id, session.id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt.access_ttl_secs(),
        user: UserInfo {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        },
    })
}
