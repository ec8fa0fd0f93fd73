//! First-run admin account creation.

use hearth_core::roles::ROLE_ADMIN;
use hearth_db::models::user::CreateUser;
use hearth_db::repositories::UserRepo;
use hearth_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::BootstrapAdminConfig;
use crate::error::{AppError, AppResult};

/// Create the configured admin account if no users exist yet.
///
/// Returns `true` if an account was created. Once any user exists the
/// configured credentials are ignored.
pub async fn ensure_admin(pool: &DbPool, config: Option<&BootstrapAdminConfig>) -> AppResult<bool> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(false);
    }

    let Some(admin) = config else {
        tracing::warn!("No users exist and BOOTSTRAP_ADMIN_* is not set; nobody can log in");
        return Ok(false);
    };

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::BadRequest(format!("BOOTSTRAP_ADMIN_PASSWORD: {msg}")))?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
    Ok(true)
}
