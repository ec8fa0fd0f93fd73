use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use hearth_db::MigrationStatus;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable or behind.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Absent when the database could not be asked.
    pub migrations: Option<MigrationStatus>,
}

/// GET /health
///
/// Always 200 so load balancers can tell a running but degraded process
/// from a dead one.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let migrations = match hearth_db::migration_status(&state.pool).await {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read migration state");
            None
        }
    };
    let db_healthy = migrations.is_some();
    let current = migrations.as_ref().is_some_and(MigrationStatus::is_current);

    Json(HealthResponse {
        status: if current { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        migrations,
    })
}

/// Mounted at the root, outside `/api/v1` and without auth.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
