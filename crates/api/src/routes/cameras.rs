//! Route definitions for the `/cameras` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::put;
use axum::Router;
use hearth_core::cameras::MAX_SNAPSHOT_BYTES;

use crate::handlers::cameras;
use crate::state::AppState;

/// Routes mounted at `/cameras`.
///
/// ```text
/// PUT    /{name}/snapshot          -> put_snapshot (?primary)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{name}/snapshot",
        put(cameras::put_snapshot).layer(DefaultBodyLimit::max(MAX_SNAPSHOT_BYTES)),
    )
}
