//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /              -> list_tasks (?status, ?space_id, ?assignee_user_id)
/// POST   /              -> create_task
/// GET    /{id}          -> get_task
/// PUT    /{id}          -> update_task
/// DELETE /{id}          -> delete_task
/// POST   /{id}/status   -> transition_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/{id}/status", post(tasks::transition_task))
}
