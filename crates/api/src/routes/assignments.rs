//! Route definitions for the `/assignments` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::assignments;
use crate::state::AppState;

/// Routes mounted at `/assignments`.
///
/// ```text
/// GET    /              -> list_assignments (?status, ?person_id, ?space_id)
/// POST   /              -> create_assignment
/// GET    /{id}          -> get_assignment
/// PUT    /{id}          -> update_assignment
/// DELETE /{id}          -> delete_assignment
/// PUT    /{id}/spaces   -> set_assignment_spaces
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(assignments::list_assignments).post(assignments::create_assignment),
        )
        .route(
            "/{id}",
            get(assignments::get_assignment)
                .put(assignments::update_assignment)
                .delete(assignments::delete_assignment),
        )
        .route("/{id}/spaces", put(assignments::set_assignment_spaces))
}
