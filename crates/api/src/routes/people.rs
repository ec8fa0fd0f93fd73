//! Route definitions for the `/people` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::people;
use crate::state::AppState;

/// Routes mounted at `/people`.
///
/// ```text
/// GET    /        -> list_people (?person_type, ?search, ?limit, ?offset)
/// POST   /        -> create_person
/// GET    /{id}    -> get_person
/// PUT    /{id}    -> update_person
/// DELETE /{id}    -> delete_person
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(people::list_people).post(people::create_person))
        .route(
            "/{id}",
            get(people::get_person)
                .put(people::update_person)
                .delete(people::delete_person),
        )
}
