//! Route definitions for the `/spaces` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::spaces;
use crate::state::AppState;

/// Routes mounted at `/spaces`.
///
/// ```text
/// GET    /                      -> list_spaces (?include_archived)
/// POST   /                      -> create_space
/// GET    /availability          -> list_availability (?date)
/// GET    /{id}                  -> get_space
/// PUT    /{id}                  -> update_space
/// DELETE /{id}                  -> delete_space
/// GET    /{id}/availability     -> get_availability (?date)
/// GET    /{id}/media            -> list_space_media
/// PUT    /{id}/media/order      -> reorder_space_media
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(spaces::list_spaces).post(spaces::create_space))
        .route("/availability", get(spaces::list_availability))
        .route(
            "/{id}",
            get(spaces::get_space)
                .put(spaces::update_space)
                .delete(spaces::delete_space),
        )
        .route("/{id}/availability", get(spaces::get_availability))
        .route("/{id}/media", get(spaces::list_space_media))
        .route("/{id}/media/order", put(spaces::reorder_space_media))
}
