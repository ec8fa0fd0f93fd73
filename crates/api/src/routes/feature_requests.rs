//! Route definitions for the `/feature-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::feature_requests;
use crate::state::AppState;

/// Routes mounted at `/feature-requests`.
///
/// ```text
/// GET    /              -> list_feature_requests (?status)
/// POST   /              -> create_feature_request
/// GET    /{id}          -> get_feature_request
/// PUT    /{id}          -> update_feature_request
/// POST   /{id}/status   -> transition_feature_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(feature_requests::list_feature_requests)
                .post(feature_requests::create_feature_request),
        )
        .route(
            "/{id}",
            get(feature_requests::get_feature_request)
                .put(feature_requests::update_feature_request),
        )
        .route(
            "/{id}/status",
            post(feature_requests::transition_feature_request),
        )
}
