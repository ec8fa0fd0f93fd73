//! Route definitions for the `/applications` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::applications;
use crate::state::AppState;

/// Routes mounted at `/applications`.
///
/// ```text
/// GET    /                        -> list_applications (?application_status, ?person_id, ?stage)
/// POST   /                        -> create_application
/// GET    /pipeline                -> pipeline
/// GET    /{id}                    -> get_application
/// PUT    /{id}                    -> update_application
/// DELETE /{id}                    -> delete_application
/// POST   /{id}/status             -> transition_status
/// POST   /{id}/agreement          -> transition_agreement
/// GET    /{id}/quote              -> quote
/// POST   /{id}/payments           -> record_payment
/// POST   /{id}/deposit/confirm    -> confirm_deposit
/// POST   /{id}/convert            -> convert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(applications::list_applications).post(applications::create_application),
        )
        .route("/pipeline", get(applications::pipeline))
        .route(
            "/{id}",
            get(applications::get_application)
                .put(applications::update_application)
                .delete(applications::delete_application),
        )
        .route("/{id}/status", post(applications::transition_status))
        .route("/{id}/agreement", post(applications::transition_agreement))
        .route("/{id}/quote", get(applications::quote))
        .route("/{id}/payments", post(applications::record_payment))
        .route("/{id}/deposit/confirm", post(applications::confirm_deposit))
        .route("/{id}/convert", post(applications::convert))
}
