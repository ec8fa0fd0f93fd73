//! Route definitions for fee codes and payment methods.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::fees;
use crate::state::AppState;

/// Routes mounted at `/fee-codes`.
///
/// ```text
/// GET    /        -> list_fee_codes (?include_inactive)
/// POST   /        -> create_fee_code
/// PUT    /{id}    -> update_fee_code
/// DELETE /{id}    -> delete_fee_code
/// ```
pub fn fee_codes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(fees::list_fee_codes).post(fees::create_fee_code))
        .route(
            "/{id}",
            put(fees::update_fee_code).delete(fees::delete_fee_code),
        )
}

/// Routes mounted at `/payment-methods`.
///
/// ```text
/// GET    /           -> list_payment_methods (?include_inactive)
/// POST   /           -> create_payment_method
/// PUT    /{id}       -> update_payment_method
/// DELETE /{id}       -> delete_payment_method
/// GET    /{id}/fee   -> quote_fee (?amount_cents)
/// ```
pub fn payment_methods_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(fees::list_payment_methods).post(fees::create_payment_method),
        )
        .route(
            "/{id}",
            put(fees::update_payment_method).delete(fees::delete_payment_method),
        )
        .route("/{id}/fee", get(fees::quote_fee))
}
