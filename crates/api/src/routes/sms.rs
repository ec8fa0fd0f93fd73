//! Route definitions for the `/sms` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sms;
use crate::state::AppState;

/// Routes mounted at `/sms`.
///
/// ```text
/// GET    /messages   -> list_messages (?person_id, ?limit, ?offset)
/// POST   /send       -> send_message
/// POST   /bulk       -> send_bulk
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(sms::list_messages))
        .route("/send", post(sms::send_message))
        .route("/bulk", post(sms::send_bulk))
}
