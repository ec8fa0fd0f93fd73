pub mod admin;
pub mod applications;
pub mod assignments;
pub mod auth;
pub mod cameras;
pub mod feature_requests;
pub mod fees;
pub mod health;
pub mod media;
pub mod people;
pub mod sms;
pub mod spaces;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                  login (public)
/// /auth/refresh                                refresh (public)
/// /auth/logout                                 logout (requires auth)
/// /auth/me                                     current user
///
/// /admin/users                                 list, create (admin only)
/// /admin/users/{id}                            get, update, deactivate
/// /admin/users/{id}/reset-password             reset password
///
/// /spaces                                      list, create
/// /spaces/availability                         availability windows for all spaces
/// /spaces/{id}                                 get, update, delete
/// /spaces/{id}/availability                    availability window
/// /spaces/{id}/media                           ordered gallery
/// /spaces/{id}/media/order                     reorder gallery (PUT)
///
/// /people                                      list, create
/// /people/{id}                                 get, update, delete
///
/// /assignments                                 list, create
/// /assignments/{id}                            get, update, delete
/// /assignments/{id}/spaces                     replace linked spaces (PUT)
///
/// /applications                                list, create
/// /applications/pipeline                       board grouped by stage
/// /applications/{id}                           get, update, delete
/// /applications/{id}/status                    status transition (POST)
/// /applications/{id}/agreement                 agreement transition (POST)
/// /applications/{id}/quote                     deposit and proration quote
/// /applications/{id}/payments                  record deposit payment (POST)
/// /applications/{id}/deposit/confirm           confirm received deposit (POST)
/// /applications/{id}/convert                   convert to assignment (POST)
///
/// /media                                       list, create
/// /media/upload                                multipart upload (POST)
/// /media/{id}                                  get, update, delete
/// /media/{id}/spaces/{space_id}                link, unlink
///
/// /tasks                                       list, create
/// /tasks/{id}                                  get, update, delete
/// /tasks/{id}/status                           status transition (POST)
///
/// /sms/messages                                message log
/// /sms/send                                    send one message (POST)
/// /sms/bulk                                    send to many recipients (POST)
///
/// /fee-codes                                   list, create
/// /fee-codes/{id}                              update, delete
/// /payment-methods                             list, create
/// /payment-methods/{id}                        update, delete
/// /payment-methods/{id}/fee                    processing fee quote
///
/// /feature-requests                            list, create
/// /feature-requests/{id}                       get, update
/// /feature-requests/{id}/status                status transition (POST)
///
/// /cameras/{name}/snapshot                     store latest camera image (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout, me).
        .nest("/auth", auth::router())
        // Admin routes (user management).
        .nest("/admin", admin::router())
        // Inventory and availability.
        .nest("/spaces", spaces::router())
        .nest("/people", people::router())
        .nest("/assignments", assignments::router())
        // Leasing pipeline.
        .nest("/applications", applications::router())
        .nest("/media", media::router())
        .nest("/tasks", tasks::router())
        .nest("/sms", sms::router())
        // Payments configuration.
        .nest("/fee-codes", fees::fee_codes_router())
        .nest("/payment-methods", fees::payment_methods_router())
        .nest("/feature-requests", feature_requests::router())
        .nest("/cameras", cameras::router())
}
