//! Route definitions for the `/media` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use hearth_core::media::MAX_UPLOAD_BYTES;

use crate::handlers::media;
use crate::state::AppState;

/// Headroom for multipart framing and the text fields around the file.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Routes mounted at `/media`.
///
/// ```text
/// GET    /                         -> list_media (?category, ?tag, ?limit, ?offset)
/// POST   /                         -> create_media (externally hosted file)
/// POST   /upload                   -> upload_media (multipart)
/// GET    /{id}                     -> get_media
/// PUT    /{id}                     -> update_media
/// DELETE /{id}                     -> delete_media
/// POST   /{id}/spaces/{space_id}   -> link_space
/// DELETE /{id}/spaces/{space_id}   -> unlink_space
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(media::list_media).post(media::create_media))
        .route(
            "/upload",
            post(media::upload_media)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route(
            "/{id}",
            get(media::get_media)
                .put(media::update_media)
                .delete(media::delete_media),
        )
        .route(
            "/{id}/spaces/{space_id}",
            post(media::link_space).delete(media::unlink_space),
        )
}
