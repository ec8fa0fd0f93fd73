//! Ingest of camera snapshots pushed by the on-site poller.
//!
//! The poller runs where the camera vendor's cloud accepts its traffic and
//! signs in as a staff account. Each push overwrites the camera's rolling
//! image; nothing is recorded in the database.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use hearth_core::cameras::{
    camera_slug, snapshot_path, validate_snapshot, PRIMARY_SNAPSHOT_PATH, SNAPSHOT_CACHE_CONTROL,
    SNAPSHOT_CONTENT_TYPE,
};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::ObjectMeta;

#[derive(Debug, Default, Deserialize)]
pub struct SnapshotParams {
    /// Also publish this image as the site's primary snapshot.
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Serialize)]
pub struct StoredSnapshot {
    pub camera: String,
    pub path: String,
    pub url: String,
    pub primary_url: Option<String>,
    pub size_bytes: usize,
}

/// PUT /api/v1/cameras/{name}/snapshot
///
/// Body is the raw JPEG.
pub async fn put_snapshot(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<SnapshotParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<StoredSnapshot>>> {
    let slug = camera_slug(&name)?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    validate_snapshot(content_type, &body)?;

    let meta = ObjectMeta::new(SNAPSHOT_CONTENT_TYPE).cache_control(SNAPSHOT_CACHE_CONTROL);
    let path = snapshot_path(&slug);
    let size_bytes = body.len();
    let url = state.media_store.put(&path, meta, body.to_vec()).await?;

    let primary_url = if params.primary {
        Some(
            state
                .media_store
                .put(PRIMARY_SNAPSHOT_PATH, meta, body.to_vec())
                .await?,
        )
    } else {
        None
    };

    tracing::debug!(
        camera = %slug,
        size_bytes,
        primary = params.primary,
        user_id = user.user_id,
        "Camera snapshot stored",
    );
    Ok(Json(DataResponse {
        data: StoredSnapshot {
            camera: slug,
            path,
            url,
            primary_url,
            size_bytes,
        },
    }))
}
