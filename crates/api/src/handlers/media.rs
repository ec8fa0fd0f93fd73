//! Handlers for the `/media` resource: uploads, metadata and space links.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use hearth_core::error::CoreError;
use hearth_core::media::{
    normalize_tags, storage_path, validate_category, validate_upload, ALLOWED_CONTENT_TYPES,
    DEFAULT_CATEGORY,
};
use hearth_core::types::DbId;
use hearth_db::models::media::{CreateMedia, Media, UpdateMedia};
use hearth_db::repositories::{MediaRepo, SpaceRepo};
use hearth_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::response::{Created, DataResponse};
use crate::state::AppState;
use crate::storage::ObjectMeta;

#[derive(Debug, Default, Deserialize)]
pub struct MediaFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
}

/// GET /api/v1/media
pub async fn list_media(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<MediaFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Media>>>> {
    let (limit, offset) = page.resolve();
    let media = MediaRepo::list(
        &state.pool,
        filter.category.as_deref(),
        filter.tag.as_deref(),
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: media }))
}

/// POST /api/v1/media
///
/// Register a file that is already hosted (no bytes are transferred).
pub async fn create_media(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(mut input): Json<CreateMedia>,
) -> AppResult<Created<Media>> {
    if !ALLOWED_CONTENT_TYPES.contains(&input.content_type.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported content type '{}'. Allowed: {}",
            input.content_type,
            ALLOWED_CONTENT_TYPES.join(", ")
        ))
        .into());
    }
    if input.public_url.trim().is_empty() || input.storage_path.trim().is_empty() {
        return Err(AppError::BadRequest(
            "storage_path and public_url must not be empty".into(),
        ));
    }
    if let Some(category) = &input.category {
        validate_category(category)?;
    }
    input.tags = normalize_tags(&input.tags)?;
    input.uploaded_by = Some(user.user_id);

    let media = MediaRepo::create(&state.pool, &input).await?;
    Ok(Created::at("media", media.id, media))
}

/// POST /api/v1/media/upload
///
/// Multipart fields: `file` (required), `caption`, `category`,
/// `tags` (comma-separated) and `space_id` (link on upload).
pub async fn upload_media(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Created<Media>> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut caption: Option<String> = None;
    let mut category: Option<String> = None;
    let mut raw_tags: Vec<String> = Vec::new();
    let mut space_id: Option<DbId> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            "caption" => caption = Some(text_field(field).await?),
            "category" => category = Some(text_field(field).await?),
            "tags" => {
                raw_tags = text_field(field)
                    .await?
                    .split(',')
                    .map(str::to_string)
                    .collect();
            }
            "space_id" => {
                let value = text_field(field).await?;
                space_id = Some(value.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("space_id '{value}' is not a valid id"))
                })?);
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    validate_upload(&content_type, bytes.len())?;

    let category = category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    validate_category(&category)?;
    let tags = normalize_tags(&raw_tags)?;

    if let Some(space_id) = space_id {
        require_space(&state.pool, space_id).await?;
    }

    let path = storage_path(&category, &file_name, &content_type, Utc::now());
    let size = bytes.len() as i64;
    let public_url = state.media_store.put(&path, ObjectMeta::new(&content_type), bytes).await?;

    let input = CreateMedia {
        storage_path: path.clone(),
        public_url,
        content_type,
        file_size_bytes: Some(size),
        caption: caption.filter(|c| !c.trim().is_empty()),
        category: Some(category),
        tags,
        uploaded_by: Some(user.user_id),
    };
    let media = match MediaRepo::create_linked(&state.pool, &input, space_id).await {
        Ok(media) => media,
        Err(e) => {
            // Do not leave an orphaned object behind.
            if let Err(cleanup) = state.media_store.delete(&path).await {
                tracing::warn!(path = %path, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        media_id = media.id,
        path = %media.storage_path,
        size,
        user_id = user.user_id,
        "Media uploaded",
    );
    Ok(Created::at("media", media.id, media))
}

/// GET /api/v1/media/{id}
pub async fn get_media(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Media>>> {
    let media = MediaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Media", id))?;
    Ok(Json(DataResponse { data: media }))
}

/// PUT /api/v1/media/{id}
pub async fn update_media(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateMedia>,
) -> AppResult<Json<DataResponse<Media>>> {
    if let Some(category) = &input.category {
        validate_category(category)?;
    }
    if let Some(tags) = input.tags.take() {
        input.tags = Some(normalize_tags(&tags)?);
    }
    let media = MediaRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Media", id))?;
    Ok(Json(DataResponse { data: media }))
}

/// DELETE /api/v1/media/{id}
///
/// Removes the row (and its space links), then the stored object. A failed
/// object delete is logged, not reported.
pub async fn delete_media(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let media = MediaRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Media", id))?;

    if let Err(e) = state.media_store.delete(&media.storage_path).await {
        tracing::warn!(media_id = id, path = %media.storage_path, error = %e, "Stored object not removed");
    }
    tracing::info!(media_id = id, user_id = user.user_id, "Media deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/media/{id}/spaces/{space_id}
///
/// Appends the media to the end of the space's gallery. Linking twice is a no-op.
pub async fn link_space(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path((id, space_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    MediaRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Media", id))?;
    require_space(&state.pool, space_id).await?;

    let created = MediaRepo::link_space(&state.pool, id, space_id).await?;
    Ok(if created {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    })
}

/// DELETE /api/v1/media/{id}/spaces/{space_id}
pub async fn unlink_space(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path((id, space_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !MediaRepo::unlink_space(&state.pool, id, space_id).await? {
        return Err(CoreError::not_found("MediaSpaceLink", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid text field: {e}")))
}

async fn require_space(pool: &DbPool, space_id: DbId) -> AppResult<()> {
    SpaceRepo::find_by_id(pool, space_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| CoreError::not_found("Space", space_id).into())
}
