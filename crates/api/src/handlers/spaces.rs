//! Handlers for the `/spaces` resource, including availability windows
//! and per-space media ordering.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use hearth_core::availability::{compute_all_windows, AvailabilityWindow, Occupancy};
use hearth_core::error::CoreError;
use hearth_core::media::validate_reorder;
use hearth_core::spaces::{validate_name, validate_parent, validate_rates};
use hearth_core::types::{Cents, Date, DbId};
use hearth_db::models::media::{ReorderMedia, SpaceMedia};
use hearth_db::models::space::{CreateSpace, Space, UpdateSpace};
use hearth_db::repositories::{AssignmentRepo, MediaRepo, SpaceRepo};
use hearth_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SpaceListParams {
    #[serde(default)]
    pub include_archived: bool,
}

/// `?date=YYYY-MM-DD`; defaults to today (UTC).
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    pub date: Option<Date>,
}

/// Body of `PUT /spaces/{id}`. `clear_parent` detaches the space from its
/// parent, since a `null` `parent_id` cannot be told apart from "unchanged".
#[derive(Debug, Deserialize)]
pub struct UpdateSpaceRequest {
    #[serde(flatten)]
    pub fields: UpdateSpace,
    #[serde(default)]
    pub clear_parent: bool,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/spaces
pub async fn list_spaces(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<SpaceListParams>,
) -> AppResult<Json<DataResponse<Vec<Space>>>> {
    let spaces = SpaceRepo::list(&state.pool, params.include_archived).await?;
    Ok(Json(DataResponse { data: spaces }))
}

/// POST /api/v1/spaces
pub async fn create_space(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateSpace>,
) -> AppResult<Created<Space>> {
    validate_name(&input.name)?;
    validate_space_rates(
        input.monthly_rate_cents,
        input.weekly_rate_cents,
        input.nightly_rate_cents,
    )?;
    if input.parent_id.is_some() {
        let parents = SpaceRepo::parent_map(&state.pool).await?;
        validate_parent(None, input.parent_id, &parents)?;
    }

    let space = SpaceRepo::create(&state.pool, &input).await?;
    tracing::info!(space_id = space.id, name = %space.name, user_id = user.user_id, "Space created");
    Ok(Created::at("spaces", space.id, space))
}

/// GET /api/v1/spaces/{id}
pub async fn get_space(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Space>>> {
    let space = find_space(&state.pool, id).await?;
    Ok(Json(DataResponse { data: space }))
}

/// PUT /api/v1/spaces/{id}
pub async fn update_space(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSpaceRequest>,
) -> AppResult<Json<DataResponse<Space>>> {
    let fields = &input.fields;
    if let Some(name) = &fields.name {
        validate_name(name)?;
    }
    validate_space_rates(
        fields.monthly_rate_cents,
        fields.weekly_rate_cents,
        fields.nightly_rate_cents,
    )?;
    if input.clear_parent && fields.parent_id.is_some() {
        return Err(AppError::BadRequest(
            "parent_id and clear_parent are mutually exclusive".into(),
        ));
    }
    if fields.parent_id.is_some() {
        let parents = SpaceRepo::parent_map(&state.pool).await?;
        if !parents.contains_key(&id) {
            return Err(CoreError::not_found("Space", id).into());
        }
        validate_parent(Some(id), fields.parent_id, &parents)?;
    }

    let mut space = SpaceRepo::update(&state.pool, id, fields)
        .await?
        .ok_or_else(|| CoreError::not_found("Space", id))?;

    if input.clear_parent && space.parent_id.is_some() {
        SpaceRepo::clear_parent(&state.pool, id).await?;
        space.parent_id = None;
    }
    Ok(Json(DataResponse { data: space }))
}

/// DELETE /api/v1/spaces/{id}
///
/// Children are detached, not deleted, and assignment and media links to
/// the space are dropped. Archive a space to keep its history.
pub async fn delete_space(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SpaceRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Space", id).into());
    }
    tracing::info!(space_id = id, user_id = user.user_id, "Space deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// GET /api/v1/spaces/availability
///
/// Windows for every non-archived space, with parent/child propagation.
pub async fn list_availability(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> AppResult<Json<DataResponse<Vec<AvailabilityWindow>>>> {
    let today = params.date.unwrap_or_else(|| Utc::now().date_naive());
    let spaces = SpaceRepo::list(&state.pool, false).await?;
    let windows = compute_windows(&state.pool, today, &spaces).await?;
    Ok(Json(DataResponse { data: windows }))
}

/// GET /api/v1/spaces/{id}/availability
pub async fn get_availability(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<AvailabilityParams>,
) -> AppResult<Json<DataResponse<AvailabilityWindow>>> {
    let today = params.date.unwrap_or_else(|| Utc::now().date_naive());
    // Archived spaces still report their own window here.
    let spaces = SpaceRepo::list(&state.pool, true).await?;
    let window = compute_windows(&state.pool, today, &spaces)
        .await?
        .into_iter()
        .find(|w| w.space_id == id)
        .ok_or_else(|| CoreError::not_found("Space", id))?;
    Ok(Json(DataResponse { data: window }))
}

/// Load all occupying assignments once and derive windows for `spaces`.
async fn compute_windows(
    pool: &DbPool,
    today: Date,
    spaces: &[Space],
) -> AppResult<Vec<AvailabilityWindow>> {
    let rows = AssignmentRepo::list_occupancies(pool).await?;
    let occupancies: Vec<(DbId, Occupancy)> = rows
        .into_iter()
        .map(|row| row.into_occupancy())
        .collect::<Result<_, _>>()
        .map_err(|msg| AppError::Core(CoreError::Internal(msg)))?;

    let nodes: Vec<_> = spaces.iter().map(Space::node).collect();
    Ok(compute_all_windows(today, &nodes, &occupancies))
}

// ---------------------------------------------------------------------------
// Media ordering
// ---------------------------------------------------------------------------

/// GET /api/v1/spaces/{id}/media
pub async fn list_space_media(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SpaceMedia>>>> {
    find_space(&state.pool, id).await?;
    let media = MediaRepo::list_for_space(&state.pool, id).await?;
    Ok(Json(DataResponse { data: media }))
}

/// PUT /api/v1/spaces/{id}/media/order
///
/// `media_ids` must list every linked media item exactly once.
pub async fn reorder_space_media(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReorderMedia>,
) -> AppResult<Json<DataResponse<Vec<SpaceMedia>>>> {
    find_space(&state.pool, id).await?;
    let linked = MediaRepo::linked_ids(&state.pool, id).await?;
    validate_reorder(&linked, &input.media_ids)?;

    if !MediaRepo::reorder(&state.pool, id, &input.media_ids).await? {
        return Err(CoreError::Conflict(
            "Media linked to this space changed while reordering; reload and retry".into(),
        )
        .into());
    }

    let media = MediaRepo::list_for_space(&state.pool, id).await?;
    Ok(Json(DataResponse { data: media }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_space(pool: &DbPool, id: DbId) -> AppResult<Space> {
    SpaceRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Space", id).into())
}

fn validate_space_rates(
    monthly: Option<Cents>,
    weekly: Option<Cents>,
    nightly: Option<Cents>,
) -> Result<(), CoreError> {
    validate_rates(&[
        ("monthly_rate_cents", monthly),
        ("weekly_rate_cents", weekly),
        ("nightly_rate_cents", nightly),
    ])
}

