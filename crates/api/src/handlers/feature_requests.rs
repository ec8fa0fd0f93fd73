//! Handlers for the `/feature-requests` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use hearth_core::error::CoreError;
use hearth_core::feature_requests::state_machine;
use hearth_core::types::DbId;
use hearth_db::models::feature_request::{
    CreateFeatureRequest, FeatureRequest, FeatureRequestTransition, UpdateFeatureRequest,
};
use hearth_db::repositories::FeatureRequestRepo;
use hearth_db::DbPool;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FeatureRequestFilter {
    pub status: Option<String>,
}

/// GET /api/v1/feature-requests
pub async fn list_feature_requests(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<FeatureRequestFilter>,
) -> AppResult<Json<DataResponse<Vec<FeatureRequest>>>> {
    if let Some(status) = &filter.status {
        if !state_machine::ALL.contains(&status.as_str()) {
            return Err(CoreError::Validation(format!(
                "Invalid feature request status '{status}'"
            ))
            .into());
        }
    }
    let requests = FeatureRequestRepo::list(&state.pool, filter.status.as_deref()).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/feature-requests
pub async fn create_feature_request(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(mut input): Json<CreateFeatureRequest>,
) -> AppResult<Created<FeatureRequest>> {
    if input.title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()).into());
    }
    input.requested_by = Some(user.user_id);

    let request = FeatureRequestRepo::create(&state.pool, &input).await?;
    tracing::info!(feature_request_id = request.id, user_id = user.user_id, "Feature request created");
    Ok(Created::at("feature-requests", request.id, request))
}

/// GET /api/v1/feature-requests/{id}
pub async fn get_feature_request(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FeatureRequest>>> {
    let request = find_feature_request(&state.pool, id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// PUT /api/v1/feature-requests/{id}
///
/// Also used by the build worker to attach branch, preview URL and log.
pub async fn update_feature_request(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFeatureRequest>,
) -> AppResult<Json<DataResponse<FeatureRequest>>> {
    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(CoreError::Validation("Title must not be empty".into()).into());
    }
    let request = FeatureRequestRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("FeatureRequest", id))?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/feature-requests/{id}/status
pub async fn transition_feature_request(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<FeatureRequestTransition>,
) -> AppResult<Json<DataResponse<FeatureRequest>>> {
    let current = find_feature_request(&state.pool, id).await?;
    state_machine::validate_transition(&current.status, &input.status)
        .map_err(CoreError::Validation)?;

    let updated = FeatureRequestRepo::transition(
        &state.pool,
        id,
        &current.status,
        &input.status,
        input.error_message.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        CoreError::Conflict(format!(
            "Feature request {id} was modified concurrently; reload and retry"
        ))
    })?;

    tracing::info!(
        feature_request_id = id,
        from = %current.status,
        to = %updated.status,
        user_id = user.user_id,
        "Feature request status changed",
    );
    Ok(Json(DataResponse { data: updated }))
}

async fn find_feature_request(pool: &DbPool, id: DbId) -> AppResult<FeatureRequest> {
    FeatureRequestRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("FeatureRequest", id).into())
}
