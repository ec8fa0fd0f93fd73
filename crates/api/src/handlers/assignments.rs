//! Handlers for the `/assignments` resource.
//!
//! An assignment is an occupancy period for one person across one or more
//! spaces. Creating one and relinking its spaces are single transactions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use hearth_core::availability::AssignmentStatus;
use hearth_core::deposit::RateTerm;
use hearth_core::error::CoreError;
use hearth_core::fees::validate_amount;
use hearth_core::types::{Cents, Date, DbId};
use hearth_db::models::assignment::{
    Assignment, CreateAssignment, SetAssignmentSpaces, UpdateAssignment,
};
use hearth_db::repositories::{AssignmentRepo, SpaceRepo};
use hearth_db::DbPool;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AssignmentFilter {
    pub status: Option<String>,
    pub person_id: Option<DbId>,
    pub space_id: Option<DbId>,
}

/// GET /api/v1/assignments
pub async fn list_assignments(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<AssignmentFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    if let Some(status) = &filter.status {
        validate_status(status)?;
    }
    let (limit, offset) = page.resolve();
    let assignments = AssignmentRepo::list(
        &state.pool,
        filter.status.as_deref(),
        filter.person_id,
        filter.space_id,
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// POST /api/v1/assignments
pub async fn create_assignment(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(mut input): Json<CreateAssignment>,
) -> AppResult<Created<Assignment>> {
    if let Some(status) = &input.status {
        validate_status(status)?;
    }
    if let Some(term) = &input.rate_term {
        RateTerm::from_str_value(term)?;
    }
    validate_rate(input.rate_cents)?;
    validate_dates(input.start_date, input.end_date, input.desired_departure_date)?;
    input.space_ids = checked_space_ids(&state.pool, &input.space_ids).await?;

    let assignment = AssignmentRepo::create(&state.pool, &input).await?;
    tracing::info!(
        assignment_id = assignment.id,
        person_id = assignment.person_id,
        spaces = assignment.space_ids.len(),
        user_id = user.user_id,
        "Assignment created",
    );
    Ok(Created::at("assignments", assignment.id, assignment))
}

/// GET /api/v1/assignments/{id}
pub async fn get_assignment(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Assignment>>> {
    let assignment = AssignmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Assignment", id))?;
    Ok(Json(DataResponse { data: assignment }))
}

/// PUT /api/v1/assignments/{id}
///
/// Date checks run against the merged result of the stored row and the update.
pub async fn update_assignment(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAssignment>,
) -> AppResult<Json<DataResponse<Assignment>>> {
    if let Some(status) = &input.status {
        validate_status(status)?;
    }
    if let Some(term) = &input.rate_term {
        RateTerm::from_str_value(term)?;
    }
    validate_rate(input.rate_cents)?;

    let current = AssignmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Assignment", id))?;
    validate_dates(
        input.start_date.unwrap_or(current.start_date),
        input.end_date.or(current.end_date),
        input.desired_departure_date.or(current.desired_departure_date),
    )?;

    let assignment = AssignmentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Assignment", id))?;
    Ok(Json(DataResponse { data: assignment }))
}

/// DELETE /api/v1/assignments/{id}
pub async fn delete_assignment(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AssignmentRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Assignment", id).into());
    }
    tracing::info!(assignment_id = id, user_id = user.user_id, "Assignment deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/assignments/{id}/spaces
///
/// Replace the linked spaces in one transaction.
pub async fn set_assignment_spaces(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetAssignmentSpaces>,
) -> AppResult<Json<DataResponse<Assignment>>> {
    let space_ids = checked_space_ids(&state.pool, &input.space_ids).await?;
    let assignment = AssignmentRepo::set_spaces(&state.pool, id, &space_ids)
        .await?
        .ok_or_else(|| CoreError::not_found("Assignment", id))?;
    Ok(Json(DataResponse { data: assignment }))
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_status(status: &str) -> Result<(), CoreError> {
    AssignmentStatus::from_str_value(status)
        .map(|_| ())
        .map_err(CoreError::Validation)
}

fn validate_rate(rate: Option<Cents>) -> Result<(), CoreError> {
    rate.map_or(Ok(()), |r| validate_amount("rate_cents", r))
}

fn validate_dates(
    start: Date,
    end: Option<Date>,
    desired_departure: Option<Date>,
) -> Result<(), CoreError> {
    if end.is_some_and(|e| e < start) {
        return Err(CoreError::Validation(
            "end_date must not precede start_date".into(),
        ));
    }
    if desired_departure.is_some_and(|d| d < start) {
        return Err(CoreError::Validation(
            "desired_departure_date must not precede start_date".into(),
        ));
    }
    Ok(())
}

/// Deduplicate `space_ids`, keeping first occurrence order, and confirm each exists.
async fn checked_space_ids(pool: &DbPool, space_ids: &[DbId]) -> AppResult<Vec<DbId>> {
    let mut unique: Vec<DbId> = Vec::with_capacity(space_ids.len());
    for id in space_ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    if unique.is_empty() {
        return Ok(unique);
    }

    let known = SpaceRepo::parent_map(pool).await?;
    if let Some(missing) = unique.iter().find(|id| !known.contains_key(id)) {
        return Err(CoreError::Validation(format!("Space {missing} does not exist")).into());
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn end_before_start_rejected() {
        assert_matches!(
            validate_dates(d(2026, 11, 1), Some(d(2026, 10, 31)), None),
            Err(CoreError::Validation(_))
        );
        assert!(validate_dates(d(2026, 11, 1), Some(d(2026, 11, 1)), None).is_ok());
        assert!(validate_dates(d(2026, 11, 1), None, None).is_ok());
    }

    #[test]
    fn desired_departure_before_start_rejected() {
        assert!(validate_dates(d(2026, 11, 1), None, Some(d(2026, 10, 1))).is_err());
    }

    #[test]
    fn unknown_status_is_validation_error() {
        assert_matches!(validate_status("evicted"), Err(CoreError::Validation(msg)) if msg.contains("Must be one of"));
        assert!(validate_status("contract_sent").is_ok());
    }

    #[test]
    fn out_of_range_rate_rejected() {
        assert!(validate_rate(Some(-1)).is_err());
        assert!(validate_rate(Some(1_000_000_000_000_000_000)).is_err());
        assert!(validate_rate(None).is_ok());
    }
}
