//! Handlers for the `/people` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use hearth_core::error::CoreError;
use hearth_core::messaging::normalize_phone;
use hearth_core::types::DbId;
use hearth_db::models::person::{CreatePerson, Person, UpdatePerson};
use hearth_db::repositories::PersonRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PeopleFilter {
    pub person_type: Option<String>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
}

/// GET /api/v1/people
pub async fn list_people(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<PeopleFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Person>>>> {
    let (limit, offset) = page.resolve();
    let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let people = PersonRepo::list(
        &state.pool,
        filter.person_type.as_deref(),
        search,
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data: people }))
}

/// POST /api/v1/people
///
/// Phone numbers are stored in E.164.
pub async fn create_person(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(mut input): Json<CreatePerson>,
) -> AppResult<Created<Person>> {
    if input.first_name.trim().is_empty() {
        return Err(AppError::BadRequest("first_name must not be empty".into()));
    }
    input.phone = normalize_optional_phone(input.phone)?;

    let person = PersonRepo::create(&state.pool, &input).await?;
    tracing::info!(person_id = person.id, "Person created");
    Ok(Created::at("people", person.id, person))
}

/// GET /api/v1/people/{id}
pub async fn get_person(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Person>>> {
    let person = PersonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Person", id))?;
    Ok(Json(DataResponse { data: person }))
}

/// PUT /api/v1/people/{id}
pub async fn update_person(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdatePerson>,
) -> AppResult<Json<DataResponse<Person>>> {
    if input
        .first_name
        .as_deref()
        .is_some_and(|n| n.trim().is_empty())
    {
        return Err(AppError::BadRequest("first_name must not be empty".into()));
    }
    input.phone = normalize_optional_phone(input.phone)?;

    let person = PersonRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Person", id))?;
    Ok(Json(DataResponse { data: person }))
}

/// DELETE /api/v1/people/{id}
///
/// People with assignments or applications cannot be deleted (409).
pub async fn delete_person(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PersonRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Person", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn normalize_optional_phone(phone: Option<String>) -> Result<Option<String>, CoreError> {
    phone
        .filter(|p| !p.trim().is_empty())
        .map(|p| normalize_phone(&p))
        .transpose()
}
