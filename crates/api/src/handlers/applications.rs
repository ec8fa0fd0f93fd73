//! Handlers for the `/applications` resource: the leasing pipeline.
//!
//! The pipeline stage is never stored; every response carries the stage
//! derived from the three status columns. Status, agreement and payment
//! updates are compare-and-set so concurrent edits surface as 409s instead
//! of silently overwriting each other.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use hearth_core::availability::{STATUS_ACTIVE, STATUS_CONTRACT_SENT};
use hearth_core::deposit::{calculate_deposits, deposit_status_for, DepositQuote, RateTerm};
use hearth_core::error::CoreError;
use hearth_core::fees::validate_amount;
use hearth_core::pipeline::{
    summarize_stages, validate_agreement_transition, validate_application_transition,
    validate_conversion, AgreementStatus, ApplicationStatus, DepositStatus, PipelineStage,
    StageCount,
};
use hearth_core::types::{Cents, Date, DbId};
use hearth_db::models::assignment::Assignment;
use hearth_db::models::rental_application::{
    CreateRentalApplication, RentalApplication, RentalApplicationView, UpdateRentalApplication,
};
use hearth_db::repositories::rental_application_repo::ConversionPlan;
use hearth_db::repositories::{RentalApplicationRepo, SpaceRepo};
use hearth_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationFilter {
    pub application_status: Option<String>,
    pub person_id: Option<DbId>,
    pub stage: Option<PipelineStage>,
}

#[derive(Debug, Deserialize)]
pub struct StatusTransitionRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AgreementTransitionRequest {
    pub agreement_status: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount_cents: Cents,
}

/// One pipeline column.
#[derive(Debug, Serialize)]
pub struct PipelineColumn {
    pub stage: PipelineStage,
    pub label: &'static str,
    pub applications: Vec<RentalApplicationView>,
}

#[derive(Debug, Serialize)]
pub struct PipelineBoard {
    pub summary: Vec<StageCount>,
    pub columns: Vec<PipelineColumn>,
}

#[derive(Debug, Serialize)]
pub struct ConversionResult {
    pub application: RentalApplicationView,
    pub assignment: Assignment,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/applications
///
/// `?stage=` filters on the derived stage; archived applications never match it.
pub async fn list_applications(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<ApplicationFilter>,
) -> AppResult<Json<DataResponse<Vec<RentalApplicationView>>>> {
    if let Some(status) = &filter.application_status {
        ApplicationStatus::from_str_value(status)?;
    }
    let rows = RentalApplicationRepo::list(
        &state.pool,
        filter.application_status.as_deref(),
        filter.person_id,
    )
    .await?;

    let mut views = to_views(rows)?;
    if let Some(stage) = filter.stage {
        views.retain(|v| v.stage == Some(stage));
    }
    Ok(Json(DataResponse { data: views }))
}

/// POST /api/v1/applications
///
/// New applications start as `submitted`, or `inquiry` for community-fit leads.
pub async fn create_application(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateRentalApplication>,
) -> AppResult<Created<RentalApplicationView>> {
    if let Some(status) = &input.application_status {
        match ApplicationStatus::from_str_value(status)? {
            ApplicationStatus::Inquiry | ApplicationStatus::Submitted => {}
            other => {
                return Err(CoreError::Validation(format!(
                    "New applications must start as inquiry or submitted, not {}",
                    other.as_str()
                ))
                .into());
            }
        }
    }
    validate_details(
        input.rate_term.as_deref(),
        input.rate_cents,
        input.security_deposit_cents,
        input.desired_move_in,
        input.desired_move_out,
    )?;

    let application = RentalApplicationRepo::create(&state.pool, &input).await?;
    tracing::info!(
        application_id = application.id,
        person_id = application.person_id,
        user_id = user.user_id,
        "Rental application created",
    );
    Ok(Created::at("applications", application.id, application.try_into()?))
}

/// GET /api/v1/applications/{id}
pub async fn get_application(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RentalApplicationView>>> {
    let application = find_application(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: application.try_into()?,
    }))
}

/// PUT /api/v1/applications/{id}
///
/// Detail fields only. Converted applications are read-only.
pub async fn update_application(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRentalApplication>,
) -> AppResult<Json<DataResponse<RentalApplicationView>>> {
    let current = find_application(&state.pool, id).await?;
    if current.application_status == ApplicationStatus::Converted.as_str() {
        return Err(CoreError::Conflict(
            "Converted applications cannot be edited; edit the assignment instead".into(),
        )
        .into());
    }
    validate_details(
        input.rate_term.as_deref(),
        input.rate_cents,
        input.security_deposit_cents,
        input.desired_move_in.or(current.desired_move_in),
        input.desired_move_out.or(current.desired_move_out),
    )?;

    let application = RentalApplicationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("RentalApplication", id))?;
    Ok(Json(DataResponse {
        data: application.try_into()?,
    }))
}

/// DELETE /api/v1/applications/{id}
pub async fn delete_application(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !RentalApplicationRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("RentalApplication", id).into());
    }
    tracing::info!(application_id = id, user_id = user.user_id, "Rental application deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// GET /api/v1/applications/pipeline
///
/// Open applications grouped into stage columns, in pipeline order.
/// Every stage is present, even when empty.
pub async fn pipeline(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PipelineBoard>>> {
    let views = to_views(RentalApplicationRepo::list_open(&state.pool).await?)?;
    let summary = summarize_stages(views.iter().map(|v| v.stage));

    let mut columns: Vec<PipelineColumn> = PipelineStage::ALL
        .iter()
        .map(|stage| PipelineColumn {
            stage: *stage,
            label: stage.label(),
            applications: Vec::new(),
        })
        .collect();
    for view in views {
        if let Some(stage) = view.stage {
            columns[stage as usize].applications.push(view);
        }
    }

    Ok(Json(DataResponse {
        data: PipelineBoard { summary, columns },
    }))
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/applications/{id}/status
///
/// Moving to `converted` is only possible through `/convert`.
pub async fn transition_status(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StatusTransitionRequest>,
) -> AppResult<Json<DataResponse<RentalApplicationView>>> {
    let to = ApplicationStatus::from_str_value(&input.status)?;
    if to == ApplicationStatus::Converted {
        return Err(CoreError::Validation(
            "Use POST /applications/{id}/convert to convert an application".into(),
        )
        .into());
    }

    let current = find_application(&state.pool, id).await?;
    let from = ApplicationStatus::from_str_value(&current.application_status)?;
    validate_application_transition(from, to)?;

    let application =
        RentalApplicationRepo::transition_status(&state.pool, id, from.as_str(), to.as_str())
            .await?
            .ok_or_else(concurrent_change)?;

    tracing::info!(
        application_id = id,
        from = from.as_str(),
        to = to.as_str(),
        user_id = user.user_id,
        "Application status changed",
    );
    Ok(Json(DataResponse {
        data: application.try_into()?,
    }))
}

/// POST /api/v1/applications/{id}/agreement
///
/// Agreements are only prepared for approved applications.
pub async fn transition_agreement(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AgreementTransitionRequest>,
) -> AppResult<Json<DataResponse<RentalApplicationView>>> {
    let to = AgreementStatus::from_str_value(&input.agreement_status)?;

    let current = find_application(&state.pool, id).await?;
    require_approved(&current)?;
    let from = AgreementStatus::from_str_value(&current.agreement_status)?;
    validate_agreement_transition(from, to)?;

    let application =
        RentalApplicationRepo::transition_agreement(&state.pool, id, from.as_str(), to.as_str())
            .await?
            .ok_or_else(concurrent_change)?;

    tracing::info!(
        application_id = id,
        from = from.as_str(),
        to = to.as_str(),
        user_id = user.user_id,
        "Agreement status changed",
    );
    Ok(Json(DataResponse {
        data: application.try_into()?,
    }))
}

// ---------------------------------------------------------------------------
// Deposits
// ---------------------------------------------------------------------------

/// GET /api/v1/applications/{id}/quote
///
/// Move-in and security deposits. Without a rate on the application, the
/// desired space's rate for the application's term is used.
pub async fn quote(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DepositQuote>>> {
    let application = find_application(&state.pool, id).await?;
    let quote = quote_for(&state.pool, &application).await?;
    Ok(Json(DataResponse { data: quote }))
}

/// POST /api/v1/applications/{id}/payments
///
/// Add a deposit payment. The deposit status follows the paid total against
/// the quoted total due; a confirmed deposit stays confirmed.
pub async fn record_payment(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RecordPaymentRequest>,
) -> AppResult<Json<DataResponse<RentalApplicationView>>> {
    if input.amount_cents <= 0 {
        return Err(CoreError::Validation("amount_cents must be positive".into()).into());
    }
    validate_amount("amount_cents", input.amount_cents)?;

    let current = find_application(&state.pool, id).await?;
    require_approved(&current)?;
    let quote = quote_for(&state.pool, &current).await?;

    let new_paid = current
        .deposit_paid_cents
        .checked_add(input.amount_cents)
        .ok_or_else(|| CoreError::Validation("amount_cents is too large".into()))?;
    let status = match DepositStatus::from_str_value(&current.deposit_status)? {
        DepositStatus::Confirmed => DepositStatus::Confirmed,
        _ => deposit_status_for(quote.total_due_cents, new_paid),
    };

    let application = RentalApplicationRepo::record_payment(
        &state.pool,
        id,
        current.deposit_paid_cents,
        new_paid,
        status.as_str(),
    )
    .await?
    .ok_or_else(concurrent_change)?;

    tracing::info!(
        application_id = id,
        amount_cents = input.amount_cents,
        paid_cents = new_paid,
        total_due_cents = quote.total_due_cents,
        deposit_status = status.as_str(),
        user_id = user.user_id,
        "Deposit payment recorded",
    );
    Ok(Json(DataResponse {
        data: application.try_into()?,
    }))
}

/// POST /api/v1/applications/{id}/deposit/confirm
///
/// Staff confirmation that a received deposit has cleared.
pub async fn confirm_deposit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RentalApplicationView>>> {
    let current = find_application(&state.pool, id).await?;
    if DepositStatus::from_str_value(&current.deposit_status)? != DepositStatus::Received {
        return Err(CoreError::Conflict(format!(
            "Only received deposits can be confirmed (deposit is {})",
            current.deposit_status
        ))
        .into());
    }

    let application =
        RentalApplicationRepo::set_deposit_status(&state.pool, id, DepositStatus::Confirmed.as_str())
            .await?
            .ok_or_else(|| CoreError::not_found("RentalApplication", id))?;

    tracing::info!(application_id = id, user_id = user.user_id, "Deposit confirmed");
    Ok(Json(DataResponse {
        data: application.try_into()?,
    }))
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// POST /api/v1/applications/{id}/convert
///
/// Turn a `ready` application into an assignment covering the desired space.
/// The assignment is `active` when the move-in date has arrived and
/// `contract_sent` otherwise.
pub async fn convert(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Created<ConversionResult>> {
    let current = find_application(&state.pool, id).await?;
    validate_conversion(current.stage()?)?;

    let start_date = current.desired_move_in.ok_or_else(|| {
        CoreError::Validation("desired_move_in is required to convert an application".into())
    })?;
    let assignment_status = if start_date <= Utc::now().date_naive() {
        STATUS_ACTIVE
    } else {
        STATUS_CONTRACT_SENT
    };
    let term = RateTerm::from_str_value(&current.rate_term)?;
    let plan = ConversionPlan {
        assignment_status: assignment_status.to_string(),
        start_date,
        end_date: current.desired_move_out,
        rate_cents: effective_rate(&state.pool, &current, term).await?,
    };

    let (application, assignment) = RentalApplicationRepo::convert(&state.pool, id, &plan)
        .await?
        .ok_or_else(concurrent_change)?;

    tracing::info!(
        application_id = id,
        assignment_id = assignment.id,
        status = %assignment.status,
        user_id = user.user_id,
        "Application converted to assignment",
    );
    Ok(Created::at(
        "assignments",
        assignment.id,
        ConversionResult {
            application: application.try_into()?,
            assignment,
        },
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_application(pool: &DbPool, id: DbId) -> AppResult<RentalApplication> {
    RentalApplicationRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("RentalApplication", id).into())
}

fn to_views(rows: Vec<RentalApplication>) -> Result<Vec<RentalApplicationView>, CoreError> {
    rows.into_iter().map(RentalApplicationView::try_from).collect()
}

fn concurrent_change() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Application was changed by another request; reload and retry".into(),
    ))
}

fn require_approved(application: &RentalApplication) -> Result<(), CoreError> {
    if application.application_status == ApplicationStatus::Approved.as_str() {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Application is {}; only approved applications take agreements and deposits",
            application.application_status
        )))
    }
}

fn validate_details(
    rate_term: Option<&str>,
    rate_cents: Option<Cents>,
    security_deposit_cents: Option<Cents>,
    move_in: Option<Date>,
    move_out: Option<Date>,
) -> Result<(), CoreError> {
    if let Some(term) = rate_term {
        RateTerm::from_str_value(term)?;
    }
    if let Some(rate) = rate_cents {
        validate_amount("rate_cents", rate)?;
    }
    if let Some(security) = security_deposit_cents {
        validate_amount("security_deposit_cents", security)?;
    }
    if let (Some(start), Some(end)) = (move_in, move_out) {
        if end < start {
            return Err(CoreError::Validation(
                "desired_move_out must not precede desired_move_in".into(),
            ));
        }
    }
    Ok(())
}

/// The application's own rate, else the desired space's rate for `term`.
async fn effective_rate(
    pool: &DbPool,
    application: &RentalApplication,
    term: RateTerm,
) -> AppResult<Option<Cents>> {
    if application.rate_cents.is_some() {
        return Ok(application.rate_cents);
    }
    let space = match application.desired_space_id {
        Some(space_id) => SpaceRepo::find_by_id(pool, space_id).await?,
        None => None,
    };
    Ok(space.and_then(|s| match term {
        RateTerm::Monthly => s.monthly_rate_cents,
        RateTerm::Weekly => s.weekly_rate_cents,
        RateTerm::Nightly => s.nightly_rate_cents,
    }))
}

/// Quote deposits for an application, falling back to the desired space's rate.
async fn quote_for(pool: &DbPool, application: &RentalApplication) -> AppResult<DepositQuote> {
    let term = RateTerm::from_str_value(&application.rate_term)?;
    let move_in = application.desired_move_in.ok_or_else(|| {
        CoreError::Validation("desired_move_in is required to quote deposits".into())
    })?;

    let rate = effective_rate(pool, application, term)
        .await?
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "No {} rate on the application or its desired space",
                term.as_str()
            ))
        })?;

    Ok(calculate_deposits(
        rate,
        term,
        move_in,
        application.desired_move_out,
        application.security_deposit_cents,
    )?)
}
