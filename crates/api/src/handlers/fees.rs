//! Handlers for fee codes and payment methods.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use hearth_core::error::CoreError;
use hearth_core::fees::{
    compute_processing_fee, validate_amount, validate_fee_code, validate_fee_settings,
    validate_method_type,
};
use hearth_core::types::{Cents, DbId};
use hearth_db::models::fee::{
    CreateFeeCode, CreatePaymentMethod, FeeCode, PaymentMethod, UpdateFeeCode,
    UpdatePaymentMethod,
};
use hearth_db::repositories::{FeeCodeRepo, PaymentMethodRepo};
use hearth_db::DbPool;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::query::IncludeInactiveParams;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeeQuoteParams {
    pub amount_cents: Cents,
}

/// Processing fee a payment method adds to an amount.
#[derive(Debug, Serialize)]
pub struct FeeQuote {
    pub payment_method_id: DbId,
    pub amount_cents: Cents,
    pub fee_cents: Cents,
    pub total_cents: Cents,
}

// ---------------------------------------------------------------------------
// Fee codes
// ---------------------------------------------------------------------------

/// GET /api/v1/fee-codes
pub async fn list_fee_codes(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<FeeCode>>>> {
    let codes = FeeCodeRepo::list(&state.pool, !params.include_inactive).await?;
    Ok(Json(DataResponse { data: codes }))
}

/// POST /api/v1/fee-codes
pub async fn create_fee_code(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateFeeCode>,
) -> AppResult<Created<FeeCode>> {
    validate_fee_code(&input.code)?;
    validate_label(&input.label)?;
    if let Some(amount) = input.default_amount_cents {
        validate_amount("default_amount_cents", amount)?;
    }

    let code = FeeCodeRepo::create(&state.pool, &input).await?;
    tracing::info!(fee_code_id = code.id, code = %code.code, user_id = user.user_id, "Fee code created");
    Ok(Created::at("fee-codes", code.id, code))
}

/// PUT /api/v1/fee-codes/{id}
pub async fn update_fee_code(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFeeCode>,
) -> AppResult<Json<DataResponse<FeeCode>>> {
    if let Some(label) = &input.label {
        validate_label(label)?;
    }
    if let Some(amount) = input.default_amount_cents {
        validate_amount("default_amount_cents", amount)?;
    }
    let code = FeeCodeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("FeeCode", id))?;
    Ok(Json(DataResponse { data: code }))
}

/// DELETE /api/v1/fee-codes/{id}
///
/// Payment methods referencing the code keep working; their link is cleared.
pub async fn delete_fee_code(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if FeeCodeRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("FeeCode", id).into())
    }
}

// ---------------------------------------------------------------------------
// Payment methods
// ---------------------------------------------------------------------------

/// GET /api/v1/payment-methods
pub async fn list_payment_methods(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<PaymentMethod>>>> {
    let methods = PaymentMethodRepo::list(&state.pool, !params.include_inactive).await?;
    Ok(Json(DataResponse { data: methods }))
}

/// POST /api/v1/payment-methods
pub async fn create_payment_method(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentMethod>,
) -> AppResult<Created<PaymentMethod>> {
    validate_label(&input.name)?;
    validate_method_type(&input.method_type)?;
    validate_fee_settings(
        input.fee_percent_bps.unwrap_or(0),
        input.fee_flat_cents.unwrap_or(0),
    )?;
    check_fee_code(&state.pool, input.fee_code_id).await?;

    let method = PaymentMethodRepo::create(&state.pool, &input).await?;
    tracing::info!(
        payment_method_id = method.id,
        method_type = %method.method_type,
        user_id = user.user_id,
        "Payment method created",
    );
    Ok(Created::at("payment-methods", method.id, method))
}

/// PUT /api/v1/payment-methods/{id}
pub async fn update_payment_method(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePaymentMethod>,
) -> AppResult<Json<DataResponse<PaymentMethod>>> {
    let existing = find_payment_method(&state.pool, id).await?;
    if let Some(name) = &input.name {
        validate_label(name)?;
    }
    validate_fee_settings(
        input.fee_percent_bps.unwrap_or(existing.fee_percent_bps),
        input.fee_flat_cents.unwrap_or(existing.fee_flat_cents),
    )?;
    check_fee_code(&state.pool, input.fee_code_id).await?;

    let method = PaymentMethodRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("PaymentMethod", id))?;
    Ok(Json(DataResponse { data: method }))
}

/// DELETE /api/v1/payment-methods/{id}
pub async fn delete_payment_method(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if PaymentMethodRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::not_found("PaymentMethod", id).into())
    }
}

/// GET /api/v1/payment-methods/{id}/fee?amount_cents=
pub async fn quote_fee(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FeeQuoteParams>,
) -> AppResult<Json<DataResponse<FeeQuote>>> {
    validate_amount("amount_cents", params.amount_cents)?;
    let method = find_payment_method(&state.pool, id).await?;

    let fee_cents = compute_processing_fee(
        params.amount_cents,
        method.fee_percent_bps,
        method.fee_flat_cents,
    );
    Ok(Json(DataResponse {
        data: FeeQuote {
            payment_method_id: id,
            amount_cents: params.amount_cents,
            fee_cents,
            total_cents: params.amount_cents + fee_cents,
        },
    }))
}

async fn find_payment_method(pool: &DbPool, id: DbId) -> AppResult<PaymentMethod> {
    PaymentMethodRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("PaymentMethod", id).into())
}

async fn check_fee_code(pool: &DbPool, fee_code_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = fee_code_id {
        FeeCodeRepo::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CoreError::not_found("FeeCode", id))?;
    }
    Ok(())
}

fn validate_label(label: &str) -> Result<(), CoreError> {
    if label.trim().is_empty() {
        Err(CoreError::Validation("Name must not be empty".into()))
    } else {
        Ok(())
    }
}
