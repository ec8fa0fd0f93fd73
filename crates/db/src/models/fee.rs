//! Fee code and payment method models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use hearth_core::types::{Cents, DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeeCode {
    pub id: DbId,
    pub code: String,
    pub label: String,
    pub default_amount_cents: Cents,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeeCode {
    pub code: String,
    pub label: String,
    pub default_amount_cents: Option<Cents>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFeeCode {
    pub label: Option<String>,
    pub default_amount_cents: Option<Cents>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentMethod {
    pub id: DbId,
    pub name: String,
    pub method_type: String,
    pub account_handle: Option<String>,
    pub instructions: Option<String>,
    pub fee_percent_bps: i32,
    pub fee_flat_cents: Cents,
    pub fee_code_id: Option<DbId>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentMethod {
    pub name: String,
    pub method_type: String,
    pub account_handle: Option<String>,
    pub instructions: Option<String>,
    pub fee_percent_bps: Option<i32>,
    pub fee_flat_cents: Option<Cents>,
    pub fee_code_id: Option<DbId>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePaymentMethod {
    pub name: Option<String>,
    pub account_handle: Option<String>,
    pub instructions: Option<String>,
    pub fee_percent_bps: Option<i32>,
    pub fee_flat_cents: Option<Cents>,
    pub fee_code_id: Option<DbId>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}
