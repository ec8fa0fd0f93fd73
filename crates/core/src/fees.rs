//! Fee codes and payment-method processing fees.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::{Cents, MAX_AMOUNT_CENTS};

/// Basis points in 100%.
pub const BPS_DENOMINATOR: i64 = 10_000;

/// Processing fees above 25% are almost certainly a data-entry mistake.
pub const MAX_PERCENT_BPS: i32 = 2_500;

pub const METHOD_CASH: &str = "cash";
pub const METHOD_CHECK: &str = "check";
pub const METHOD_ACH: &str = "ach";
pub const METHOD_CARD: &str = "card";
pub const METHOD_ZELLE: &str = "zelle";
pub const METHOD_VENMO: &str = "venmo";
pub const METHOD_PAYPAL: &str = "paypal";

pub const VALID_METHOD_TYPES: &[&str] = &[
    METHOD_CASH,
    METHOD_CHECK,
    METHOD_ACH,
    METHOD_CARD,
    METHOD_ZELLE,
    METHOD_VENMO,
    METHOD_PAYPAL,
];

static FEE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9_]{2,32}$").expect("valid regex"));

pub fn validate_fee_code(code: &str) -> Result<(), CoreError> {
    if FEE_CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid fee code '{code}'. Use 2-32 uppercase letters, digits or underscores"
        )))
    }
}

/// Amounts must be non-negative and at most [`MAX_AMOUNT_CENTS`].
pub fn validate_amount(field: &str, amount: Cents) -> Result<(), CoreError> {
    if amount < 0 {
        Err(CoreError::Validation(format!("'{field}' must not be negative")))
    } else if amount > MAX_AMOUNT_CENTS {
        Err(CoreError::Validation(format!(
            "'{field}' must not exceed {MAX_AMOUNT_CENTS} cents"
        )))
    } else {
        Ok(())
    }
}

pub fn validate_method_type(method_type: &str) -> Result<(), CoreError> {
    if VALID_METHOD_TYPES.contains(&method_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid payment method type '{method_type}'. Must be one of: {}",
            VALID_METHOD_TYPES.join(", ")
        )))
    }
}

pub fn validate_fee_settings(percent_bps: i32, flat_cents: Cents) -> Result<(), CoreError> {
    if !(0..=MAX_PERCENT_BPS).contains(&percent_bps) {
        return Err(CoreError::Validation(format!(
            "Fee percentage must be between 0 and {MAX_PERCENT_BPS} basis points"
        )));
    }
    validate_amount("fee_flat_cents", flat_cents)
}

/// Processing fee charged on `amount`: a percentage (in basis points) plus a flat part.
///
/// The percentage part rounds half-up to the cent.
pub fn compute_processing_fee(amount: Cents, percent_bps: i32, flat_cents: Cents) -> Cents {
    let pct = (amount * i64::from(percent_bps) * 2 + BPS_DENOMINATOR) / (BPS_DENOMINATOR * 2);
    pct + flat_cents
}
