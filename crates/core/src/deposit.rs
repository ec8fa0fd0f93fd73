//! Deposit and rent-proration arithmetic.
//!
//! All amounts are integer cents. Division rounds half-up so that quotes
//! shown to applicants match what gets recorded.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pipeline::DepositStatus;
use crate::types::{Cents, Date};

// ---------------------------------------------------------------------------
// Rate term
// ---------------------------------------------------------------------------

pub const TERM_MONTHLY: &str = "monthly";
pub const TERM_WEEKLY: &str = "weekly";
pub const TERM_NIGHTLY: &str = "nightly";

pub const VALID_RATE_TERMS: &[&str] = &[TERM_MONTHLY, TERM_WEEKLY, TERM_NIGHTLY];

/// The period a quoted rate covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateTerm {
    Monthly,
    Weekly,
    Nightly,
}

impl RateTerm {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            TERM_MONTHLY => Ok(Self::Monthly),
            TERM_WEEKLY => Ok(Self::Weekly),
            TERM_NIGHTLY => Ok(Self::Nightly),
            _ => Err(CoreError::Validation(format!(
                "Invalid rate term '{s}'. Must be one of: {}",
                VALID_RATE_TERMS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => TERM_MONTHLY,
            Self::Weekly => TERM_WEEKLY,
            Self::Nightly => TERM_NIGHTLY,
        }
    }
}

// ---------------------------------------------------------------------------
// Proration
// ---------------------------------------------------------------------------

/// A partial month of rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Proration {
    pub days_in_month: u32,
    pub days_occupied: u32,
    pub amount_cents: Cents,
}

/// Number of days in the given month (1-based).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        Date::from_ymd_opt(year, month, 1),
        Date::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        // Out-of-range months never reach here through a valid `Date`.
        _ => 30,
    }
}

fn too_large() -> CoreError {
    CoreError::Validation("Amount is too large to quote".into())
}

/// `amount * numerator / denominator`, rounded half-up. `None` on overflow.
fn ratio_round(amount: Cents, numerator: i64, denominator: i64) -> Option<Cents> {
    let doubled = amount.checked_mul(numerator)?.checked_mul(2)?;
    Some(doubled.checked_add(denominator)? / (denominator * 2))
}

fn prorate(monthly_rate: Cents, date: Date, days_occupied: u32) -> Result<Proration, CoreError> {
    let dim = days_in_month(date.year(), date.month());
    let amount_cents = ratio_round(monthly_rate, i64::from(days_occupied), i64::from(dim))
        .ok_or_else(too_large)?;
    Ok(Proration {
        days_in_month: dim,
        days_occupied,
        amount_cents,
    })
}

/// Rent owed for the move-in month, counting the move-in day itself.
pub fn prorate_first_month(monthly_rate: Cents, move_in: Date) -> Result<Proration, CoreError> {
    let dim = days_in_month(move_in.year(), move_in.month());
    prorate(monthly_rate, move_in, dim - move_in.day() + 1)
}

/// Rent owed for the move-out month, counting the move-out day itself.
pub fn prorate_last_month(monthly_rate: Cents, move_out: Date) -> Result<Proration, CoreError> {
    prorate(monthly_rate, move_out, move_out.day())
}

// ---------------------------------------------------------------------------
// Deposits
// ---------------------------------------------------------------------------

/// What an approved applicant owes before moving in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositQuote {
    pub rate_cents: Cents,
    pub rate_term: RateTerm,
    /// First period's rent (prorated for monthly terms).
    pub move_in_deposit_cents: Cents,
    pub security_deposit_cents: Cents,
    pub total_due_cents: Cents,
    /// Present for monthly terms only.
    pub proration: Option<Proration>,
}

/// Compute the move-in and security deposits for an application.
///
/// `move_out` only matters for nightly stays; without it a single night is
/// assumed. `security_override` replaces the default security deposit.
pub fn calculate_deposits(
    rate: Cents,
    term: RateTerm,
    move_in: Date,
    move_out: Option<Date>,
    security_override: Option<Cents>,
) -> Result<DepositQuote, CoreError> {
    if rate < 0 {
        return Err(CoreError::Validation("Rate must not be negative".into()));
    }
    if let Some(amount) = security_override {
        if amount < 0 {
            return Err(CoreError::Validation(
                "Security deposit must not be negative".into(),
            ));
        }
    }
    if let Some(out) = move_out {
        if out < move_in {
            return Err(CoreError::Validation(
                "Move-out date must not precede move-in date".into(),
            ));
        }
    }

    let (move_in_deposit, default_security, proration) = match term {
        RateTerm::Monthly => {
            let p = prorate_first_month(rate, move_in)?;
            (p.amount_cents, rate, Some(p))
        }
        RateTerm::Weekly => (rate, rate, None),
        RateTerm::Nightly => {
            let nights = move_out
                .map(|out| (out - move_in).num_days())
                .unwrap_or(1)
                .max(1);
            (rate.checked_mul(nights).ok_or_else(too_large)?, 0, None)
        }
    };

    let security = security_override.unwrap_or(default_security);
    let total_due = move_in_deposit.checked_add(security).ok_or_else(too_large)?;

    Ok(DepositQuote {
        rate_cents: rate,
        rate_term: term,
        move_in_deposit_cents: move_in_deposit,
        security_deposit_cents: security,
        total_due_cents: total_due,
        proration,
    })
}

/// Deposit status implied by the amount paid against the amount due.
///
/// Never returns `Confirmed`; confirmation is a manual staff action.
pub fn deposit_status_for(total_due: Cents, paid: Cents) -> DepositStatus {
    if paid <= 0 {
        DepositStatus::Pending
    } else if paid < total_due {
        DepositStatus::Partial
    } else {
        DepositStatus::Received
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn days_in_month_handles_leap_years_and_december() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 12), 31);
        assert_eq!(days_in_month(2026, 4), 30);
    }

    #[test]
    fn first_of_month_is_full_rent() {
        let p = prorate_first_month(120_000, d(2026, 11, 1)).unwrap();
        assert_eq!(p.days_occupied, 30);
        assert_eq!(p.amount_cents, 120_000);
    }

    #[test]
    fn mid_month_move_in_is_prorated() {
        // 16 of 30 days at $1,200 = $640.00
        let p = prorate_first_month(120_000, d(2026, 11, 15)).unwrap();
        assert_eq!(p.days_in_month, 30);
        assert_eq!(p.days_occupied, 16);
        assert_eq!(p.amount_cents, 64_000);
    }

    #[test]
    fn proration_rounds_half_up() {
        // 1000 * 1 / 31 = 32.258 -> 32
        assert_eq!(prorate_first_month(1_000, d(2026, 1, 31)).unwrap().amount_cents, 32);
        // 100 * 1 / 8 = 12.5 -> 13 via ratio_round
        assert_eq!(ratio_round(100, 1, 8), Some(13));
    }

    #[test]
    fn last_month_counts_move_out_day() {
        let p = prorate_last_month(93_000, d(2026, 10, 10)).unwrap();
        assert_eq!(p.days_in_month, 31);
        assert_eq!(p.days_occupied, 10);
        assert_eq!(p.amount_cents, 30_000);
    }

    #[test]
    fn monthly_quote_uses_proration_and_rate_as_security() {
        let q = calculate_deposits(120_000, RateTerm::Monthly, d(2026, 11, 15), None, None)
            .unwrap();
        assert_eq!(q.move_in_deposit_cents, 64_000);
        assert_eq!(q.security_deposit_cents, 120_000);
        assert_eq!(q.total_due_cents, 184_000);
        assert!(q.proration.is_some());
    }

    #[test]
    fn weekly_quote_is_one_week_plus_security() {
        let q = calculate_deposits(35_000, RateTerm::Weekly, d(2026, 11, 15), None, Some(10_000))
            .unwrap();
        assert_eq!(q.move_in_deposit_cents, 35_000);
        assert_eq!(q.security_deposit_cents, 10_000);
        assert_eq!(q.total_due_cents, 45_000);
        assert_eq!(q.proration, None);
    }

    #[test]
    fn nightly_quote_counts_nights() {
        let q = calculate_deposits(
            9_000,
            RateTerm::Nightly,
            d(2026, 11, 15),
            Some(d(2026, 11, 19)),
            None,
        )
        .unwrap();
        assert_eq!(q.move_in_deposit_cents, 36_000);
        assert_eq!(q.security_deposit_cents, 0);
    }

    #[test]
    fn nightly_without_move_out_assumes_one_night() {
        let q = calculate_deposits(9_000, RateTerm::Nightly, d(2026, 11, 15), None, None).unwrap();
        assert_eq!(q.move_in_deposit_cents, 9_000);
    }

    #[test]
    fn negative_inputs_rejected() {
        assert_matches!(
            calculate_deposits(-1, RateTerm::Weekly, d(2026, 1, 1), None, None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            calculate_deposits(1, RateTerm::Weekly, d(2026, 1, 1), None, Some(-5)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            calculate_deposits(1, RateTerm::Nightly, d(2026, 1, 5), Some(d(2026, 1, 1)), None),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn oversized_rates_are_rejected_instead_of_overflowing() {
        let huge = 1_000_000_000_000_000_000;
        assert_matches!(
            calculate_deposits(huge, RateTerm::Monthly, d(2026, 11, 15), None, None),
            Err(CoreError::Validation(msg)) if msg.contains("too large")
        );
        assert_matches!(
            calculate_deposits(
                huge,
                RateTerm::Nightly,
                d(2026, 11, 1),
                Some(d(2026, 11, 30)),
                None
            ),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            calculate_deposits(i64::MAX, RateTerm::Weekly, d(2026, 11, 1), None, Some(1)),
            Err(CoreError::Validation(_))
        );
        assert_eq!(ratio_round(i64::MAX, 2, 31), None);
    }

    #[test]
    fn deposit_status_tracks_payments() {
        assert_eq!(deposit_status_for(1_000, 0), DepositStatus::Pending);
        assert_eq!(deposit_status_for(1_000, 400), DepositStatus::Partial);
        assert_eq!(deposit_status_for(1_000, 1_000), DepositStatus::Received);
        assert_eq!(deposit_status_for(1_000, 1_500), DepositStatus::Received);
    }
}
