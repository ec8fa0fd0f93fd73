//! Rental application model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use hearth_core::error::CoreError;
use hearth_core::pipeline::{derive_stage_from_columns, PipelineStage};
use hearth_core::types::{Cents, Date, DbId, Timestamp};

/// A row from `rental_applications`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RentalApplication {
    pub id: DbId,
    pub person_id: DbId,
    pub desired_space_id: Option<DbId>,
    pub application_status: String,
    pub agreement_status: String,
    pub deposit_status: String,
    pub desired_move_in: Option<Date>,
    pub desired_move_out: Option<Date>,
    pub rate_cents: Option<Cents>,
    pub rate_term: String,
    pub security_deposit_cents: Option<Cents>,
    pub deposit_paid_cents: Cents,
    pub assignment_id: Option<DbId>,
    pub notes: Option<String>,
    pub submitted_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RentalApplication {
    /// Pipeline stage derived from the three status columns.
    pub fn stage(&self) -> Result<Option<PipelineStage>, CoreError> {
        derive_stage_from_columns(
            &self.application_status,
            &self.agreement_status,
            &self.deposit_status,
        )
    }
}

/// An application together with its derived stage, for API output.
#[derive(Debug, Clone, Serialize)]
pub struct RentalApplicationView {
    #[serde(flatten)]
    pub application: RentalApplication,
    pub stage: Option<PipelineStage>,
}

impl TryFrom<RentalApplication> for RentalApplicationView {
    type Error = CoreError;

    fn try_from(application: RentalApplication) -> Result<Self, Self::Error> {
        let stage = application.stage()?;
        Ok(Self { application, stage })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRentalApplication {
    pub person_id: DbId,
    pub desired_space_id: Option<DbId>,
    /// Defaults to `submitted`; use `inquiry` for community-fit leads.
    pub application_status: Option<String>,
    pub desired_move_in: Option<Date>,
    pub desired_move_out: Option<Date>,
    pub rate_cents: Option<Cents>,
    pub rate_term: Option<String>,
    pub security_deposit_cents: Option<Cents>,
    pub notes: Option<String>,
}

/// Editable detail fields. Status columns change only through the
/// dedicated transition endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRentalApplication {
    pub desired_space_id: Option<DbId>,
    pub desired_move_in: Option<Date>,
    pub desired_move_out: Option<Date>,
    pub rate_cents: Option<Cents>,
    pub rate_term: Option<String>,
    pub security_deposit_cents: Option<Cents>,
    pub notes: Option<String>,
}
