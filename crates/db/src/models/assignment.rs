//! Assignment (occupancy period) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use hearth_core::availability::{AssignmentStatus, Occupancy};
use hearth_core::types::{Cents, Date, DbId, Timestamp};

/// A row from `assignments`, with the linked space ids aggregated in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assignment {
    pub id: DbId,
    pub person_id: DbId,
    pub status: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub desired_departure_date: Option<Date>,
    pub desired_departure_listed: bool,
    pub rate_cents: Option<Cents>,
    pub rate_term: String,
    pub notes: Option<String>,
    pub space_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignment {
    pub person_id: DbId,
    /// Defaults to `prospect`.
    pub status: Option<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub desired_departure_date: Option<Date>,
    pub desired_departure_listed: Option<bool>,
    pub rate_cents: Option<Cents>,
    /// Defaults to `monthly`.
    pub rate_term: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub space_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAssignment {
    pub status: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub desired_departure_date: Option<Date>,
    pub desired_departure_listed: Option<bool>,
    pub rate_cents: Option<Cents>,
    pub rate_term: Option<String>,
    pub notes: Option<String>,
}

/// Body of `PUT /assignments/{id}/spaces`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetAssignmentSpaces {
    pub space_ids: Vec<DbId>,
}

/// One (space, assignment) pair loaded for availability computation.
#[derive(Debug, Clone, FromRow)]
pub struct SpaceOccupancyRow {
    pub space_id: DbId,
    pub assignment_id: DbId,
    pub person_id: DbId,
    pub status: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub desired_departure_date: Option<Date>,
    pub desired_departure_listed: bool,
}

impl SpaceOccupancyRow {
    /// Convert into the core input pair. Fails only on an unknown status string.
    pub fn into_occupancy(self) -> Result<(DbId, Occupancy), String> {
        let status = AssignmentStatus::from_str_value(&self.status)?;
        Ok((
            self.space_id,
            Occupancy {
                assignment_id: self.assignment_id,
                person_id: self.person_id,
                status,
                start_date: self.start_date,
                end_date: self.end_date,
                desired_departure_date: self.desired_departure_date,
                desired_departure_listed: self.desired_departure_listed,
            },
        ))
    }
}
