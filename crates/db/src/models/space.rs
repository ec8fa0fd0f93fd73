//! Space (dwelling unit) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use hearth_core::availability::SpaceNode;
use hearth_core::types::{Cents, DbId, Timestamp};

/// A row from the `spaces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Space {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub space_type: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub monthly_rate_cents: Option<Cents>,
    pub weekly_rate_cents: Option<Cents>,
    pub nightly_rate_cents: Option<Cents>,
    pub is_listed: bool,
    pub is_archived: bool,
    pub airbnb_ical_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Space {
    pub fn node(&self) -> SpaceNode {
        SpaceNode {
            id: self.id,
            parent_id: self.parent_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpace {
    pub parent_id: Option<DbId>,
    pub name: String,
    /// Defaults to `room`.
    pub space_type: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub monthly_rate_cents: Option<Cents>,
    pub weekly_rate_cents: Option<Cents>,
    pub nightly_rate_cents: Option<Cents>,
    pub is_listed: Option<bool>,
    pub airbnb_ical_url: Option<String>,
}

/// All fields optional; `None` leaves the column unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSpace {
    pub parent_id: Option<DbId>,
    pub name: Option<String>,
    pub space_type: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub monthly_rate_cents: Option<Cents>,
    pub weekly_rate_cents: Option<Cents>,
    pub nightly_rate_cents: Option<Cents>,
    pub is_listed: Option<bool>,
    pub is_archived: Option<bool>,
    pub airbnb_ical_url: Option<String>,
}
