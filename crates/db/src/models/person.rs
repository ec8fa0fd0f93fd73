//! Person (resident, applicant, contact) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use hearth_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Person {
    pub id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// E.164 formatted.
    pub phone: Option<String>,
    pub person_type: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Person {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePerson {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Defaults to `resident`.
    pub person_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePerson {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub person_type: Option<String>,
    pub notes: Option<String>,
}
