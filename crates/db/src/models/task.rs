//! Staff task model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use hearth_core::types::{Date, DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: i16,
    pub space_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
    pub due_date: Option<Date>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i16>,
    pub space_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
    pub due_date: Option<Date>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i16>,
    pub space_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
    pub due_date: Option<Date>,
}

/// Filters for `GET /tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub space_id: Option<DbId>,
    pub assignee_user_id: Option<DbId>,
}
