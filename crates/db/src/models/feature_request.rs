//! Feature-request (build pipeline) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use hearth_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeatureRequest {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub requested_by: Option<DbId>,
    pub branch_name: Option<String>,
    pub preview_url: Option<String>,
    pub build_log: Option<String>,
    pub error_message: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeatureRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(skip)]
    pub requested_by: Option<DbId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFeatureRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub branch_name: Option<String>,
    pub preview_url: Option<String>,
    pub build_log: Option<String>,
}

/// Body of `POST /feature-requests/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureRequestTransition {
    pub status: String,
    pub error_message: Option<String>,
}
