//! Media (uploaded image/file) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use hearth_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Media {
    pub id: DbId,
    pub storage_path: String,
    pub public_url: String,
    pub content_type: String,
    pub file_size_bytes: Option<i64>,
    pub caption: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A media row as linked to a particular space.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SpaceMedia {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub media: Media,
    pub display_order: i32,
}

/// Insert DTO. Built by the upload handler once the object is stored,
/// or posted directly for externally hosted files.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedia {
    pub storage_path: String,
    pub public_url: String,
    pub content_type: String,
    pub file_size_bytes: Option<i64>,
    pub caption: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip)]
    pub uploaded_by: Option<DbId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMedia {
    pub caption: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of `PUT /spaces/{id}/media/order`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderMedia {
    pub media_ids: Vec<DbId>,
}
