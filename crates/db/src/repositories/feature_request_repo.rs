//! Repository for the `feature_requests` table.

use sqlx::PgPool;
use hearth_core::types::DbId;

use crate::models::feature_request::{CreateFeatureRequest, FeatureRequest, UpdateFeatureRequest};

const COLUMNS: &str = "id, title, description, status, requested_by, branch_name, preview_url, \
                        build_log, error_message, started_at, completed_at, created_at, updated_at";

pub struct FeatureRequestRepo;

impl FeatureRequestRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateFeatureRequest,
    ) -> Result<FeatureRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO feature_requests (title, description, requested_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeatureRequest>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.requested_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FeatureRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feature_requests WHERE id = $1");
        sqlx::query_as::<_, FeatureRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
    ) -> Result<Vec<FeatureRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM feature_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, FeatureRequest>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFeatureRequest,
    ) -> Result<Option<FeatureRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE feature_requests SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                branch_name = COALESCE($4, branch_name),
                preview_url = COALESCE($5, preview_url),
                build_log = COALESCE($6, build_log)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeatureRequest>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.branch_name)
            .bind(&input.preview_url)
            .bind(&input.build_log)
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-set the status.
    ///
    /// `started_at` is stamped the first time work begins, `completed_at`
    /// on completion or cancellation. A retry back to `pending` clears both
    /// and the previous error.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
        error_message: Option<&str>,
    ) -> Result<Option<FeatureRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE feature_requests SET
                status = $3,
                error_message = CASE
                    WHEN $3 = 'failed' THEN $4
                    WHEN $3 = 'pending' THEN NULL
                    ELSE error_message END,
                started_at = CASE
                    WHEN $3 = 'pending' THEN NULL
                    WHEN $3 = 'processing' THEN COALESCE(started_at, NOW())
                    ELSE started_at END,
                completed_at = CASE
                    WHEN $3 IN ('completed', 'cancelled') THEN NOW()
                    WHEN $3 = 'pending' THEN NULL
                    ELSE completed_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeatureRequest>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }
}
