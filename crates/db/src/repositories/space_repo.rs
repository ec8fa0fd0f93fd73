//! Repository for the `spaces` table.

use std::collections::HashMap;

use sqlx::PgPool;
use hearth_core::types::DbId;

use crate::models::space::{CreateSpace, Space, UpdateSpace};

const COLUMNS: &str = "id, parent_id, name, space_type, description, location, capacity, \
                        monthly_rate_cents, weekly_rate_cents, nightly_rate_cents, \
                        is_listed, is_archived, airbnb_ical_url, created_at, updated_at";

pub struct SpaceRepo;

impl SpaceRepo {
    pub async fn create(pool: &PgPool, input: &CreateSpace) -> Result<Space, sqlx::Error> {
        let query = format!(
            "INSERT INTO spaces
                (parent_id, name, space_type, description, location, capacity,
                 monthly_rate_cents, weekly_rate_cents, nightly_rate_cents, is_listed, airbnb_ical_url)
             VALUES ($1, $2, COALESCE($3, 'room'), $4, $5, $6, $7, $8, $9, COALESCE($10, true), $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(input.parent_id)
            .bind(&input.name)
            .bind(&input.space_type)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.capacity)
            .bind(input.monthly_rate_cents)
            .bind(input.weekly_rate_cents)
            .bind(input.nightly_rate_cents)
            .bind(input.is_listed)
            .bind(&input.airbnb_ical_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Space>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM spaces WHERE id = $1");
        sqlx::query_as::<_, Space>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List spaces ordered by name. Archived spaces are included only on request.
    pub async fn list(pool: &PgPool, include_archived: bool) -> Result<Vec<Space>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spaces
             WHERE ($1 OR is_archived = false)
             ORDER BY name"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(include_archived)
            .fetch_all(pool)
            .await
    }

    /// Map of every space id to its parent id, for cycle checks.
    pub async fn parent_map(pool: &PgPool) -> Result<HashMap<DbId, Option<DbId>>, sqlx::Error> {
        let rows: Vec<(DbId, Option<DbId>)> = sqlx::query_as("SELECT id, parent_id FROM spaces")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    /// Update a space. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSpace,
    ) -> Result<Option<Space>, sqlx::Error> {
        let query = format!(
            "UPDATE spaces SET
                parent_id = COALESCE($2, parent_id),
                name = COALESCE($3, name),
                space_type = COALESCE($4, space_type),
                description = COALESCE($5, description),
                location = COALESCE($6, location),
                capacity = COALESCE($7, capacity),
                monthly_rate_cents = COALESCE($8, monthly_rate_cents),
                weekly_rate_cents = COALESCE($9, weekly_rate_cents),
                nightly_rate_cents = COALESCE($10, nightly_rate_cents),
                is_listed = COALESCE($11, is_listed),
                is_archived = COALESCE($12, is_archived),
                airbnb_ical_url = COALESCE($13, airbnb_ical_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(id)
            .bind(input.parent_id)
            .bind(&input.name)
            .bind(&input.space_type)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.capacity)
            .bind(input.monthly_rate_cents)
            .bind(input.weekly_rate_cents)
            .bind(input.nightly_rate_cents)
            .bind(input.is_listed)
            .bind(input.is_archived)
            .bind(&input.airbnb_ical_url)
            .fetch_optional(pool)
            .await
    }

    /// Detach a space from its parent. Returns `true` if a row changed.
    pub async fn clear_parent(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE spaces SET parent_id = NULL WHERE id = $1 AND parent_id IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a space. Children are detached by the foreign key.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM spaces WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
