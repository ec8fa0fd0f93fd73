//! Repository for the `assignments` and `assignment_spaces` tables.
//!
//! An assignment and its space links are always written together inside
//! one transaction, so readers never see an assignment without its spaces.

use sqlx::PgPool;
use hearth_core::types::DbId;

use crate::models::assignment::{
    Assignment, CreateAssignment, SpaceOccupancyRow, UpdateAssignment,
};

/// Column list shared across queries. `space_ids` is aggregated from the
/// junction table, so every query aliases `assignments` as `a`.
pub(crate) const COLUMNS: &str = "a.id, a.person_id, a.status, a.start_date, a.end_date, \
                        a.desired_departure_date, a.desired_departure_listed, \
                        a.rate_cents, a.rate_term, a.notes, \
                        ARRAY(SELECT s.space_id FROM assignment_spaces s \
                              WHERE s.assignment_id = a.id ORDER BY s.space_id) AS space_ids, \
                        a.created_at, a.updated_at";

pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Insert an assignment together with its space links.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAssignment,
    ) -> Result<Assignment, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO assignments
                (person_id, status, start_date, end_date, desired_departure_date,
                 desired_departure_listed, rate_cents, rate_term, notes)
             VALUES ($1, COALESCE($2, 'prospect'), $3, $4, $5, COALESCE($6, false), $7,
                     COALESCE($8, 'monthly'), $9)
             RETURNING id",
        )
        .bind(input.person_id)
        .bind(&input.status)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.desired_departure_date)
        .bind(input.desired_departure_listed)
        .bind(input.rate_cents)
        .bind(&input.rate_term)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_spaces_inner(&mut tx, id, &input.space_ids).await?;

        let query = format!("SELECT {COLUMNS} FROM assignments a WHERE a.id = $1");
        let assignment = sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assignments a WHERE a.id = $1");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List assignments, newest start date first, with optional filters.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        person_id: Option<DbId>,
        space_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments a
             WHERE ($1::TEXT IS NULL OR a.status = $1)
               AND ($2::BIGINT IS NULL OR a.person_id = $2)
               AND ($3::BIGINT IS NULL OR EXISTS (
                        SELECT 1 FROM assignment_spaces s
                        WHERE s.assignment_id = a.id AND s.space_id = $3))
             ORDER BY a.start_date DESC, a.id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(status)
            .bind(person_id)
            .bind(space_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every (space, assignment) pair whose assignment can occupy a space.
    ///
    /// Prospects, completed and cancelled assignments are excluded; they
    /// never influence availability.
    pub async fn list_occupancies(pool: &PgPool) -> Result<Vec<SpaceOccupancyRow>, sqlx::Error> {
        sqlx::query_as::<_, SpaceOccupancyRow>(
            "SELECT s.space_id, a.id AS assignment_id, a.person_id, a.status,
                    a.start_date, a.end_date, a.desired_departure_date, a.desired_departure_listed
             FROM assignment_spaces s
             JOIN assignments a ON a.id = s.assignment_id
             WHERE a.status IN ('active', 'pending_contract', 'contract_sent')
             ORDER BY s.space_id, a.start_date, a.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Update an assignment. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAssignment,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "WITH updated AS (
                UPDATE assignments SET
                    status = COALESCE($2, status),
                    start_date = COALESCE($3, start_date),
                    end_date = COALESCE($4, end_date),
                    desired_departure_date = COALESCE($5, desired_departure_date),
                    desired_departure_listed = COALESCE($6, desired_departure_listed),
                    rate_cents = COALESCE($7, rate_cents),
                    rate_term = COALESCE($8, rate_term),
                    notes = COALESCE($9, notes)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM updated a"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(&input.status)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.desired_departure_date)
            .bind(input.desired_departure_listed)
            .bind(input.rate_cents)
            .bind(&input.rate_term)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Replace the set of spaces an assignment covers.
    ///
    /// Returns `None` if the assignment does not exist. The row is locked for
    /// the duration so concurrent relinks serialise.
    pub async fn set_spaces(
        pool: &PgPool,
        id: DbId,
        space_ids: &[DbId],
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM assignments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        Self::replace_spaces_inner(&mut tx, id, space_ids).await?;

        let query = format!("SELECT {COLUMNS} FROM assignments a WHERE a.id = $1");
        let assignment = sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(assignment))
    }

    /// Permanently delete an assignment. Space links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete-then-insert the junction rows for one assignment.
    pub(crate) async fn replace_spaces_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        assignment_id: DbId,
        space_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM assignment_spaces WHERE assignment_id = $1")
            .bind(assignment_id)
            .execute(&mut **tx)
            .await?;

        for &space_id in space_ids {
            sqlx::query(
                "INSERT INTO assignment_spaces (assignment_id, space_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(assignment_id)
            .bind(space_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
