//! Repository for the `rental_applications` table.

use sqlx::PgPool;
use hearth_core::types::{Cents, Date, DbId};

use crate::models::assignment::Assignment;
use crate::models::rental_application::{
    CreateRentalApplication, RentalApplication, UpdateRentalApplication,
};

const COLUMNS: &str = "id, person_id, desired_space_id, application_status, agreement_status, \
                        deposit_status, desired_move_in, desired_move_out, rate_cents, rate_term, \
                        security_deposit_cents, deposit_paid_cents, assignment_id, notes, \
                        submitted_at, created_at, updated_at";

/// Assignment fields decided by the caller when converting an application.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub assignment_status: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    /// Rate the deposits were quoted at; may come from the desired space.
    pub rate_cents: Option<Cents>,
}

pub struct RentalApplicationRepo;

impl RentalApplicationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateRentalApplication,
    ) -> Result<RentalApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO rental_applications
                (person_id, desired_space_id, application_status, desired_move_in,
                 desired_move_out, rate_cents, rate_term, security_deposit_cents, notes)
             VALUES ($1, $2, COALESCE($3, 'submitted'), $4, $5, $6, COALESCE($7, 'monthly'), $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalApplication>(&query)
            .bind(input.person_id)
            .bind(input.desired_space_id)
            .bind(&input.application_status)
            .bind(input.desired_move_in)
            .bind(input.desired_move_out)
            .bind(input.rate_cents)
            .bind(&input.rate_term)
            .bind(input.security_deposit_cents)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RentalApplication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_applications WHERE id = $1");
        sqlx::query_as::<_, RentalApplication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List applications, oldest submission first.
    pub async fn list(
        pool: &PgPool,
        application_status: Option<&str>,
        person_id: Option<DbId>,
    ) -> Result<Vec<RentalApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_applications
             WHERE ($1::TEXT IS NULL OR application_status = $1)
               AND ($2::BIGINT IS NULL OR person_id = $2)
             ORDER BY submitted_at, id"
        );
        sqlx::query_as::<_, RentalApplication>(&query)
            .bind(application_status)
            .bind(person_id)
            .fetch_all(pool)
            .await
    }

    /// All applications that still have a pipeline stage.
    pub async fn list_open(pool: &PgPool) -> Result<Vec<RentalApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_applications
             WHERE application_status NOT IN ('denied', 'withdrawn', 'converted')
             ORDER BY submitted_at, id"
        );
        sqlx::query_as::<_, RentalApplication>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRentalApplication,
    ) -> Result<Option<RentalApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE rental_applications SET
                desired_space_id = COALESCE($2, desired_space_id),
                desired_move_in = COALESCE($3, desired_move_in),
                desired_move_out = COALESCE($4, desired_move_out),
                rate_cents = COALESCE($5, rate_cents),
                rate_term = COALESCE($6, rate_term),
                security_deposit_cents = COALESCE($7, security_deposit_cents),
                notes = COALESCE($8, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalApplication>(&query)
            .bind(id)
            .bind(input.desired_space_id)
            .bind(input.desired_move_in)
            .bind(input.desired_move_out)
            .bind(input.rate_cents)
            .bind(&input.rate_term)
            .bind(input.security_deposit_cents)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Move to `to` only if the row is still in `from`.
    ///
    /// Returns `None` when the application is missing or was changed
    /// concurrently.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<RentalApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE rental_applications SET application_status = $3
             WHERE id = $1 AND application_status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalApplication>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-set on `agreement_status`. Same `None` semantics as
    /// [`Self::transition_status`].
    pub async fn transition_agreement(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<RentalApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE rental_applications SET agreement_status = $3
             WHERE id = $1 AND agreement_status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalApplication>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    /// Record a payment total computed from `expected_paid`.
    ///
    /// Returns `None` if the stored total no longer equals `expected_paid`
    /// (another payment landed first) or the row is missing.
    pub async fn record_payment(
        pool: &PgPool,
        id: DbId,
        expected_paid: Cents,
        new_paid: Cents,
        deposit_status: &str,
    ) -> Result<Option<RentalApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE rental_applications SET
                deposit_paid_cents = $3,
                deposit_status = $4
             WHERE id = $1 AND deposit_paid_cents = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalApplication>(&query)
            .bind(id)
            .bind(expected_paid)
            .bind(new_paid)
            .bind(deposit_status)
            .fetch_optional(pool)
            .await
    }

    /// Set `deposit_status` directly (e.g. staff confirming receipt).
    pub async fn set_deposit_status(
        pool: &PgPool,
        id: DbId,
        deposit_status: &str,
    ) -> Result<Option<RentalApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE rental_applications SET deposit_status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalApplication>(&query)
            .bind(id)
            .bind(deposit_status)
            .fetch_optional(pool)
            .await
    }

    /// Turn a ready application into an assignment.
    ///
    /// In one transaction: lock the application, re-check it is approved
    /// with a signed agreement and a received deposit, insert the
    /// assignment, link the desired space, and mark the application
    /// `converted`. Returns `None` if the application is not (or no longer)
    /// ready.
    pub async fn convert(
        pool: &PgPool,
        id: DbId,
        plan: &ConversionPlan,
    ) -> Result<Option<(RentalApplication, Assignment)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock_query = format!(
            "SELECT {COLUMNS} FROM rental_applications
             WHERE id = $1
               AND application_status = 'approved'
               AND agreement_status = 'signed'
               AND deposit_status IN ('received', 'confirmed')
             FOR UPDATE"
        );
        let Some(application) = sqlx::query_as::<_, RentalApplication>(&lock_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let assignment_id: DbId = sqlx::query_scalar(
            "INSERT INTO assignments (person_id, status, start_date, end_date, rate_cents, rate_term)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(application.person_id)
        .bind(&plan.assignment_status)
        .bind(plan.start_date)
        .bind(plan.end_date)
        .bind(plan.rate_cents)
        .bind(&application.rate_term)
        .fetch_one(&mut *tx)
        .await?;

        let space_ids: Vec<DbId> = application.desired_space_id.into_iter().collect();
        super::AssignmentRepo::replace_spaces_inner(&mut tx, assignment_id, &space_ids).await?;

        let update_query = format!(
            "UPDATE rental_applications SET
                application_status = 'converted',
                assignment_id = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let application = sqlx::query_as::<_, RentalApplication>(&update_query)
            .bind(id)
            .bind(assignment_id)
            .fetch_one(&mut *tx)
            .await?;

        let assignment = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {} FROM assignments a WHERE a.id = $1",
            super::assignment_repo::COLUMNS
        ))
        .bind(assignment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((application, assignment)))
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rental_applications WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
