//! Repository for the `people` table.

use sqlx::PgPool;
use hearth_core::types::DbId;

use crate::models::person::{CreatePerson, Person, UpdatePerson};

const COLUMNS: &str =
    "id, first_name, last_name, email, phone, person_type, notes, created_at, updated_at";

pub struct PersonRepo;

impl PersonRepo {
    /// Insert a person. `phone` must already be normalised to E.164.
    pub async fn create(pool: &PgPool, input: &CreatePerson) -> Result<Person, sqlx::Error> {
        let query = format!(
            "INSERT INTO people (first_name, last_name, email, phone, person_type, notes)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'resident'), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.person_type)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM people WHERE id = $1");
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find everyone with the given E.164 phone number.
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Vec<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM people WHERE phone = $1 ORDER BY id");
        sqlx::query_as::<_, Person>(&query)
            .bind(phone)
            .fetch_all(pool)
            .await
    }

    /// List people, optionally filtered by type, with a case-insensitive
    /// name/email search.
    pub async fn list(
        pool: &PgPool,
        person_type: Option<&str>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Person>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM people
             WHERE ($1::TEXT IS NULL OR person_type = $1)
               AND ($2::TEXT IS NULL
                    OR first_name ILIKE '%' || $2 || '%'
                    OR last_name ILIKE '%' || $2 || '%'
                    OR email ILIKE '%' || $2 || '%')
             ORDER BY first_name, last_name, id
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(person_type)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePerson,
    ) -> Result<Option<Person>, sqlx::Error> {
        let query = format!(
            "UPDATE people SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                person_type = COALESCE($6, person_type),
                notes = COALESCE($7, notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.person_type)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a person. Fails with a foreign-key violation while they still
    /// have assignments or applications.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
