//! Repository for the `fee_codes` table.

use sqlx::PgPool;
use hearth_core::types::DbId;

use crate::models::fee::{CreateFeeCode, FeeCode, UpdateFeeCode};

const COLUMNS: &str = "id, code, label, default_amount_cents, is_active, created_at, updated_at";

pub struct FeeCodeRepo;

impl FeeCodeRepo {
    pub async fn create(pool: &PgPool, input: &CreateFeeCode) -> Result<FeeCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO fee_codes (code, label, default_amount_cents)
             VALUES ($1, $2, COALESCE($3, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeeCode>(&query)
            .bind(&input.code)
            .bind(&input.label)
            .bind(input.default_amount_cents)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FeeCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fee_codes WHERE id = $1");
        sqlx::query_as::<_, FeeCode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<FeeCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fee_codes WHERE (NOT $1 OR is_active) ORDER BY code"
        );
        sqlx::query_as::<_, FeeCode>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFeeCode,
    ) -> Result<Option<FeeCode>, sqlx::Error> {
        let query = format!(
            "UPDATE fee_codes SET
                label = COALESCE($2, label),
                default_amount_cents = COALESCE($3, default_amount_cents),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeeCode>(&query)
            .bind(id)
            .bind(&input.label)
            .bind(input.default_amount_cents)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a fee code. Payment methods referencing it are detached.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM fee_codes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
