//! Repository for the `payment_methods` table.

use sqlx::PgPool;
use hearth_core::types::DbId;

use crate::models::fee::{CreatePaymentMethod, PaymentMethod, UpdatePaymentMethod};

const COLUMNS: &str = "id, name, method_type, account_handle, instructions, fee_percent_bps, \
                        fee_flat_cents, fee_code_id, is_active, sort_order, created_at, updated_at";

pub struct PaymentMethodRepo;

impl PaymentMethodRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreatePaymentMethod,
    ) -> Result<PaymentMethod, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_methods
                (name, method_type, account_handle, instructions, fee_percent_bps,
                 fee_flat_cents, fee_code_id, sort_order)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 0), $7, COALESCE($8, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(&input.name)
            .bind(&input.method_type)
            .bind(&input.account_handle)
            .bind(&input.instructions)
            .bind(input.fee_percent_bps)
            .bind(input.fee_flat_cents)
            .bind(input.fee_code_id)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_methods WHERE id = $1");
        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List methods in display order.
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<PaymentMethod>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payment_methods
             WHERE (NOT $1 OR is_active)
             ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePaymentMethod,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        let query = format!(
            "UPDATE payment_methods SET
                name = COALESCE($2, name),
                account_handle = COALESCE($3, account_handle),
                instructions = COALESCE($4, instructions),
                fee_percent_bps = COALESCE($5, fee_percent_bps),
                fee_flat_cents = COALESCE($6, fee_flat_cents),
                fee_code_id = COALESCE($7, fee_code_id),
                is_active = COALESCE($8, is_active),
                sort_order = COALESCE($9, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.account_handle)
            .bind(&input.instructions)
            .bind(input.fee_percent_bps)
            .bind(input.fee_flat_cents)
            .bind(input.fee_code_id)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
