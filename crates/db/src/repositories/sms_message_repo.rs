//! Repository for the `sms_messages` table.

use sqlx::PgPool;
use hearth_core::types::DbId;

use crate::models::sms_message::{CreateSmsMessage, SmsMessage};

const COLUMNS: &str = "id, person_id, channel, direction, from_number, to_number, body, \
                        delivery_status, provider_message_id, error_message, sent_by, \
                        created_at, updated_at";

pub struct SmsMessageRepo;

impl SmsMessageRepo {
    pub async fn create(pool: &PgPool, input: &CreateSmsMessage) -> Result<SmsMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO sms_messages
                (person_id, channel, direction, from_number, to_number, body,
                 delivery_status, provider_message_id, error_message, sent_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SmsMessage>(&query)
            .bind(input.person_id)
            .bind(&input.channel)
            .bind(&input.direction)
            .bind(&input.from_number)
            .bind(&input.to_number)
            .bind(&input.body)
            .bind(&input.delivery_status)
            .bind(&input.provider_message_id)
            .bind(&input.error_message)
            .bind(input.sent_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SmsMessage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sms_messages WHERE id = $1");
        sqlx::query_as::<_, SmsMessage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Message log, newest first, optionally for one person.
    pub async fn list(
        pool: &PgPool,
        person_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SmsMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sms_messages
             WHERE ($1::BIGINT IS NULL OR person_id = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, SmsMessage>(&query)
            .bind(person_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
