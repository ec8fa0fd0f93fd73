//! SMS / WhatsApp message model.

use serde::Serialize;
use sqlx::FromRow;
use hearth_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SmsMessage {
    pub id: DbId,
    pub person_id: Option<DbId>,
    pub channel: String,
    pub direction: String,
    pub from_number: String,
    pub to_number: String,
    pub body: String,
    pub delivery_status: String,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
    pub sent_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO, built by the send handlers after the gateway responds.
#[derive(Debug, Clone)]
pub struct CreateSmsMessage {
    pub person_id: Option<DbId>,
    pub channel: String,
    pub direction: String,
    pub from_number: String,
    pub to_number: String,
    pub body: String,
    pub delivery_status: String,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
    pub sent_by: Option<DbId>,
}
