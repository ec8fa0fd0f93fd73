//! Handlers for outbound SMS / WhatsApp messaging.
//!
//! Every attempted send is persisted with its delivery status, including
//! failures reported by the gateway.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use hearth_core::error::CoreError;
use hearth_core::messaging::{
    normalize_phone, segment_count, validate_body, validate_channel, BulkSendSummary, CHANNEL_SMS,
    DELIVERY_FAILED, DELIVERY_SENT, DIRECTION_OUTBOUND,
};
use hearth_core::types::DbId;
use hearth_db::models::sms_message::{CreateSmsMessage, SmsMessage};
use hearth_db::repositories::{PersonRepo, SmsMessageRepo};
use hearth_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::sms_gateway::{OutboundSms, SmsError};
use crate::state::AppState;

/// Sends in flight at once during a bulk send.
const BULK_CONCURRENCY: usize = 8;

#[derive(Debug, Default, Deserialize)]
pub struct MessageFilter {
    pub person_id: Option<DbId>,
}

/// Body of `POST /sms/send`. Either `person_id` or `to` names the recipient.
#[derive(Debug, Deserialize)]
pub struct SendSmsRequest {
    pub person_id: Option<DbId>,
    pub to: Option<String>,
    pub channel: Option<String>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkSmsRequest {
    #[serde(default)]
    pub person_ids: Vec<DbId>,
    /// Raw phone numbers, normalised before sending.
    #[serde(default)]
    pub recipients: Vec<String>,
    pub channel: Option<String>,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct SentMessage {
    #[serde(flatten)]
    pub message: SmsMessage,
    pub segments: usize,
}

/// GET /api/v1/sms/messages
pub async fn list_messages(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<MessageFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<SmsMessage>>>> {
    let (limit, offset) = page.resolve();
    let messages = SmsMessageRepo::list(&state.pool, filter.person_id, limit, offset).await?;
    Ok(Json(DataResponse { data: messages }))
}

/// POST /api/v1/sms/send
///
/// A gateway failure is stored as a `failed` message and reported as an error.
pub async fn send_message(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<SendSmsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SentMessage>>)> {
    let channel = resolve_channel(input.channel.as_deref())?;
    validate_body(&input.body)?;

    let (person_id, to) = match (input.person_id, input.to.as_deref()) {
        (Some(person_id), _) => (Some(person_id), person_phone(&state.pool, person_id).await?),
        (None, Some(raw)) => {
            let to = normalize_phone(raw)?;
            (person_for_phone(&state.pool, &to).await?, to)
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either 'person_id' or 'to' is required".into(),
            ))
        }
    };

    let outbound = OutboundSms {
        channel,
        to,
        body: input.body,
    };
    let (message, failure) = deliver(&state, &outbound, person_id, user.user_id).await?;
    if let Some(err) = failure {
        return Err(err.into());
    }

    tracing::info!(
        message_id = message.id,
        channel = %message.channel,
        user_id = user.user_id,
        "SMS sent",
    );
    let segments = segment_count(&message.body);
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SentMessage { message, segments },
        }),
    ))
}

/// POST /api/v1/sms/bulk
///
/// Sends the same body to every recipient and reports how many went out.
/// Recipients that cannot be resolved to a phone number count as failed.
pub async fn send_bulk(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<BulkSmsRequest>,
) -> AppResult<Json<DataResponse<BulkSendSummary>>> {
    let channel = resolve_channel(input.channel.as_deref())?;
    validate_body(&input.body)?;
    if input.person_ids.is_empty() && input.recipients.is_empty() {
        return Err(AppError::BadRequest("No recipients given".into()));
    }

    let mut summary = BulkSendSummary::default();
    let mut targets: Vec<(Option<DbId>, String)> = Vec::new();

    for person_id in &input.person_ids {
        match person_phone(&state.pool, *person_id).await {
            Ok(phone) => targets.push((Some(*person_id), phone)),
            Err(e) => {
                tracing::warn!(person_id = *person_id, error = %e, "Bulk SMS recipient skipped");
                summary.record(false);
            }
        }
    }
    for raw in &input.recipients {
        match normalize_phone(raw) {
            Ok(phone) => {
                let person_id = person_for_phone(&state.pool, &phone)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(recipient = %phone, error = %e, "Recipient lookup failed");
                        None
                    });
                targets.push((person_id, phone));
            }
            Err(e) => {
                tracing::warn!(recipient = %raw, error = %e, "Bulk SMS recipient skipped");
                summary.record(false);
            }
        }
    }

    let sent_by = user.user_id;
    let outcomes: Vec<bool> = stream::iter(targets)
        .map(|(person_id, to)| {
            let state = &state;
            let outbound = OutboundSms {
                channel: channel.clone(),
                to,
                body: input.body.clone(),
            };
            async move {
                match deliver(state, &outbound, person_id, sent_by).await {
                    Ok((_, None)) => true,
                    Ok((_, Some(_))) => false,
                    Err(e) => {
                        tracing::error!(to = %outbound.to, error = %e, "Failed to record bulk SMS");
                        false
                    }
                }
            }
        })
        .buffer_unordered(BULK_CONCURRENCY)
        .collect()
        .await;

    for ok in outcomes {
        summary.record(ok);
    }

    tracing::info!(
        sent = summary.sent,
        failed = summary.failed,
        user_id = user.user_id,
        "Bulk SMS finished",
    );
    Ok(Json(DataResponse { data: summary }))
}

/// Send one message and persist it with the outcome.
///
/// Returns the stored row and the gateway error, if the send failed.
async fn deliver(
    state: &AppState,
    outbound: &OutboundSms,
    person_id: Option<DbId>,
    sent_by: DbId,
) -> Result<(SmsMessage, Option<SmsError>), sqlx::Error> {
    let result = state.sms_gateway.send(outbound).await;

    let (delivery_status, provider_message_id, error_message, failure) = match result {
        Ok(receipt) => (DELIVERY_SENT, receipt.provider_message_id, None, None),
        Err(e) => {
            tracing::warn!(to = %outbound.to, error = %e, "SMS gateway send failed");
            (DELIVERY_FAILED, None, Some(e.to_string()), Some(e))
        }
    };

    let record = CreateSmsMessage {
        person_id,
        channel: outbound.channel.clone(),
        direction: DIRECTION_OUTBOUND.to_string(),
        from_number: state.sms_gateway.from_number().to_string(),
        to_number: outbound.to.clone(),
        body: outbound.body.clone(),
        delivery_status: delivery_status.to_string(),
        provider_message_id,
        error_message,
        sent_by: Some(sent_by),
    };
    let message = SmsMessageRepo::create(&state.pool, &record).await?;
    Ok((message, failure))
}

fn resolve_channel(channel: Option<&str>) -> Result<String, CoreError> {
    let channel = channel.unwrap_or(CHANNEL_SMS);
    validate_channel(channel)?;
    Ok(channel.to_string())
}

/// The person a bare number belongs to, when exactly one person has it.
async fn person_for_phone(pool: &DbPool, phone: &str) -> Result<Option<DbId>, sqlx::Error> {
    let mut people = PersonRepo::find_by_phone(pool, phone).await?;
    if people.len() == 1 {
        Ok(people.pop().map(|p| p.id))
    } else {
        Ok(None)
    }
}

async fn person_phone(pool: &DbPool, person_id: DbId) -> AppResult<String> {
    let person = PersonRepo::find_by_id(pool, person_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Person", person_id))?;
    let phone = person.phone.clone().ok_or_else(|| {
        CoreError::Validation(format!("{} has no phone number", person.display_name()))
    })?;
    Ok(phone)
}
