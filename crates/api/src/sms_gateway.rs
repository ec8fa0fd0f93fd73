//! Outbound SMS / WhatsApp delivery.
//!
//! The console never talks to a carrier directly: [`HttpSmsGateway`] posts to
//! a serverless send endpoint that holds the provider credentials.
//! [`LogOnlyGateway`] is used when no endpoint is configured.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("SMS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("SMS gateway returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

/// One message to send.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundSms {
    /// `sms` or `whatsapp`.
    pub channel: String,
    /// E.164 recipient.
    pub to: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    pub provider_message_id: Option<String>,
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, message: &OutboundSms) -> Result<SendReceipt, SmsError>;

    /// The number messages are sent from, recorded on every stored message.
    fn from_number(&self) -> &str;
}

// ---------------------------------------------------------------------------
// HTTP gateway
// ---------------------------------------------------------------------------

pub struct HttpSmsGateway {
    client: reqwest::Client,
    endpoint_url: String,
    api_key: Option<String>,
    from_number: String,
}

#[derive(Serialize)]
struct SendPayload<'a> {
    channel: &'a str,
    to: &'a str,
    from: &'a str,
    body: &'a str,
}

/// Whatever id the provider hands back; the field name varies by provider.
#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    #[serde(alias = "sid", alias = "message_id")]
    id: Option<String>,
}

impl HttpSmsGateway {
    pub fn new(endpoint_url: &str, api_key: Option<&str>, from_number: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            endpoint_url: endpoint_url.to_string(),
            api_key: api_key.map(str::to_string),
            from_number: from_number.to_string(),
        }
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send(&self, message: &OutboundSms) -> Result<SendReceipt, SmsError> {
        let payload = SendPayload {
            channel: &message.channel,
            to: &message.to,
            from: &self.from_number,
            body: &message.body,
        };

        let mut request = self.client.post(&self.endpoint_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!(to = %message.to, status = status.as_u16(), "SMS gateway rejected message");
            return Err(SmsError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: SendResponse = serde_json::from_str(&text).unwrap_or_default();
        Ok(SendReceipt {
            provider_message_id: parsed.id,
        })
    }

    fn from_number(&self) -> &str {
        &self.from_number
    }
}

// ---------------------------------------------------------------------------
// Log-only gateway
// ---------------------------------------------------------------------------

/// Accepts every message and only logs it.
pub struct LogOnlyGateway {
    from_number: String,
}

impl LogOnlyGateway {
    pub fn new(from_number: &str) -> Self {
        Self {
            from_number: from_number.to_string(),
        }
    }
}

#[async_trait]
impl SmsGateway for LogOnlyGateway {
    async fn send(&self, message: &OutboundSms) -> Result<SendReceipt, SmsError> {
        tracing::info!(
            channel = %message.channel,
            to = %message.to,
            chars = message.body.chars().count(),
            "SMS gateway not configured; message logged only",
        );
        Ok(SendReceipt::default())
    }

    fn from_number(&self) -> &str {
        &self.from_number
    }
}
