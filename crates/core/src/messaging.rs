//! SMS / WhatsApp message validation.
//!
//! Phone numbers are stored in E.164. Segment counting follows the carrier
//! rules: GSM-7 bodies fit 160 characters in one segment (153 when
//! concatenated), anything else is UCS-2 with 70 (67).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const CHANNEL_SMS: &str = "sms";
pub const CHANNEL_WHATSAPP: &str = "whatsapp";
pub const VALID_CHANNELS: &[&str] = &[CHANNEL_SMS, CHANNEL_WHATSAPP];

pub const DIRECTION_INBOUND: &str = "inbound";
pub const DIRECTION_OUTBOUND: &str = "outbound";

pub const DELIVERY_QUEUED: &str = "queued";
pub const DELIVERY_SENT: &str = "sent";
pub const DELIVERY_FAILED: &str = "failed";
pub const DELIVERY_RECEIVED: &str = "received";

/// Maximum body length accepted for a single outbound message.
pub const MAX_BODY_CHARS: usize = 1600;

/// Characters in the GSM 03.38 basic set (plus the extension table).
const GSM_BASIC: &str = "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?\
¡ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà";
const GSM_EXTENDED: &str = "^{}\\[~]|€\u{000C}";

/// Outcome tally of a bulk send. Individual failures never abort the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSendSummary {
    pub sent: usize,
    pub failed: usize,
}

impl BulkSendSummary {
    pub fn record(&mut self, ok: bool) {
        if ok {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
    }
}

pub fn validate_channel(channel: &str) -> Result<(), CoreError> {
    if VALID_CHANNELS.contains(&channel) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid channel '{channel}'. Must be one of: {}",
            VALID_CHANNELS.join(", ")
        )))
    }
}

/// Normalise a phone number to E.164.
///
/// Punctuation and spaces are dropped. Ten-digit numbers are treated as
/// North American and get `+1`; eleven digits starting with `1` get `+`.
/// Anything already prefixed with `+` keeps its country code.
pub fn normalize_phone(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    let invalid = || CoreError::Validation(format!("Invalid phone number '{raw}'"));

    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' ')))
    {
        return Err(invalid());
    }

    let normalized = if has_plus {
        format!("+{digits}")
    } else if digits.len() == 10 {
        format!("+1{digits}")
    } else if digits.len() == 11 && digits.starts_with('1') {
        format!("+{digits}")
    } else {
        return Err(invalid());
    };

    // E.164 allows at most 15 digits after the plus.
    let len = normalized.len() - 1;
    if !(8..=15).contains(&len) {
        return Err(invalid());
    }
    Ok(normalized)
}

pub fn validate_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation("Message body must not be empty".into()));
    }
    let chars = body.chars().count();
    if chars > MAX_BODY_CHARS {
        return Err(CoreError::Validation(format!(
            "Message body is {chars} characters (max {MAX_BODY_CHARS})"
        )));
    }
    Ok(())
}

/// Whether every character of `body` encodes in GSM-7.
pub fn is_gsm7(body: &str) -> bool {
    body.chars()
        .all(|c| GSM_BASIC.contains(c) || GSM_EXTENDED.contains(c))
}

/// Number of carrier segments `body` will be billed as.
pub fn segment_count(body: &str) -> usize {
    let (single, multi, units) = if is_gsm7(body) {
        // Extension characters take two septets.
        let septets = body
            .chars()
            .map(|c| if GSM_EXTENDED.contains(c) { 2 } else { 1 })
            .sum::<usize>();
        (160, 153, septets)
    } else {
        (70, 67, body.encode_utf16().count())
    };
    if units == 0 {
        0
    } else if units <= single {
        1
    } else {
        units.div_ceil(multi)
    }
}
