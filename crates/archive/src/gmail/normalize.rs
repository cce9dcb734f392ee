//! Gmail API response normalization
//!
//! Converts Gmail API messages to [`EmailRecord`]s.

use anyhow::{Context, Result};
use base64::prelude::*;
use chrono::{TimeZone, Utc};
use log::warn;

use super::api::{GmailMessage, MessagePart};
use crate::models::{EmailRecord, MessageId};

/// Normalize a Gmail API message to an email record.
///
/// The HTML part is preferred since that is where the newsletter puts its
/// links; plain text is the fallback.
pub fn normalize_message(gmail_msg: GmailMessage) -> Result<EmailRecord> {
    let id = MessageId::new(&gmail_msg.id);

    let payload = gmail_msg
        .payload
        .as_ref()
        .with_context(|| format!("Message {} has no payload", id))?;

    let subject = extract_header(payload, "Subject").unwrap_or_default();

    // internalDate is milliseconds since epoch, as a string
    let internal_date: i64 = gmail_msg
        .internal_date
        .as_deref()
        .and_then(|d| d.parse().ok())
        .unwrap_or(0);
    let received_date = Utc
        .timestamp_millis_opt(internal_date)
        .single()
        .unwrap_or_else(Utc::now);

    let builder = EmailRecord::builder(id.clone())
        .subject(subject)
        .received_date(received_date);

    let record = if let Some(html) = find_body(payload, "text/html") {
        builder.html_body(html)
    } else if let Some(text) = find_body(payload, "text/plain") {
        builder.text_body(text)
    } else {
        warn!("Message {} has no text or HTML body", id);
        builder.text_body("")
    };

    Ok(record.build())
}

/// Extract a header value by name
fn extract_header(part: &MessagePart, name: &str) -> Option<String> {
    part.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}

/// Depth-first search for the first part of the given MIME type with data
fn find_body(part: &MessagePart, mime: &str) -> Option<String> {
    if part
        .mime_type
        .as_ref()
        .is_some_and(|m| m.starts_with(mime))
        && let Some(body) = &part.body
        && let Some(data) = &body.data
        && let Some(text) = decode_base64_body(data)
    {
        return Some(text);
    }

    part.parts
        .as_ref()?
        .iter()
        .find_map(|nested| find_body(nested, mime))
}

/// Decode base64-encoded body data
///
/// Gmail uses URL-safe base64 but padding varies, so try several decoders.
fn decode_base64_body(data: &str) -> Option<String> {
    let decoders: &[&base64::engine::GeneralPurpose] = &[
        &BASE64_URL_SAFE_NO_PAD,
        &BASE64_URL_SAFE,
        &BASE64_STANDARD,
        &BASE64_STANDARD_NO_PAD,
    ];

    decoders
        .iter()
        .filter_map(|decoder| decoder.decode(data).ok())
        .find_map(|decoded| String::from_utf8(decoded).ok())
}
