//! Email record model for a stored newsletter message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a message (Gmail message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which representation of the message the stored body holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    #[default]
    Html,
    Text,
}

/// A newsletter email as persisted in `emails.jsonl`
///
/// Created once per message id and never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Gmail message ID
    pub message_id: MessageId,
    /// Subject line
    pub subject: String,
    /// When Gmail received the message
    pub received_date: DateTime<Utc>,
    /// Decoded body, HTML when the message has an HTML part
    pub raw_body: String,
    #[serde(default)]
    pub body_format: BodyFormat,
}

impl EmailRecord {
    /// Create a new email record builder
    pub fn builder(message_id: MessageId) -> EmailRecordBuilder {
        EmailRecordBuilder::new(message_id)
    }

    pub fn is_html(&self) -> bool {
        self.body_format == BodyFormat::Html
    }
}

/// Builder for creating EmailRecord instances
pub struct EmailRecordBuilder {
    message_id: MessageId,
    subject: String,
    received_date: Option<DateTime<Utc>>,
    raw_body: String,
    body_format: BodyFormat,
}

impl EmailRecordBuilder {
    fn new(message_id: MessageId) -> Self {
        Self {
            message_id,
            subject: String::new(),
            received_date: None,
            raw_body: String::new(),
            body_format: BodyFormat::Html,
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn received_date(mut self, received_date: DateTime<Utc>) -> Self {
        self.received_date = Some(received_date);
        self
    }

    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.raw_body = body.into();
        self.body_format = BodyFormat::Html;
        self
    }

    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.raw_body = body.into();
        self.body_format = BodyFormat::Text;
        self
    }

    pub fn build(self) -> EmailRecord {
        EmailRecord {
            message_id: self.message_id,
            subject: self.subject,
            received_date: self.received_date.unwrap_or_else(Utc::now),
            raw_body: self.raw_body,
            body_format: self.body_format,
        }
    }
}
