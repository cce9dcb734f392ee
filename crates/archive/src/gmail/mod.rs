//! Gmail API integration
//!
//! This module provides:
//! - OAuth2 authentication flow
//! - Gmail API client for searching and fetching messages
//! - Normalization of API messages to [`EmailRecord`]s
//! - The [`MailSource`] seam the mail fetcher runs against

mod auth;
mod client;
mod normalize;

pub use auth::{GmailAuth, TOKEN_FILE};
pub use client::GmailClient;
pub use normalize::normalize_message;

use anyhow::Result;

use crate::models::{EmailRecord, MessageId};

/// One page of search results
#[derive(Debug, Default, Clone)]
pub struct SearchPage {
    pub ids: Vec<MessageId>,
    pub next_page_token: Option<String>,
    pub result_size_estimate: Option<u32>,
}

/// A mailbox the mail fetcher can search and read
pub trait MailSource {
    /// Return one page of message ids matching `query`
    fn search(&self, query: &str, page_token: Option<&str>) -> Result<SearchPage>;

    /// Fetch one message and normalize it to an email record
    fn fetch(&self, id: &MessageId) -> Result<EmailRecord>;
}

/// Gmail API response types
pub mod api {
    use serde::Deserialize;

    /// Response from listing messages
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Reference to a message (just ID and thread ID)
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageRef {
        pub id: String,
        pub thread_id: Option<String>,
    }

    /// Full message from Gmail API
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GmailMessage {
        pub id: String,
        #[serde(default)]
        pub internal_date: Option<String>,
        pub payload: Option<MessagePart>,
    }

    /// Email header (name-value pair)
    #[derive(Debug, Deserialize)]
    pub struct Header {
        pub name: String,
        pub value: String,
    }

    /// Message body (base64url encoded)
    #[derive(Debug, Deserialize)]
    pub struct MessageBody {
        pub size: Option<u32>,
        pub data: Option<String>,
    }

    /// Message part; the top-level payload has the same shape
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagePart {
        pub mime_type: Option<String>,
        pub headers: Option<Vec<Header>>,
        pub body: Option<MessageBody>,
        pub parts: Option<Vec<MessagePart>>,
    }
}
