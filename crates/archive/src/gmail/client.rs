//! Gmail API HTTP client
//!
//! Searches the mailbox and fetches full messages.
//! Uses synchronous HTTP (ureq); one request in flight at a time.

use anyhow::{Context, Result};
use log::debug;

use super::api::{GmailMessage, ListMessagesResponse};
use super::{GmailAuth, MailSource, SearchPage, normalize_message};
use crate::error::SetupError;
use crate::models::{EmailRecord, MessageId};

/// Gmail API client
pub struct GmailClient {
    auth: GmailAuth,
    page_size: usize,
}

impl GmailClient {
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Create a new Gmail client returning up to `page_size` ids per search page
    pub fn new(auth: GmailAuth, page_size: usize) -> Self {
        Self {
            auth,
            page_size: page_size.clamp(1, 500),
        }
    }

    /// Trigger authentication up front so setup errors surface before any work
    pub fn authenticate(&self) -> Result<()> {
        self.auth.get_access_token()?;
        Ok(())
    }

    /// GET a Gmail API URL as JSON, mapping 401/403 to a setup error
    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let access_token = self.auth.get_access_token()?;

        let response = ureq::get(url)
            .header("Authorization", &format!("Bearer {}", access_token))
            .call();

        match response {
            Ok(mut resp) => resp
                .body_mut()
                .read_json()
                .with_context(|| format!("Failed to parse {} response", what)),
            Err(ureq::Error::StatusCode(status @ (401 | 403))) => Err(SetupError::Unauthorized {
                status,
                token_path: self.auth.token_path().to_path_buf(),
            }
            .into()),
            Err(e) => Err(anyhow::anyhow!("Failed to send {} request: {}", what, e)),
        }
    }

    /// List message ids matching a Gmail search query
    pub fn list_messages(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse> {
        let mut url = format!(
            "{}/users/me/messages?q={}&maxResults={}",
            Self::BASE_URL,
            urlencoding::encode(query),
            self.page_size
        );

        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        self.get_json(&url, "list messages")
    }

    /// Get full message details by ID
    pub fn get_message(&self, id: &MessageId) -> Result<GmailMessage> {
        let url = format!(
            "{}/users/me/messages/{}?format=full",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );

        self.get_json(&url, "get message")
    }
}

impl MailSource for GmailClient {
    fn search(&self, query: &str, page_token: Option<&str>) -> Result<SearchPage> {
        let list = self.list_messages(query, page_token)?;
        let ids: Vec<MessageId> = list
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|m| MessageId::new(m.id))
            .collect();

        debug!(
            "Search page: {} ids (estimate {:?}), more: {}",
            ids.len(),
            list.result_size_estimate,
            list.next_page_token.is_some()
        );

        Ok(SearchPage {
            ids,
            next_page_token: list.next_page_token,
            result_size_estimate: list.result_size_estimate,
        })
    }

    fn fetch(&self, id: &MessageId) -> Result<EmailRecord> {
        let message = self.get_message(id)?;
        normalize_message(message)
    }
}
