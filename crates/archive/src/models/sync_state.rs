//! Progress of the mail fetch page walk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the last mail fetch left off
///
/// Saved after every page so an interrupted walk picks up at the page it was
/// on instead of starting over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailSyncState {
    /// Search query the walk belongs to
    pub query: String,
    /// Page token to resume from; `None` when no walk is in progress
    pub resume_page_token: Option<String>,
    /// Whether a walk has ever reached the last page
    pub backfilled: bool,
    pub updated_at: DateTime<Utc>,
}

impl MailSyncState {
    /// State for a query that has never been walked
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            resume_page_token: None,
            backfilled: false,
            updated_at: Utc::now(),
        }
    }

    /// Record the next page of an unfinished walk
    pub fn page_done(&mut self, next_page_token: String) {
        self.resume_page_token = Some(next_page_token);
        self.updated_at = Utc::now();
    }

    /// Record that the walk reached its end
    pub fn mark_complete(&mut self) {
        self.resume_page_token = None;
        self.backfilled = true;
        self.updated_at = Utc::now();
    }
}
