//! Storage trait definitions

use crate::models::{ContentItem, EmailRecord, LinkRecord, MailSyncState, MessageId, ProblemId};
use anyhow::Result;

/// Trait for the archive's append-only record lists
///
/// Records are never updated or removed. Each `append_*` either persists the
/// record or, if its key is already present, leaves the store untouched and
/// returns `false`.
pub trait ArchiveStore: Send + Sync {
    /// Check if an email record exists
    fn has_email(&self, id: &MessageId) -> Result<bool>;

    /// Append an email record, returning whether it was new
    fn append_email(&self, email: EmailRecord) -> Result<bool>;

    /// All email records in insertion order
    fn list_emails(&self) -> Result<Vec<EmailRecord>>;

    /// Check if a link (normalized URL) exists
    fn has_link(&self, url: &str) -> Result<bool>;

    /// Append a link record, returning whether it was new
    fn append_link(&self, link: LinkRecord) -> Result<bool>;

    /// All link records in insertion order
    fn list_links(&self) -> Result<Vec<LinkRecord>>;

    /// Check if the content index has an entry for a problem
    fn has_content(&self, problem_id: ProblemId) -> Result<bool>;

    /// Append a content index entry, returning whether it was new
    fn append_content(&self, item: ContentItem) -> Result<bool>;

    /// All content index entries in insertion order
    fn list_contents(&self) -> Result<Vec<ContentItem>>;

    /// Progress of the last mail fetch, if any was saved
    fn mail_sync_state(&self) -> Result<Option<MailSyncState>>;

    /// Replace the saved mail fetch progress
    fn save_mail_sync_state(&self, state: &MailSyncState) -> Result<()>;
}
