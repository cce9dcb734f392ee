//! In-memory storage implementation
//!
//! Used by tests and dry runs; nothing is persisted.

use anyhow::Result;
use std::collections::HashSet;
use std::sync::RwLock;

use super::ArchiveStore;
use crate::models::{ContentItem, EmailRecord, LinkRecord, MailSyncState, MessageId, ProblemId};

/// One append-only list plus the set of keys already in it
pub(super) struct RecordList<T, K> {
    pub(super) records: Vec<T>,
    pub(super) keys: HashSet<K>,
}

impl<T, K: std::hash::Hash + Eq> RecordList<T, K> {
    pub(super) fn new() -> Self {
        Self {
            records: Vec::new(),
            keys: HashSet::new(),
        }
    }

    pub(super) fn push(&mut self, key: K, record: T) -> bool {
        if self.keys.insert(key) {
            self.records.push(record);
            true
        } else {
            false
        }
    }
}

/// In-memory implementation of ArchiveStore
pub struct InMemoryArchiveStore {
    emails: RwLock<RecordList<EmailRecord, String>>,
    links: RwLock<RecordList<LinkRecord, String>>,
    contents: RwLock<RecordList<ContentItem, ProblemId>>,
    mail_sync: RwLock<Option<MailSyncState>>,
}

impl InMemoryArchiveStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            emails: RwLock::new(RecordList::new()),
            links: RwLock::new(RecordList::new()),
            contents: RwLock::new(RecordList::new()),
            mail_sync: RwLock::new(None),
        }
    }
}

impl Default for InMemoryArchiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveStore for InMemoryArchiveStore {
    fn has_email(&self, id: &MessageId) -> Result<bool> {
        Ok(self.emails.read().unwrap().keys.contains(id.as_str()))
    }

    fn append_email(&self, email: EmailRecord) -> Result<bool> {
        let key = email.message_id.as_str().to_string();
        Ok(self.emails.write().unwrap().push(key, email))
    }

    fn list_emails(&self) -> Result<Vec<EmailRecord>> {
        Ok(self.emails.read().unwrap().records.clone())
    }

    fn has_link(&self, url: &str) -> Result<bool> {
        Ok(self.links.read().unwrap().keys.contains(url))
    }

    fn append_link(&self, link: LinkRecord) -> Result<bool> {
        let key = link.url.clone();
        Ok(self.links.write().unwrap().push(key, link))
    }

    fn list_links(&self) -> Result<Vec<LinkRecord>> {
        Ok(self.links.read().unwrap().records.clone())
    }

    fn has_content(&self, problem_id: ProblemId) -> Result<bool> {
        Ok(self.contents.read().unwrap().keys.contains(&problem_id))
    }

    fn append_content(&self, item: ContentItem) -> Result<bool> {
        let key = item.problem_id;
        Ok(self.contents.write().unwrap().push(key, item))
    }

    fn list_contents(&self) -> Result<Vec<ContentItem>> {
        Ok(self.contents.read().unwrap().records.clone())
    }

    fn mail_sync_state(&self) -> Result<Option<MailSyncState>> {
        Ok(self.mail_sync.read().unwrap().clone())
    }

    fn save_mail_sync_state(&self, state: &MailSyncState) -> Result<()> {
        *self.mail_sync.write().unwrap() = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(id: &str) -> EmailRecord {
        EmailRecord::builder(MessageId::new(id))
            .subject("Daily Coding Problem")
            .text_body("body")
            .build()
    }

    #[test]
    fn test_append_email_is_idempotent() {
        let store = InMemoryArchiveStore::new();
        assert!(store.append_email(email("m1")).unwrap());
        assert!(!store.append_email(email("m1")).unwrap());
        assert_eq!(store.list_emails().unwrap().len(), 1);
        assert!(store.has_email(&MessageId::new("m1")).unwrap());
        assert!(!store.has_email(&MessageId::new("m2")).unwrap());
    }

    #[test]
    fn test_links_keep_insertion_order() {
        let store = InMemoryArchiveStore::new();
        store
            .append_link(LinkRecord::manual("https://a.example/solution/2"))
            .unwrap();
        store
            .append_link(LinkRecord::manual("https://a.example/solution/1"))
            .unwrap();

        let urls: Vec<String> = store.list_links().unwrap().into_iter().map(|l| l.url).collect();
        assert_eq!(
            urls,
            vec!["https://a.example/solution/2", "https://a.example/solution/1"]
        );
    }

    #[test]
    fn test_mail_sync_state_is_replaced() {
        let store = InMemoryArchiveStore::new();
        assert_eq!(store.mail_sync_state().unwrap(), None);

        let mut state = MailSyncState::new("from:x");
        store.save_mail_sync_state(&state).unwrap();
        state.mark_complete();
        store.save_mail_sync_state(&state).unwrap();

        assert_eq!(store.mail_sync_state().unwrap(), Some(state));
    }
}
