//! Flat-file storage: one JSON object per line, append-only
//!
//! Directory layout:
//! ```text
//! <data_dir>/
//!   emails.jsonl      # EmailRecord per line
//!   links.jsonl       # LinkRecord per line
//!   contents.jsonl    # ContentItem per line
//!   mail-sync.json    # MailSyncState, rewritten after every page
//!   solutions/        # content files, see FileContentStore
//! ```
//!
//! Each list is read once at open to build its key set. Appends write one
//! line and flush before returning, so an interrupted run leaves every file
//! with whole records only.

use std::fs::{self, File, OpenOptions};
use std::hash::Hash;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ArchiveStore;
use super::memory::RecordList;
use crate::models::{ContentItem, EmailRecord, LinkRecord, MailSyncState, MessageId, ProblemId};

pub const EMAILS_FILE: &str = "emails.jsonl";
pub const LINKS_FILE: &str = "links.jsonl";
pub const CONTENTS_FILE: &str = "contents.jsonl";
pub const MAIL_SYNC_FILE: &str = "mail-sync.json";

/// An append-only JSON lines file mirrored in memory
struct JsonlLog<T, K> {
    path: PathBuf,
    file: File,
    list: RecordList<T, K>,
}

impl<T, K> JsonlLog<T, K>
where
    T: Serialize + DeserializeOwned,
    K: Hash + Eq,
{
    fn open(path: PathBuf, key_of: impl Fn(&T) -> K) -> Result<Self> {
        let mut list = RecordList::new();

        if path.exists() {
            let reader = BufReader::new(
                File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?,
            );
            for (index, line) in reader.lines().enumerate() {
                let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: T = serde_json::from_str(&line).with_context(|| {
                    format!("Malformed record on line {} of {}", index + 1, path.display())
                })?;
                if !list.push(key_of(&record), record) {
                    warn!(
                        "Duplicate record on line {} of {}, keeping the first",
                        index + 1,
                        path.display()
                    );
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {} for append", path.display()))?;

        debug!("Loaded {} records from {}", list.records.len(), path.display());
        Ok(Self { path, file, list })
    }

    fn append(&mut self, key: K, record: T) -> Result<bool> {
        if self.list.keys.contains(&key) {
            return Ok(false);
        }

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;

        Ok(self.list.push(key, record))
    }
}

/// ArchiveStore backed by JSON lines files in the data directory
pub struct FileArchiveStore {
    root: PathBuf,
    emails: RwLock<JsonlLog<EmailRecord, String>>,
    links: RwLock<JsonlLog<LinkRecord, String>>,
    contents: RwLock<JsonlLog<ContentItem, ProblemId>>,
    mail_sync: RwLock<Option<MailSyncState>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("archive store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("archive store lock poisoned"))
}

impl FileArchiveStore {
    /// Open (or create) the store in `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory: {}", root.display()))?;

        let emails = JsonlLog::open(root.join(EMAILS_FILE), |e: &EmailRecord| {
            e.message_id.as_str().to_string()
        })?;
        let links = JsonlLog::open(root.join(LINKS_FILE), |l: &LinkRecord| l.url.clone())?;
        let contents = JsonlLog::open(root.join(CONTENTS_FILE), |c: &ContentItem| c.problem_id)?;

        let sync_path = root.join(MAIL_SYNC_FILE);
        let mail_sync = if sync_path.exists() {
            Some(config::load_json_file(&sync_path)?)
        } else {
            None
        };

        Ok(Self {
            root,
            emails: RwLock::new(emails),
            links: RwLock::new(links),
            contents: RwLock::new(contents),
            mail_sync: RwLock::new(mail_sync),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArchiveStore for FileArchiveStore {
    fn has_email(&self, id: &MessageId) -> Result<bool> {
        Ok(read(&self.emails)?.list.keys.contains(id.as_str()))
    }

    fn append_email(&self, email: EmailRecord) -> Result<bool> {
        let key = email.message_id.as_str().to_string();
        write(&self.emails)?.append(key, email)
    }

    fn list_emails(&self) -> Result<Vec<EmailRecord>> {
        Ok(read(&self.emails)?.list.records.clone())
    }

    fn has_link(&self, url: &str) -> Result<bool> {
        Ok(read(&self.links)?.list.keys.contains(url))
    }

    fn append_link(&self, link: LinkRecord) -> Result<bool> {
        let key = link.url.clone();
        write(&self.links)?.append(key, link)
    }

    fn list_links(&self) -> Result<Vec<LinkRecord>> {
        Ok(read(&self.links)?.list.records.clone())
    }

    fn has_content(&self, problem_id: ProblemId) -> Result<bool> {
        Ok(read(&self.contents)?.list.keys.contains(&problem_id))
    }

    fn append_content(&self, item: ContentItem) -> Result<bool> {
        let key = item.problem_id;
        write(&self.contents)?.append(key, item)
    }

    fn list_contents(&self) -> Result<Vec<ContentItem>> {
        Ok(read(&self.contents)?.list.records.clone())
    }

    fn mail_sync_state(&self) -> Result<Option<MailSyncState>> {
        Ok(read(&self.mail_sync)?.clone())
    }

    fn save_mail_sync_state(&self, state: &MailSyncState) -> Result<()> {
        let mut current = write(&self.mail_sync)?;
        config::save_json_file(&self.root.join(MAIL_SYNC_FILE), state)?;
        *current = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn email(id: &str) -> EmailRecord {
        EmailRecord::builder(MessageId::new(id))
            .subject("Daily Coding Problem: Problem #1")
            .html_body("<a href=\"https://www.dailycodingproblem.com/solution/1?token=t\">s</a>")
            .build()
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();

        {
            let store = FileArchiveStore::open(dir.path()).unwrap();
            assert!(store.append_email(email("m1")).unwrap());
            assert!(
                store
                    .append_link(LinkRecord::new(
                        MessageId::new("m1"),
                        "https://www.dailycodingproblem.com/solution/1?token=t"
                    ))
                    .unwrap()
            );
        }

        let store = FileArchiveStore::open(dir.path()).unwrap();
        assert!(store.has_email(&MessageId::new("m1")).unwrap());
        assert!(
            store
                .has_link("https://www.dailycodingproblem.com/solution/1?token=t")
                .unwrap()
        );
        let emails = store.list_emails().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].raw_body, email("m1").raw_body);
    }

    #[test]
    fn test_duplicate_append_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = FileArchiveStore::open(dir.path()).unwrap();

        store.append_email(email("m1")).unwrap();
        let size_before = fs::metadata(dir.path().join(EMAILS_FILE)).unwrap().len();

        assert!(!store.append_email(email("m1")).unwrap());
        let size_after = fs::metadata(dir.path().join(EMAILS_FILE)).unwrap().len();
        assert_eq!(size_before, size_after);
    }

    #[test]
    fn test_one_record_per_line() {
        let dir = tempdir().unwrap();
        let store = FileArchiveStore::open(dir.path()).unwrap();
        store.append_email(email("m1")).unwrap();
        store.append_email(email("m2")).unwrap();

        let content = fs::read_to_string(dir.path().join(EMAILS_FILE)).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_malformed_line_reports_location() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(LINKS_FILE), "{\"url\": \n").unwrap();

        let err = FileArchiveStore::open(dir.path()).err().unwrap();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 1"), "{}", msg);
        assert!(msg.contains(LINKS_FILE), "{}", msg);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let dir = tempdir().unwrap();
        {
            let store = FileArchiveStore::open(dir.path()).unwrap();
            store
                .append_content(ContentItem::new("u", ProblemId::new(3), "solutions/problem-3.md"))
                .unwrap();
        }
        let path = dir.path().join(CONTENTS_FILE);
        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str("\n\n");
        fs::write(&path, content).unwrap();

        let store = FileArchiveStore::open(dir.path()).unwrap();
        assert!(store.has_content(ProblemId::new(3)).unwrap());
        assert_eq!(store.list_contents().unwrap().len(), 1);
        assert!(store.list_emails().unwrap().is_empty());
    }

    #[test]
    fn test_mail_sync_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let mut state = MailSyncState::new("from:x");
        state.page_done("page-2".into());

        {
            let store = FileArchiveStore::open(dir.path()).unwrap();
            assert_eq!(store.mail_sync_state().unwrap(), None);
            store.save_mail_sync_state(&state).unwrap();
        }

        assert!(dir.path().join(MAIL_SYNC_FILE).is_file());
        let store = FileArchiveStore::open(dir.path()).unwrap();
        assert_eq!(store.mail_sync_state().unwrap(), Some(state));
    }
}
