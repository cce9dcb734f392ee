//! Archive crate - Daily Coding Problem newsletter archiving
//!
//! This crate provides the batch jobs and everything they stand on:
//! - Domain models (EmailRecord, LinkRecord, ContentItem)
//! - Gmail API client and OAuth authentication
//! - Solution link extraction and normalization
//! - Content fetching with problem/solution extraction
//! - Append-only storage traits and file-backed implementations
//! - Maintenance checks and repairs
//!
//! There is no CLI code here; the `dcp` binary drives it through [`Session`].

pub mod content;
pub mod credentials;
pub mod error;
pub mod gmail;
pub mod jobs;
pub mod links;
pub mod models;
pub mod repair;
pub mod session;
pub mod settings;
pub mod storage;

pub use content::{ContentExtractor, HttpFetcher, PageFetcher};
pub use credentials::GmailCredentials;
pub use error::{FetchError, LinkError, SetupError};
pub use gmail::{GmailAuth, GmailClient, MailSource, SearchPage};
pub use jobs::{
    ContentStats, ExtractStats, FetchStats, extract_links, fetch_contents, fetch_emails,
};
pub use links::{LinkPattern, normalize_url, problem_id_from_url};
pub use models::{
    BodyFormat, ContentItem, EmailRecord, LinkRecord, MailSyncState, MessageId, ProblemDocument,
    ProblemId,
};
pub use repair::{AddLinksOutcome, CheckReport, add_links, check, reindex};
pub use session::Session;
pub use settings::{ContentSource, Settings};
pub use storage::{
    ArchiveStore, ContentStore, FileArchiveStore, FileContentStore, InMemoryArchiveStore,
};
