//! Storage traits and implementations
//!
//! Record lists (emails, links, content index) sit behind [`ArchiveStore`];
//! per-problem documents sit behind [`ContentStore`]. Both have file-backed
//! implementations for real runs; record lists also have an in-memory one.

mod blob;
mod blob_file;
mod file;
mod memory;
mod traits;

pub use blob::ContentStore;
pub use blob_file::{FileContentStore, SOLUTIONS_DIR};
pub use file::{CONTENTS_FILE, EMAILS_FILE, FileArchiveStore, LINKS_FILE, MAIL_SYNC_FILE};
pub use memory::InMemoryArchiveStore;
pub use traits::ArchiveStore;
