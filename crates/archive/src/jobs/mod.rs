//! The three batch jobs
//!
//! Each job is idempotent and can be re-run after an interruption; progress
//! is durable record by record.

mod content;
mod links;
mod mail;

pub use content::{ContentStats, fetch_contents};
pub use links::{ExtractStats, extract_links};
pub use mail::{FetchStats, fetch_emails};
