//! Link extractor: solution links out of stored email bodies

use anyhow::Result;
use log::{info, warn};

use crate::links::{LinkPattern, extract_from_email};
use crate::models::LinkRecord;
use crate::storage::ArchiveStore;

/// Statistics from a link extraction run
#[derive(Debug, Default, Clone)]
pub struct ExtractStats {
    pub emails_scanned: usize,
    /// Links appended to the store
    pub links_added: usize,
    /// Valid links that were already stored
    pub links_known: usize,
    /// Matching candidates that were not usable links
    pub links_malformed: usize,
    /// Emails without any matching candidate
    pub emails_without_links: usize,
    pub duration_ms: u64,
}

/// Scan every stored email and append links that are not yet stored
///
/// Deterministic for a given set of emails: a re-run appends nothing.
pub fn extract_links(store: &dyn ArchiveStore, pattern: &LinkPattern) -> Result<ExtractStats> {
    let start = std::time::Instant::now();
    let mut stats = ExtractStats::default();

    for email in store.list_emails()? {
        stats.emails_scanned += 1;
        let found = extract_from_email(&email, pattern);

        if found.is_empty() {
            info!(
                "No solution link in message {} ({:?})",
                email.message_id, email.subject
            );
            stats.emails_without_links += 1;
            continue;
        }

        for skipped in &found.skipped {
            warn!(
                "Skipping malformed link in message {}: {}",
                email.message_id, skipped.reason
            );
            stats.links_malformed += 1;
        }

        for link in found.links {
            if store.has_link(&link.url)? {
                stats.links_known += 1;
                continue;
            }
            let record = LinkRecord::new(email.message_id.clone(), link.url);
            if store.append_link(record)? {
                stats.links_added += 1;
            } else {
                stats.links_known += 1;
            }
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Link extraction done: {} emails, {} new links, {} known, {} malformed, {} without links in {}ms",
        stats.emails_scanned,
        stats.links_added,
        stats.links_known,
        stats.links_malformed,
        stats.emails_without_links,
        stats.duration_ms
    );
    Ok(stats)
}
