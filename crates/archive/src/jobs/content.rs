//! Content fetcher: problem/solution documents for stored links

use anyhow::Result;
use log::{debug, info, warn};

use crate::content::{ContentExtractor, PageFetcher};
use crate::error::FetchError;
use crate::models::{ContentItem, LinkRecord, ProblemDocument};
use crate::storage::{ArchiveStore, ContentStore};

/// Statistics from a content fetch run
#[derive(Debug, Default)]
pub struct ContentStats {
    /// Links considered
    pub links: usize,
    /// Documents written in this run
    pub fetched: usize,
    /// Links whose document already existed (no request made)
    pub already_present: usize,
    /// Per-link failures, in the order they happened
    pub failures: Vec<(String, FetchError)>,
    pub duration_ms: u64,
}

impl ContentStats {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Fetch the document for every link that has no content file yet
///
/// Requests run one at a time. A failed link is recorded in
/// [`ContentStats::failures`] and the run moves on; only storage errors
/// abort.
pub fn fetch_contents(
    fetcher: &dyn PageFetcher,
    store: &dyn ArchiveStore,
    contents: &dyn ContentStore,
    extractor: &ContentExtractor,
) -> Result<ContentStats> {
    let start = std::time::Instant::now();
    let mut stats = ContentStats::default();

    for link in store.list_links()? {
        stats.links += 1;

        let Some(problem_id) = link.problem_id() else {
            warn!("Stored link has no problem number: {}", link.url);
            stats
                .failures
                .push((link.url.clone(), FetchError::NoProblemId(link.url)));
            continue;
        };

        if contents.exists(problem_id)? {
            debug!("Problem {} already downloaded", problem_id);
            stats.already_present += 1;
            continue;
        }

        match extractor.fetch(fetcher, &link.url, problem_id) {
            Ok(document) => {
                store_document(store, contents, &link, &document)?;
                stats.fetched += 1;
            }
            Err(e) => {
                warn!("Failed to fetch problem {}: {}", problem_id, e);
                stats.failures.push((link.url, e));
            }
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Content fetch done: {} links, {} fetched, {} already present, {} failed in {}ms",
        stats.links,
        stats.fetched,
        stats.already_present,
        stats.failed(),
        stats.duration_ms
    );
    Ok(stats)
}

/// Write the document under its problem number, then its index record
fn store_document(
    store: &dyn ArchiveStore,
    contents: &dyn ContentStore,
    link: &LinkRecord,
    document: &ProblemDocument,
) -> Result<()> {
    let problem_id = document.problem_id;
    contents.put(problem_id, &document.to_markdown())?;
    store.append_content(ContentItem::new(
        link.url.clone(),
        problem_id,
        contents.relative_path(problem_id),
    ))?;
    info!("Saved problem {}", problem_id);
    Ok(())
}
