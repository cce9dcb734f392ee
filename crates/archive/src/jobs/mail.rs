//! Mail fetcher: newsletter emails into the email record list

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::gmail::MailSource;
use crate::models::MailSyncState;
use crate::storage::ArchiveStore;

/// Statistics from a mail fetch run
#[derive(Debug, Default, Clone)]
pub struct FetchStats {
    /// Result pages requested from the provider
    pub pages: usize,
    /// Message ids returned across all pages
    pub messages_seen: usize,
    /// New email records appended
    pub messages_stored: usize,
    /// Ids skipped because they were already stored
    pub messages_skipped: usize,
    pub duration_ms: u64,
}

/// Fetch every matching message not yet in the store
///
/// Progress is saved after each page. A run that was interrupted resumes at
/// the page it stopped on, and the walk goes on to the last page. Once a walk
/// has completed for this query, later runs stop at the first non-empty page
/// whose ids are all stored. Any provider error aborts the run; records
/// appended before it stay valid.
pub fn fetch_emails(
    source: &dyn MailSource,
    store: &dyn ArchiveStore,
    query: &str,
) -> Result<FetchStats> {
    let start = std::time::Instant::now();
    let mut stats = FetchStats::default();

    let mut state = match store.mail_sync_state()? {
        Some(saved) if saved.query == query => saved,
        Some(_) => {
            info!("Search query changed, walking the mailbox from the start");
            MailSyncState::new(query)
        }
        None => MailSyncState::new(query),
    };
    let mut page_token = state.resume_page_token.clone();
    let mut resuming = page_token.is_some();

    if resuming {
        info!("Resuming interrupted mail fetch: {}", query);
    } else {
        info!("Searching mailbox: {}", query);
    }

    loop {
        let page = match source.search(query, page_token.as_deref()) {
            Ok(page) => page,
            Err(e) if resuming => {
                warn!("Saved page token rejected ({:#}), starting from the first page", e);
                resuming = false;
                page_token = None;
                continue;
            }
            Err(e) => return Err(e).context("Failed to list messages"),
        };
        resuming = false;
        stats.pages += 1;
        stats.messages_seen += page.ids.len();

        debug!(
            "Page {}: {} ids (estimate {:?})",
            stats.pages,
            page.ids.len(),
            page.result_size_estimate
        );

        let mut new_on_page = 0;
        for id in &page.ids {
            if store.has_email(id)? {
                stats.messages_skipped += 1;
                continue;
            }

            let email = source
                .fetch(id)
                .with_context(|| format!("Failed to fetch message {}", id))?;
            if store.append_email(email)? {
                stats.messages_stored += 1;
                new_on_page += 1;
            }
        }

        if state.backfilled && !page.ids.is_empty() && new_on_page == 0 {
            debug!("Page {} held only known messages, stopping", stats.pages);
            break;
        }

        match page.next_page_token {
            Some(token) if !page.ids.is_empty() => {
                state.page_done(token.clone());
                store.save_mail_sync_state(&state)?;
                page_token = Some(token);
            }
            _ => break,
        }
    }

    state.mark_complete();
    store.save_mail_sync_state(&state)?;

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Mail fetch done: {} pages, {} seen, {} stored, {} already present in {}ms",
        stats.pages,
        stats.messages_seen,
        stats.messages_stored,
        stats.messages_skipped,
        stats.duration_ms
    );
    Ok(stats)
}
