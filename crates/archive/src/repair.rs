//! Maintenance operations: consistency check and manual repairs
//!
//! None of these run as part of the batch jobs.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use anyhow::Result;
use log::{info, warn};

use crate::error::LinkError;
use crate::links::parse_solution_link;
use crate::models::{ContentItem, LinkRecord, ProblemId};
use crate::storage::{ArchiveStore, ContentStore};

/// Findings of [`check`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CheckReport {
    /// Lowest and highest problem number covered by links
    pub range: Option<(ProblemId, ProblemId)>,
    /// Distinct problem numbers with at least one link
    pub linked: usize,
    /// Problem numbers inside `range` with no link
    pub missing: Vec<ProblemId>,
    /// Problem numbers linked more than once, with their urls
    pub duplicates: Vec<(ProblemId, Vec<String>)>,
    /// Stored links without a problem number
    pub invalid_links: Vec<String>,
    /// Linked problems that have no content file
    pub orphans: Vec<ProblemId>,
    /// Content files with no content index record
    pub unindexed: Vec<ProblemId>,
}

impl CheckReport {
    /// Number of problems the range implies
    pub fn expected(&self) -> usize {
        self.range
            .map(|(lo, hi)| (hi.get() - lo.get()) as usize + 1)
            .unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.duplicates.is_empty()
            && self.invalid_links.is_empty()
            && self.orphans.is_empty()
            && self.unindexed.is_empty()
    }
}

fn join_ids(ids: &[ProblemId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some((lo, hi)) => {
                writeln!(f, "Problems linked: {} to {}", lo, hi)?;
                writeln!(f, "Expected {}, have {}", self.expected(), self.linked)?;
            }
            None => writeln!(f, "No links stored")?,
        }
        if !self.missing.is_empty() {
            writeln!(f, "Missing problems ({}): {}", self.missing.len(), join_ids(&self.missing))?;
        }
        for (id, urls) in &self.duplicates {
            writeln!(f, "Duplicate problem {} ({} links)", id, urls.len())?;
            for url in urls {
                writeln!(f, "  {}", url)?;
            }
        }
        for url in &self.invalid_links {
            writeln!(f, "Link without problem number: {}", url)?;
        }
        if !self.orphans.is_empty() {
            writeln!(f, "Not downloaded ({}): {}", self.orphans.len(), join_ids(&self.orphans))?;
        }
        if !self.unindexed.is_empty() {
            writeln!(f, "Files not indexed ({}): {}", self.unindexed.len(), join_ids(&self.unindexed))?;
        }
        if self.is_clean() {
            writeln!(f, "No problems found")?;
        }
        Ok(())
    }
}

/// Compare links, content files and the content index
pub fn check(store: &dyn ArchiveStore, contents: &dyn ContentStore) -> Result<CheckReport> {
    let mut report = CheckReport::default();
    let mut by_problem: BTreeMap<ProblemId, Vec<String>> = BTreeMap::new();

    for link in store.list_links()? {
        match link.problem_id() {
            Some(id) => by_problem.entry(id).or_default().push(link.url),
            None => report.invalid_links.push(link.url),
        }
    }

    let first = by_problem.keys().next().copied();
    let last = by_problem.keys().next_back().copied();
    if let (Some(lo), Some(hi)) = (first, last) {
        report.range = Some((lo, hi));
        report.missing = (lo.get()..=hi.get())
            .map(ProblemId::new)
            .filter(|id| !by_problem.contains_key(id))
            .collect();
    }
    report.linked = by_problem.len();

    let files: BTreeSet<ProblemId> = contents.list()?.into_iter().collect();
    let indexed: HashSet<ProblemId> = store
        .list_contents()?
        .into_iter()
        .map(|item| item.problem_id)
        .collect();

    for (id, urls) in by_problem {
        if !files.contains(&id) {
            report.orphans.push(id);
        }
        if urls.len() > 1 {
            report.duplicates.push((id, urls));
        }
    }
    report.unindexed = files.into_iter().filter(|id| !indexed.contains(id)).collect();

    Ok(report)
}

/// Result of [`add_links`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AddLinksOutcome {
    /// Normalized urls that were appended
    pub added: Vec<String>,
    /// Normalized urls that were already stored
    pub known: Vec<String>,
    /// Inputs that are not solution links
    pub rejected: Vec<(String, LinkError)>,
}

/// Append hand-picked links, tagged as manual
///
/// Each url is validated and normalized the same way extracted links are.
pub fn add_links<S: AsRef<str>>(store: &dyn ArchiveStore, urls: &[S]) -> Result<AddLinksOutcome> {
    let mut outcome = AddLinksOutcome::default();

    for raw in urls {
        let raw = raw.as_ref().trim();
        let url = match parse_solution_link(raw) {
            Ok((url, _)) => url,
            Err(e) => {
                warn!("Rejected {}: {}", raw, e);
                outcome.rejected.push((raw.to_string(), e));
                continue;
            }
        };

        if store.append_link(LinkRecord::manual(url.clone()))? {
            info!("Added link {}", url);
            outcome.added.push(url);
        } else {
            outcome.known.push(url);
        }
    }

    Ok(outcome)
}

/// Index content files that are on disk but missing from the content index
///
/// Only files whose problem has a stored link are indexed; the first such
/// link becomes the record's url. Returns the number of records appended.
pub fn reindex(store: &dyn ArchiveStore, contents: &dyn ContentStore) -> Result<usize> {
    let mut first_link: BTreeMap<ProblemId, String> = BTreeMap::new();
    for link in store.list_links()? {
        if let Some(id) = link.problem_id() {
            first_link.entry(id).or_insert(link.url);
        }
    }

    let mut added = 0;
    for id in contents.list()? {
        if store.has_content(id)? {
            continue;
        }
        let Some(url) = first_link.get(&id) else {
            warn!("Content file for problem {} has no stored link, not indexing", id);
            continue;
        };
        if store.append_content(ContentItem::new(url.clone(), id, contents.relative_path(id)))? {
            added += 1;
        }
    }

    info!("Reindex appended {} content records", added);
    Ok(added)
}
