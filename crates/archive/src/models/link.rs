//! Link record model for a discovered solution link

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageId;

/// Source tag for links inserted by hand with `add-link`
pub const MANUAL_SOURCE: &str = "manual";

/// Daily Coding Problem problem number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(pub u32);

impl ProblemId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ProblemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A normalized solution link as persisted in `links.jsonl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Message the link was found in, or [`MANUAL_SOURCE`]
    pub source_message_id: MessageId,
    /// Normalized URL, unique within the store
    pub url: String,
    pub discovered_date: DateTime<Utc>,
}

impl LinkRecord {
    pub fn new(source_message_id: MessageId, url: impl Into<String>) -> Self {
        Self {
            source_message_id,
            url: url.into(),
            discovered_date: Utc::now(),
        }
    }

    /// Link added by an operator rather than found in an email
    pub fn manual(url: impl Into<String>) -> Self {
        Self::new(MessageId::new(MANUAL_SOURCE), url)
    }

    pub fn is_manual(&self) -> bool {
        self.source_message_id.as_str() == MANUAL_SOURCE
    }

    /// Problem number encoded in the link path, if the link is well formed
    pub fn problem_id(&self) -> Option<ProblemId> {
        crate::links::problem_id_from_url(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_id_from_record() {
        let link = LinkRecord::new(
            MessageId::new("m1"),
            "https://www.dailycodingproblem.com/solution/761?token=abc",
        );
        assert_eq!(link.problem_id(), Some(ProblemId::new(761)));
        assert!(!link.is_manual());
    }

    #[test]
    fn test_manual_link() {
        let link = LinkRecord::manual("https://www.dailycodingproblem.com/solution/5?token=t");
        assert!(link.is_manual());
        assert_eq!(link.source_message_id.as_str(), MANUAL_SOURCE);
    }

    #[test]
    fn test_problem_id_ordering() {
        let mut ids = vec![ProblemId::new(10), ProblemId::new(2), ProblemId::new(7)];
        ids.sort();
        assert_eq!(ids, vec![ProblemId::new(2), ProblemId::new(7), ProblemId::new(10)]);
    }
}
