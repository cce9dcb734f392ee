//! Content index entry for a downloaded problem/solution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProblemId;

/// Index entry written to `contents.jsonl` after a content file is stored.
///
/// The file itself is the completion marker; the index records where it
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Link the content was fetched from
    pub url: String,
    pub problem_id: ProblemId,
    /// Path of the content file relative to the data directory
    pub file_path: String,
    pub fetched_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn new(url: impl Into<String>, problem_id: ProblemId, file_path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            problem_id,
            file_path: file_path.into(),
            fetched_at: Utc::now(),
        }
    }
}

/// Extracted problem and solution text for one problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemDocument {
    pub problem_id: ProblemId,
    pub problem: String,
    pub solution: String,
}

impl ProblemDocument {
    /// Render the document in the archive's markdown layout
    pub fn to_markdown(&self) -> String {
        format!(
            "## Problem #{}\n{}\n## Solution\n{}\n",
            self.problem_id,
            self.problem.trim_end(),
            self.solution.trim_end()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_layout() {
        let doc = ProblemDocument {
            problem_id: ProblemId::new(42),
            problem: "Reverse a list.\n".to_string(),
            solution: "Use two pointers.".to_string(),
        };
        assert_eq!(
            doc.to_markdown(),
            "## Problem #42\nReverse a list.\n## Solution\nUse two pointers.\n"
        );
    }
}
