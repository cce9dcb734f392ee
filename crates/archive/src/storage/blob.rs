//! Content file storage trait (one file per problem)

use anyhow::Result;

use crate::models::ProblemId;

/// Trait for per-problem content files
///
/// The presence of a file is what marks a problem as downloaded.
pub trait ContentStore: Send + Sync {
    /// Store the document for a problem, replacing nothing that exists
    fn put(&self, problem_id: ProblemId, document: &str) -> Result<()>;

    /// Read the document for a problem, `None` if it was never stored
    fn get(&self, problem_id: ProblemId) -> Result<Option<String>>;

    /// Check if a document exists
    fn exists(&self, problem_id: ProblemId) -> Result<bool>;

    /// Path of the document relative to the data directory
    fn relative_path(&self, problem_id: ProblemId) -> String;

    /// All problems that have a document, ascending
    fn list(&self) -> Result<Vec<ProblemId>>;
}
