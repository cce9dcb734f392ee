//! File-based content storage

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::blob::ContentStore;
use crate::models::ProblemId;

/// Directory for content files inside the data directory
pub const SOLUTIONS_DIR: &str = "solutions";

const FILE_PREFIX: &str = "problem-";
const FILE_EXTENSION: &str = "md";

/// Markdown files named after the problem number
///
/// Directory structure:
/// ```text
/// solutions/
///   problem-1.md
///   problem-761.md
/// ```
pub struct FileContentStore {
    root: PathBuf,
}

impl FileContentStore {
    /// Create a content store under `<data_dir>/solutions`
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let root = data_dir.as_ref().join(SOLUTIONS_DIR);
        fs::create_dir_all(&root).context("Failed to create solutions directory")?;
        Ok(Self { root })
    }

    fn file_name(problem_id: ProblemId) -> String {
        format!("{}{}.{}", FILE_PREFIX, problem_id, FILE_EXTENSION)
    }

    /// Absolute path of the file for a problem
    pub fn path(&self, problem_id: ProblemId) -> PathBuf {
        self.root.join(Self::file_name(problem_id))
    }

    /// Problem number from a content file name, if it is one of ours
    fn parse_file_name(name: &str) -> Option<ProblemId> {
        name.strip_prefix(FILE_PREFIX)?
            .strip_suffix(FILE_EXTENSION)?
            .strip_suffix('.')?
            .parse()
            .ok()
            .map(ProblemId::new)
    }
}

impl ContentStore for FileContentStore {
    fn put(&self, problem_id: ProblemId, document: &str) -> Result<()> {
        let path = self.path(problem_id);
        if path.exists() {
            bail!("Content file already exists: {}", path.display());
        }

        // Write atomically (write to temp, then rename)
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, document)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to move content file into {}", path.display()))?;

        Ok(())
    }

    fn get(&self, problem_id: ProblemId) -> Result<Option<String>> {
        let path = self.path(problem_id);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn exists(&self, problem_id: ProblemId) -> Result<bool> {
        Ok(self.path(problem_id).exists())
    }

    fn relative_path(&self, problem_id: ProblemId) -> String {
        format!("{}/{}", SOLUTIONS_DIR, Self::file_name(problem_id))
    }

    fn list(&self) -> Result<Vec<ProblemId>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(id) = entry.file_name().to_str().and_then(Self::parse_file_name) {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }
}
