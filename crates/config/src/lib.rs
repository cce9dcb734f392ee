//! Configuration loading for the dcp archive tools
//!
//! Resolves the shared config directory (~/.config/dcp-archive/) and the
//! data directory (~/.local/share/dcp-archive/), and reads/writes JSON files
//! inside them.
//!
//! Nothing here is global: callers resolve a [`ConfigDir`] once at startup
//! and pass it to whatever needs it.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Directory name used under the platform config and data directories
pub const APP_DIR: &str = "dcp-archive";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "DCP_CONFIG_DIR";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "DCP_DATA_DIR";

/// Platform default config directory (~/.config/dcp-archive/)
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// Platform default data directory (~/.local/share/dcp-archive/)
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR))
}

/// Pick the first available directory: explicit value, environment variable,
/// then the platform default.
fn resolve_dir(
    explicit: Option<PathBuf>,
    env_var: &str,
    fallback: Option<PathBuf>,
) -> Option<PathBuf> {
    explicit
        .or_else(|| std::env::var_os(env_var).map(PathBuf::from))
        .or(fallback)
}

/// Resolve the data directory without creating it
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    resolve_dir(explicit, DATA_DIR_ENV, default_data_dir())
        .context("Could not determine data directory")
}

/// Handle to the config directory
#[derive(Debug, Clone)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    /// Use a specific directory as the config directory
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the config directory from an explicit path, `DCP_CONFIG_DIR`,
    /// or the platform default, and make sure it exists.
    pub fn init(explicit: Option<PathBuf>) -> Result<Self> {
        let root = resolve_dir(explicit, CONFIG_DIR_ENV, default_config_dir())
            .context("Could not determine config directory")?;
        let dir = Self { root };
        dir.ensure()?;
        Ok(dir)
    }

    /// Root of the config directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path to a file within the config directory
    pub fn path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Check if a file exists in the config directory
    pub fn exists(&self, filename: &str) -> bool {
        self.path(filename).exists()
    }

    /// Ensure the config directory exists
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create config directory: {}", self.root.display())
        })
    }

    /// Load and parse a JSON file from the config directory
    pub fn load_json<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        load_json_file(&self.path(filename))
    }

    /// Load a JSON file if present, `None` otherwise
    pub fn load_json_opt<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        if self.exists(filename) {
            self.load_json(filename).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a value as pretty JSON, creating parent directories.
///
/// The file is replaced atomically (temp file, then rename).
pub fn save_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
