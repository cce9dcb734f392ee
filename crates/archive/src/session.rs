//! Per-invocation session
//!
//! Built once at startup from the config directory and passed to every
//! operation. Holds the settings and the opened stores; network clients are
//! created on demand so offline commands never touch credentials.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::ConfigDir;
use log::{debug, info};

use crate::content::{ContentExtractor, HttpFetcher};
use crate::credentials::GmailCredentials;
use crate::gmail::{GmailAuth, GmailClient, TOKEN_FILE};
use crate::jobs::{self, ContentStats, ExtractStats, FetchStats};
use crate::links::LinkPattern;
use crate::repair::{self, AddLinksOutcome, CheckReport};
use crate::settings::Settings;
use crate::storage::{FileArchiveStore, FileContentStore};

pub struct Session {
    config_dir: ConfigDir,
    settings: Settings,
    data_dir: PathBuf,
    store: FileArchiveStore,
    contents: FileContentStore,
}

impl Session {
    /// Resolve directories, load settings and open the stores
    ///
    /// `data_dir` wins over `settings.json`, which wins over the platform
    /// default.
    pub fn open(config_dir: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = ConfigDir::init(config_dir)?;
        let settings = Settings::load(&config_dir)
            .with_context(|| format!("Invalid settings in {}", config_dir.root().display()))?;
        let data_dir = config::resolve_data_dir(data_dir.or_else(|| settings.data_dir.clone()))?;
        Self::with_settings(config_dir, settings, data_dir)
    }

    /// Open a session with explicit settings
    pub fn with_settings(config_dir: ConfigDir, settings: Settings, data_dir: PathBuf) -> Result<Self> {
        settings.validate()?;
        let store = FileArchiveStore::open(&data_dir)?;
        let contents = FileContentStore::new(&data_dir)?;
        debug!(
            "Session: config {}, data {}",
            config_dir.root().display(),
            data_dir.display()
        );

        Ok(Self {
            config_dir,
            settings,
            data_dir,
            store,
            contents,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_dir(&self) -> &ConfigDir {
        &self.config_dir
    }

    pub fn store(&self) -> &FileArchiveStore {
        &self.store
    }

    pub fn contents(&self) -> &FileContentStore {
        &self.contents
    }

    /// Authenticated Gmail client; fails with a setup error if credentials
    /// are missing or sign-in does not complete
    pub fn gmail_client(&self) -> Result<GmailClient> {
        let credentials = GmailCredentials::load(&self.config_dir)?;
        let auth = GmailAuth::new(credentials, self.config_dir.path(TOKEN_FILE));
        let client = GmailClient::new(auth, self.settings.page_size);
        client.authenticate()?;
        Ok(client)
    }

    /// Rate-limited HTTP fetcher for the target site
    pub fn page_fetcher(&self) -> HttpFetcher {
        HttpFetcher::new(
            self.settings.user_agent.clone(),
            Duration::from_millis(self.settings.request_interval_ms),
            Duration::from_secs(self.settings.request_timeout_secs),
        )
    }

    pub fn extractor(&self) -> Result<ContentExtractor> {
        ContentExtractor::from_settings(&self.settings)
    }

    pub fn link_pattern(&self) -> LinkPattern {
        LinkPattern::new(&self.settings.link_pattern)
    }

    pub fn fetch_emails(&self) -> Result<FetchStats> {
        let client = self.gmail_client()?;
        jobs::fetch_emails(&client, &self.store, &self.settings.mail_query())
    }

    pub fn extract_links(&self) -> Result<ExtractStats> {
        jobs::extract_links(&self.store, &self.link_pattern())
    }

    pub fn fetch_contents(&self) -> Result<ContentStats> {
        let extractor = self.extractor()?;
        info!(
            "Fetching content ({:?} source) into {}",
            self.settings.content_source,
            self.data_dir.display()
        );
        jobs::fetch_contents(&self.page_fetcher(), &self.store, &self.contents, &extractor)
    }

    pub fn check(&self) -> Result<CheckReport> {
        repair::check(&self.store, &self.contents)
    }

    pub fn add_links<S: AsRef<str>>(&self, urls: &[S]) -> Result<AddLinksOutcome> {
        repair::add_links(&self.store, urls)
    }

    pub fn reindex(&self) -> Result<usize> {
        repair::reindex(&self.store, &self.contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArchiveStore;
    use tempfile::tempdir;

    #[test]
    fn test_open_uses_settings_data_dir() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("config");
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("settings.json"),
            format!(r#"{{"data_dir": {:?}}}"#, data_dir.to_str().unwrap()),
        )
        .unwrap();

        let session = Session::open(Some(config_dir), None).unwrap();
        assert_eq!(session.data_dir(), data_dir.as_path());
        assert!(data_dir.join("solutions").is_dir());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("elsewhere");
        let session = Session::open(Some(dir.path().join("config")), Some(data_dir.clone())).unwrap();
        assert_eq!(session.data_dir(), data_dir.as_path());
    }

    #[test]
    fn test_offline_commands_on_fresh_session() {
        let dir = tempdir().unwrap();
        let session =
            Session::open(Some(dir.path().join("config")), Some(dir.path().join("data"))).unwrap();

        let outcome = session
            .add_links(&["https://www.dailycodingproblem.com/solution/12?token=a"])
            .unwrap();
        assert_eq!(outcome.added.len(), 1);
        assert_eq!(session.store().list_links().unwrap().len(), 1);

        let stats = session.extract_links().unwrap();
        assert_eq!(stats.emails_scanned, 0);

        let report = session.check().unwrap();
        assert_eq!(report.orphans.len(), 1);
        assert_eq!(session.reindex().unwrap(), 0);
    }
}
