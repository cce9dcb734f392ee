//! Run settings loaded from `settings.json` in the config directory
//!
//! Every field has a default, so a missing file means "use the defaults".

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings filename in the config directory
pub const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_SUBJECT: &str = "Daily Coding Problem";
pub const DEFAULT_LINK_PATTERN: &str = "dailycodingproblem.com/solution";
pub const DEFAULT_PROBLEM_SELECTOR: &str = ".problem";
pub const DEFAULT_SOLUTION_SELECTOR: &str = ".solution";

/// Where the content fetcher reads problem/solution text from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Scrape the solution page HTML
    #[default]
    Page,
    /// Call the site's JSON solution endpoint with the link's token
    Api,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
    /// Only messages from this sender
    pub sender: Option<String>,
    /// Subject keyword for the Gmail search
    pub subject: Option<String>,
    /// Only messages received after this date
    pub after: Option<NaiveDate>,
    /// Gmail list page size (1-500)
    pub page_size: usize,
    pub link_pattern: String,
    pub content_source: ContentSource,
    pub problem_selector: String,
    pub solution_selector: String,
    /// Minimum delay between content requests
    pub request_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            sender: None,
            subject: Some(DEFAULT_SUBJECT.to_string()),
            after: None,
            page_size: 250,
            link_pattern: DEFAULT_LINK_PATTERN.to_string(),
            content_source: ContentSource::Page,
            problem_selector: DEFAULT_PROBLEM_SELECTOR.to_string(),
            solution_selector: DEFAULT_SOLUTION_SELECTOR.to_string(),
            request_interval_ms: 1000,
            request_timeout_secs: 30,
            user_agent: concat!("dcp-archive/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Settings {
    /// Load `settings.json` from the config directory, falling back to defaults
    pub fn load(config_dir: &config::ConfigDir) -> Result<Self> {
        let settings = config_dir
            .load_json_opt::<Settings>(SETTINGS_FILE)?
            .unwrap_or_default();
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=500).contains(&self.page_size) {
            bail!("page_size must be between 1 and 500, got {}", self.page_size);
        }
        if self.link_pattern.trim().is_empty() {
            bail!("link_pattern must not be empty");
        }
        if self.sender.is_none() && self.subject.is_none() {
            bail!("at least one of sender or subject must be set");
        }
        Ok(())
    }

    /// Gmail search query for the newsletter
    pub fn mail_query(&self) -> String {
        let mut terms = Vec::new();
        if let Some(sender) = &self.sender {
            terms.push(format!("from:{}", sender.trim()));
        }
        if let Some(subject) = &self.subject {
            terms.push(format!("subject:({})", subject.trim()));
        }
        if let Some(after) = self.after {
            terms.push(format!("after:{}", after.format("%Y/%m/%d")));
        }
        terms.join(" ")
    }
}
