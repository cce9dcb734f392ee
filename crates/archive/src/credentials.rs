//! OAuth client credentials for Gmail access
//!
//! Looked up in order:
//! 1. `google-credentials.json` in the config directory (Google Cloud Console format)
//! 2. `GMAIL_CLIENT_ID` / `GMAIL_CLIENT_SECRET` environment variables

use anyhow::{Context, Result};
use config::ConfigDir;
use serde::Deserialize;

use crate::error::SetupError;

/// Credentials filename in the config directory
pub const CREDENTIALS_FILE: &str = "google-credentials.json";

const CLIENT_ID_ENV: &str = "GMAIL_CLIENT_ID";
const CLIENT_SECRET_ENV: &str = "GMAIL_CLIENT_SECRET";

/// OAuth client id and secret
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl GmailCredentials {
    /// Load credentials from the config directory, then the environment.
    ///
    /// Fails with [`SetupError::MissingCredentials`] when neither is present.
    pub fn load(config_dir: &ConfigDir) -> Result<Self> {
        Self::load_with(config_dir, |name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load), reading variables through `lookup`
    pub fn load_with(
        config_dir: &ConfigDir,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if config_dir.exists(CREDENTIALS_FILE) {
            let creds: GoogleCredentialFile = config_dir.load_json(CREDENTIALS_FILE)?;
            return Self::from_credential_file(creds);
        }

        Self::from_lookup(lookup).ok_or_else(|| {
            anyhow::Error::from(SetupError::MissingCredentials {
                expected_path: config_dir.path(CREDENTIALS_FILE),
            })
        })
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Desktop clients use "installed", web clients use "web"
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }

    /// Parse credentials from JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    /// Credentials from `GMAIL_CLIENT_ID`/`GMAIL_CLIENT_SECRET`, if both are
    /// set and non-empty
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let client_id = lookup(CLIENT_ID_ENV)?;
        let client_secret = lookup(CLIENT_SECRET_ENV)?;
        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id,
            client_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_installed_credentials() {
        let json = r#"{
            "installed": {
                "client_id": "dcp-client.apps.googleusercontent.com",
                "client_secret": "dcp-secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;

        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "dcp-client.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "dcp-secret");
    }

    #[test]
    fn test_parse_web_credentials() {
        let json = r#"{ "web": { "client_id": "web-id", "client_secret": "web-secret" } }"#;
        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id");
    }

    #[test]
    fn test_missing_section() {
        assert!(GmailCredentials::from_json(r#"{ "other": {} }"#).is_err());
    }

    #[test]
    fn test_load_from_config_dir() {
        let tmp = tempdir().unwrap();
        let dir = ConfigDir::at(tmp.path());
        std::fs::write(
            dir.path(CREDENTIALS_FILE),
            r#"{ "installed": { "client_id": "file-id", "client_secret": "file-secret" } }"#,
        )
        .unwrap();

        let creds = GmailCredentials::load(&dir).unwrap();
        assert_eq!(creds.client_id, "file-id");
    }

    #[test]
    fn test_load_from_variables() {
        let tmp = tempdir().unwrap();
        let dir = ConfigDir::at(tmp.path());
        let vars = |name: &str| match name {
            "GMAIL_CLIENT_ID" => Some("env-id".to_string()),
            "GMAIL_CLIENT_SECRET" => Some("env-secret".to_string()),
            _ => None,
        };

        let creds = GmailCredentials::load_with(&dir, vars).unwrap();
        assert_eq!(creds.client_id, "env-id");
        assert_eq!(creds.client_secret, "env-secret");
    }

    #[test]
    fn test_missing_credentials_is_setup_error() {
        let tmp = tempdir().unwrap();
        let dir = ConfigDir::at(tmp.path());

        let err = GmailCredentials::load_with(&dir, |_| None).unwrap_err();
        match err.downcast_ref::<SetupError>() {
            Some(SetupError::MissingCredentials { expected_path }) => {
                assert_eq!(expected_path, &dir.path(CREDENTIALS_FILE));
            }
            other => panic!("expected MissingCredentials, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_variable_counts_as_missing() {
        let tmp = tempdir().unwrap();
        let dir = ConfigDir::at(tmp.path());
        let vars = |name: &str| {
            Some(if name == "GMAIL_CLIENT_ID" { String::new() } else { "secret".to_string() })
        };
        assert!(GmailCredentials::load_with(&dir, vars).is_err());
    }
}
