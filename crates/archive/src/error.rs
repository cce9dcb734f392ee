//! Typed errors for the cases callers branch on
//!
//! Everything else travels as `anyhow::Error` with context attached.

use std::path::PathBuf;

/// Missing or unusable credentials. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(
        "Gmail credentials not found. Place Google OAuth client secrets at {} \
         or set GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET",
        .expected_path.display()
    )]
    MissingCredentials { expected_path: PathBuf },

    #[error("Gmail rejected the access token (HTTP {status}); delete {} and re-run to sign in again", .token_path.display())]
    Unauthorized { status: u16, token_path: PathBuf },

    #[error("OAuth error: {0}")]
    OAuth(String),
}

/// Why a single link could not be turned into a content file.
///
/// These are reported per item; the batch keeps going.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{block} block not found at {url}")]
    MissingBlock { url: String, block: &'static str },

    #[error("invalid JSON from {url}: {message}")]
    InvalidJson { url: String, message: String },

    #[error("link has no token parameter: {0}")]
    LinkWithoutToken(String),

    #[error("link has no problem number: {0}")]
    NoProblemId(String),
}

impl FetchError {
    /// HTTP status code, if the failure was an error response
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A URL-shaped candidate that is not a usable solution link
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("not an absolute URL: {0}")]
    NotAbsolute(String),

    #[error("unsupported scheme in {0}")]
    Scheme(String),

    #[error("no problem number in path: {0}")]
    NoProblemId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_names_path() {
        let err = SetupError::MissingCredentials {
            expected_path: PathBuf::from("/home/u/.config/dcp-archive/google-credentials.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("google-credentials.json"));
        assert!(msg.contains("GMAIL_CLIENT_ID"));
    }

    #[test]
    fn test_fetch_error_status() {
        let err = FetchError::Status {
            url: "https://example.com".to_string(),
            status: 404,
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404 from https://example.com");
        assert_eq!(FetchError::LinkWithoutToken("x".into()).status(), None);
    }
}
