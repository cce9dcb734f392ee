//! Plain HTTP page fetching for solution pages

use std::cell::Cell;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::FetchError;

/// Something that can GET a URL and return its body as text
pub trait PageFetcher {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Sequential ureq-based fetcher with a minimum gap between requests
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
    interval: Duration,
    last_request: Cell<Option<Instant>>,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();

        Self {
            agent: config.into(),
            user_agent: user_agent.into(),
            interval,
            last_request: Cell::new(None),
        }
    }

    /// Sleep until `interval` has passed since the previous request
    fn wait_turn(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

impl PageFetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        self.wait_turn();
        debug!("GET {}", url);

        let response = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .call();

        match response {
            Ok(mut resp) => resp
                .body_mut()
                .read_to_string()
                .map_err(|e| FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
            Err(ureq::Error::StatusCode(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            Err(e) => Err(FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
