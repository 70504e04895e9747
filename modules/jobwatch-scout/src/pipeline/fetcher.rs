use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use jobwatch_common::{JobWatchError, Result};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const USER_AGENT: &str = "UKJuniorDoctorBot/1.0 (automated job watcher)";

/// Retrieves raw feed documents. One attempt per call, no retries.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Plain reqwest fetcher. Feeds are static XML, no rendering needed.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| JobWatchError::Config(format!("Failed to build feed HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(JobWatchError::Transport {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        // Raw bytes, not text(): the sanitizer decides how to handle the encoding.
        let bytes = resp.bytes().await.map_err(|e| transport_error(url, e))?;
        debug!(url, bytes = bytes.len(), "Fetched feed");
        Ok(bytes.to_vec())
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> JobWatchError {
    if e.is_timeout() {
        JobWatchError::TransportTimeout {
            url: url.to_string(),
        }
    } else {
        JobWatchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
