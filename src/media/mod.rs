//! Audio media: fetching remote files and storing them for packaging
//!
//! - [`MediaFetcher`]: the seam between the deck pipeline and the network
//! - [`HttpMediaFetcher`]: reqwest implementation with a fixed timeout
//! - [`MediaStore`]: request-scoped directory of fetched files

use crate::config::MediaConfig;
use crate::error::{Error, MediaError, Result};
use async_trait::async_trait;

mod store;

pub use store::{MediaStore, filename_from_url};

/// Source of audio bytes for a URL
///
/// Implementations make exactly one attempt per call; callers treat any
/// error as "no audio for this sentence".
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Retrieve the body at `url`
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, MediaError>;
}

/// Fetches audio over HTTP(S) with a per-request timeout
#[derive(Clone, Debug)]
pub struct HttpMediaFetcher {
    client: reqwest::Client,
}

impl HttpMediaFetcher {
    /// Build a fetcher from the media configuration
    pub fn new(config: &MediaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "Failed to create HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, MediaError> {
        let parsed = url::Url::parse(url).map_err(|e| MediaError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response =
            self.client
                .get(parsed)
                .send()
                .await
                .map_err(|e| MediaError::Transport {
                    url: url.to_string(),
                    source: e,
                })?;

        if !response.status().is_success() {
            return Err(MediaError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| MediaError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        Ok(body.to_vec())
    }
}
