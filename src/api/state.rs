//! Application state for the API server

use crate::Config;
use crate::media::MediaFetcher;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the configuration and the audio fetcher.
#[derive(Clone)]
pub struct AppState {
    /// Configuration (read-only after startup)
    pub config: Arc<Config>,

    /// Fetcher used for every `audio_url` in a request
    pub fetcher: Arc<dyn MediaFetcher>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Arc<Config>, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { config, fetcher }
    }
}
