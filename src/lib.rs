//! # ai4anki
//!
//! HTTP service that turns sentence pairs into Anki flashcard packages.
//!
//! A client posts a target language, an origin language and a list of
//! sentence pairs, each with an optional audio URL. The service fetches the
//! audio, builds one note per complete pair on a fixed two-sided note type,
//! writes an `.apkg` archive and streams it back as a download.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ai4anki::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::from_env()?);
//!
//!     ai4anki::api::start_api_server(config, ai4anki::shutdown_signal()).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Building a package without the HTTP layer:
//!
//! ```no_run
//! use ai4anki::config::{DeckConfig, MediaConfig};
//! use ai4anki::media::HttpMediaFetcher;
//! use ai4anki::{DeckBuilder, DeckRequest};
//!
//! # async fn example() -> ai4anki::Result<()> {
//! let request = DeckRequest::from_slice(
//!     br#"{"target_language": "es", "origin_language": "en",
//!          "sentences": [{"target_language": "Hola", "origin_language": "Hello"}]}"#,
//! )?;
//!
//! let fetcher = HttpMediaFetcher::new(&MediaConfig::default())?;
//! let deck = DeckBuilder::new(&DeckConfig::default(), &fetcher)
//!     .build(&request)
//!     .await?;
//!
//! println!("{} -> {}", deck.download_name(), deck.package_path().display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Anki collection and package authoring
pub mod anki;
/// REST API module
pub mod api;
/// Request pipeline from sentences to package
pub mod builder;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Audio fetching and storage
pub mod media;
/// Request types and validation
pub mod types;

// Re-export commonly used types
pub use builder::{BuiltDeck, DeckBuilder};
pub use config::Config;
pub use error::{ApiError, Error, MediaError, PackageError, Result, ToHttpStatus, ValidationError};
pub use types::{DeckRequest, SentenceInput};

/// Resolves when the process receives a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Pass it to [`api::start_api_server`] for graceful shutdown.
pub async fn shutdown_signal() {
    wait_for_signal().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            wait_for_ctrl_c().await;
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    tracing::info!("Received SIGTERM signal");
                }
                Err(_) => wait_for_ctrl_c().await,
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
