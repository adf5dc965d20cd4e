//! ai4anki server entry point.
//!
//! Reads configuration from the environment, sets up tracing and serves the
//! API until SIGINT or SIGTERM.

use ai4anki::Config;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ai4anki::Result<()> {
    let config = Config::from_env()?;

    // RUST_LOG wins over AI4ANKI_LOG
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match config.log.filter.parse::<EnvFilter>() {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "WARN: AI4ANKI_LOG='{}' is not a valid tracing filter ({}); falling back to 'info'",
                    config.log.filter, e
                );
                EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if config.log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.api.bind_address,
        fetch_timeout_secs = config.media.fetch_timeout.as_secs(),
        "ai4anki starting"
    );

    ai4anki::api::start_api_server(Arc::new(config), ai4anki::shutdown_signal()).await
}
