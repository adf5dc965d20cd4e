//! Configuration types for ai4anki
//!
//! The whole configuration is immutable once the server starts. It is built
//! from defaults, optionally overlaid with environment variables by
//! [`Config::from_env`], and handed to the router as an `Arc<Config>`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};

/// Main configuration for the deck service
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Deck and note type identity
    #[serde(default)]
    pub deck: DeckConfig,

    /// Audio fetching
    #[serde(default)]
    pub media: MediaConfig,

    /// Log output
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Build a [`Config`] from environment variables, falling back to defaults.
    ///
    /// Recognised variables:
    /// - `AI4ANKI_BIND`: listen address (default `0.0.0.0:8579`)
    /// - `AI4ANKI_FETCH_TIMEOUT_SECS`: audio download timeout (default 10)
    /// - `AI4ANKI_LOG`: tracing filter (default `info`)
    /// - `AI4ANKI_LOG_JSON`: `1`/`true` for JSON log lines
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(bind) = lookup("AI4ANKI_BIND") {
            config.api.bind_address = bind.parse().map_err(|e| Error::Config {
                message: format!("invalid bind address '{}': {}", bind, e),
                key: Some("AI4ANKI_BIND".to_string()),
            })?;
        }

        if let Some(secs) = lookup("AI4ANKI_FETCH_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| Error::Config {
                message: format!("invalid fetch timeout '{}': {}", secs, e),
                key: Some("AI4ANKI_FETCH_TIMEOUT_SECS".to_string()),
            })?;
            config.media.fetch_timeout = Duration::from_secs(secs);
        }

        if let Some(filter) = lookup("AI4ANKI_LOG") {
            config.log.filter = filter;
        }

        if let Some(json) = lookup("AI4ANKI_LOG_JSON") {
            config.log.json = json == "1" || json.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:8579)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Deck naming and note type identity
///
/// The model id must stay the same across runs so that review software
/// recognises re-imported notes as the same note type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Prefix of every deck name, joined to the target language with '-'
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Note type (model) id written into every package
    #[serde(default = "default_model_id")]
    pub model_id: i64,

    /// Note type (model) name
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            model_id: default_model_id(),
            model_name: default_model_name(),
        }
    }
}

impl DeckConfig {
    /// Deck name for a given target language, e.g. `AI4ANKI-es`
    pub fn deck_name(&self, target_language: &str) -> String {
        format!("{}-{}", self.name_prefix, target_language)
    }
}

/// Audio download configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Per-download timeout in seconds (default: 10)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub fetch_timeout: Duration,

    /// User-Agent header sent with audio requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Log output configuration, consumed by the binary
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit log records as newline-delimited JSON
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8579))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_name_prefix() -> String {
    "AI4ANKI".to_string()
}

fn default_model_id() -> i64 {
    1607392319
}

fn default_model_name() -> String {
    "AI4ANKI".to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    concat!("ai4anki/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
