//! Error types for ai4anki
//!
//! This module provides the error handling for the deck pipeline:
//! - The crate-wide [`Error`] enum for request-fatal failures
//! - [`ValidationError`] for client-caused rejections (HTTP 400)
//! - [`MediaError`] for per-sentence audio failures, which are logged and skipped
//! - HTTP status code mapping and the JSON error body used by the API

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for ai4anki operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ai4anki
///
/// Everything except [`Error::Validation`] aborts the request with a 500.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "AI4ANKI_BIND")
        key: Option<String>,
    },

    /// The request was rejected before or during assembly
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Package assembly failed
    #[error("package error: {0}")]
    Package(#[from] PackageError),

    /// SQLx database error while writing the collection
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Zip archive error while writing the package
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Client-caused request rejections
///
/// The display text of each variant is the message returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Body is not JSON, not an object, or an empty object
    #[error("Invalid JSON payload.")]
    InvalidPayload,

    /// A required top-level field is missing, empty or not of the expected type
    #[error("Invalid or missing \"{0}\" field.")]
    InvalidField(&'static str),

    /// Every sentence was skipped during assembly
    #[error("No valid sentences to add to the deck.")]
    NoValidSentences,
}

/// Per-sentence audio failures
///
/// These never escalate to a request failure: the note is kept without audio.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The audio URL could not be parsed
    #[error("invalid audio URL {url}: {reason}")]
    InvalidUrl {
        /// The URL as received in the request
        url: String,
        /// Why parsing failed
        reason: String,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The URL that was requested
        url: String,
        /// The HTTP status code received
        status: u16,
    },

    /// Transport-level failure (connect, timeout, body read)
    #[error("failed to fetch {url}: {source}")]
    Transport {
        /// The URL that was requested
        url: String,
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },
}

/// Errors raised while assembling the package archive
#[derive(Debug, Error)]
pub enum PackageError {
    /// A note's field count does not match its note type
    #[error("note {guid} has {actual} fields, note type expects {expected}")]
    FieldCount {
        /// Guid of the offending note
        guid: String,
        /// Number of fields in the note type
        expected: usize,
        /// Number of fields in the note
        actual: usize,
    },

    /// A media file path has no usable file name
    #[error("media path {0} has no file name")]
    MediaName(std::path::PathBuf),

    /// The blocking archive writer task panicked or was cancelled
    #[error("archive writer task failed: {0}")]
    WriterTask(String),
}

/// API error response format
///
/// Validation failures carry only `error`; unexpected failures also carry
/// the underlying error text in `message`.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "An unexpected error occurred.",
///   "message": "database error: disk I/O error"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,

    /// Underlying error text, present for server-side failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    /// Message used for every unexpected failure
    pub const UNEXPECTED: &'static str = "An unexpected error occurred.";

    /// Create an API error with only a message
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    /// Create an "unexpected error" body carrying the underlying error text
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: Self::UNEXPECTED.to_string(),
            message: Some(message.into()),
        }
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Validation(_) => 400,

            // 500 Internal Server Error - Everything else
            Error::Config { .. }
            | Error::Package(_)
            | Error::Sqlx(_)
            | Error::Zip(_)
            | Error::Io(_)
            | Error::ApiServerError(_)
            | Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(e) => match e {
                ValidationError::InvalidPayload => "invalid_payload",
                ValidationError::InvalidField(_) => "invalid_field",
                ValidationError::NoValidSentences => "no_valid_sentences",
            },
            Error::Package(_) => "package_error",
            Error::Sqlx(_) => "database_error",
            Error::Zip(_) => "archive_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error {
            Error::Validation(e) => ApiError::new(e.to_string()),
            other => ApiError::internal(other.to_string()),
        }
    }
}
