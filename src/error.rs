//! Error types for the news relay.
//!
//! Every failure a region run can hit maps to one variant here, so the
//! orchestrator can log a single structured error per failed region.

use std::path::PathBuf;

/// Error type for fetch, extraction, snapshot, and delivery operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure or non-success HTTP status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The listing page body was not valid UTF-8.
    #[error("page body is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// The listing page no longer has the expected markup.
    #[error("unexpected page structure: {0}")]
    Structure(String),

    /// A URL could not be parsed or resolved against its base.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The webhook configuration file is missing, malformed, or invalid.
    #[error("configuration error in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// A saved snapshot exists but does not hold a list of entries.
    #[error("malformed snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a local file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A webhook endpoint answered with a non-success status.
    #[error("webhook delivery to {endpoint} failed with {status}: {body}")]
    Delivery {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
