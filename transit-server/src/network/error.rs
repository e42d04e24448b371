//! Network source error types.

use std::path::PathBuf;

/// Errors that can occur when fetching the stop network.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check TRANSIT_API_KEY")]
    Unauthorized,

    /// Repository returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a JSON payload
    #[error("JSON parse error in {what}: {message}")]
    Json { what: String, message: String },

    /// Failed to read a snapshot file
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record is well-formed JSON but not a usable stop, edge or route
    #[error("invalid {kind} record: {message}")]
    InvalidRecord {
        kind: &'static str,
        message: String,
    },

    /// Source misconfigured
    #[error("invalid source configuration: {0}")]
    Config(String),
}
