//! Error types for the data-refresh pipeline.
//!
//! Fetch failures are absorbed at per-region / per-asset granularity by the
//! aggregator: they are logged and degrade the affected item to "absent",
//! never aborting sibling work.

use std::path::PathBuf;

use thiserror::Error;

/// A metadata or icon retrieval that did not produce usable bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed payload from {url}")]
    Malformed {
        url: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to write asset {path}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while decoding the clan-battle metadata payload.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("payload is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("payload contains no clan battle entries")]
    Empty,

    #[error("payload contains no phases")]
    NoPhases,

    #[error("timestamp {value:?} is not RFC 3339")]
    Timestamp { value: String },
}
