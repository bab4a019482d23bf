use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve a document over the network
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection, TLS or body decoding failure
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The request did not complete within the configured budget
    #[error("request to {url} timed out")]
    Timeout { url: String },
}

/// The sitemap document could not be read as XML
#[derive(Debug, Error)]
pub enum SitemapParseError {
    #[error("malformed sitemap XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("sitemap document has no root element")]
    NoRoot,
}

/// Operator asked for a page count outside the available range
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("page count {requested} is outside the allowed range 1..={total}")]
    OutOfRange { requested: usize, total: usize },
}

/// Failure to persist one output format
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode XML: {0}")]
    Xml(String),
}

/// Top-level error for a scraping run
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid site URL {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
