//! Error types for the veille crate

use thiserror::Error;

/// Result type for veille operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for veille operations
#[derive(Debug, Error)]
pub enum Error {
    /// The crawl request was rejected before any network activity
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Site traversal error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Headless browser error
    #[error("Browser error: {0}")]
    Browser(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed passage file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Passage file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,
}
