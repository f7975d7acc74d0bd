//! Error types for the crawler module

use crate::error::Error as CrateError;
use std::time::Duration;
use thiserror::Error;

/// Failure to fetch a single page.
///
/// `Timeout` and `Navigation` are absorbed by the crawler: the page counts as
/// visited and the traversal moves on.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Navigation did not complete within the timeout
    #[error("timed out after {after:?} loading {url}")]
    Timeout {
        /// The page being loaded
        url: String,
        /// The timeout that elapsed
        after: Duration,
    },

    /// The page could not be loaded or is not an HTML document
    #[error("navigation to {url} failed: {reason}")]
    Navigation {
        /// The page being loaded
        url: String,
        /// What went wrong
        reason: String,
    },

    /// The fetcher itself cannot operate (e.g. the browser failed to start)
    #[error("fetcher unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    pub(crate) fn navigation(url: &url::Url, reason: impl ToString) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Error type for a whole site traversal
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The seed URL cannot be parsed
    #[error("invalid seed URL {url}: {source}")]
    InvalidSeed {
        /// The seed as given
        url: String,
        /// Parser error
        source: url::ParseError,
    },

    /// The seed URL has no host to scope the traversal to
    #[error("seed URL has no host: {0}")]
    MissingHost(String),

    /// The fetcher cannot operate, so no page of the site can be loaded
    #[error(transparent)]
    Fetcher(FetchError),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            CrawlError::Fetcher(FetchError::Unavailable(reason)) => CrateError::Browser(reason),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
