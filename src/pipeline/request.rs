//! Crawl requests and their validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Error as CrateError;

/// Hard cap on seed URLs per request
pub const MAX_SEED_URLS: usize = 5;

/// Why a crawl request was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("company name is empty")]
    EmptyCompany,

    #[error("no seed URL given")]
    NoUrls,

    #[error("{count} seed URLs given, at most {max} allowed")]
    TooManyUrls { count: usize, max: usize },

    #[error("no keyword given")]
    NoKeywords,
}

impl From<ValidationError> for CrateError {
    fn from(err: ValidationError) -> Self {
        CrateError::Validation(err.to_string())
    }
}

/// What to crawl and what to look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Label for the report; not interpreted
    pub company: String,

    /// Seed URLs, one traversal each, in order
    pub urls: Vec<String>,

    /// Keywords a passage must mention
    pub keywords: Vec<String>,
}

impl CrawlRequest {
    /// Build a request from already-split URLs and keywords
    pub fn new<U, K>(company: impl Into<String>, urls: U, keywords: K) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            company: company.into(),
            urls: urls.into_iter().map(Into::into).collect(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a request from free-text form input
    ///
    /// URLs are one per line and keywords comma-separated; entries are
    /// trimmed and blanks dropped. A URL without a scheme gets `http://`.
    pub fn from_raw(company: &str, urls_text: &str, keywords_text: &str) -> Self {
        let urls = urls_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(with_scheme);
        let keywords = keywords_text
            .split(',')
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty());

        Self::new(company.trim(), urls, keywords)
    }

    /// Non-blank seed URLs, trimmed, in order
    pub fn seeds(&self) -> impl Iterator<Item = &str> + '_ {
        self.urls.iter().map(|url| url.trim()).filter(|url| !url.is_empty())
    }

    /// Check the request invariants before any network activity
    ///
    /// `max_urls` can only lower the limit; [`MAX_SEED_URLS`] always applies.
    pub fn validate(&self, max_urls: usize) -> Result<(), ValidationError> {
        if self.company.trim().is_empty() {
            return Err(ValidationError::EmptyCompany);
        }
        let count = self.seeds().count();
        if count == 0 {
            return Err(ValidationError::NoUrls);
        }
        let max = max_urls.min(MAX_SEED_URLS);
        if count > max {
            return Err(ValidationError::TooManyUrls { count, max });
        }
        if self.keywords.iter().all(|keyword| keyword.trim().is_empty()) {
            return Err(ValidationError::NoKeywords);
        }
        Ok(())
    }
}

fn with_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url.trim_start_matches('/'))
    }
}
