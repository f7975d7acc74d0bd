//! # Website Crawler Module
//!
//! Same-domain, breadth-first crawling of a company website and extraction of
//! its readable text. This is the first stage of the pipeline: it produces one
//! [`PageResult`] per fetched page, which the processor then splits into
//! passages.
//!
//! ## Key Components
//!
//! - [`canonicalize`]: stable identity of a URL for visited/frontier dedup
//! - [`PageFetcher`]: rendered-HTML source ([`BrowserFetcher`], [`HttpFetcher`])
//! - [`extract_text`]: visible text without page chrome
//! - [`SiteCrawler`] / [`crawl_website`]: the bounded traversal itself

mod canonical;
mod config;
mod content_extraction;
mod error;
mod fetcher;
mod site_crawler;

pub use canonical::{CanonicalUrl, canonicalize};
pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use content_extraction::{
    TagRole, TagRoleTable, collapse_whitespace, extract_links, extract_text, extract_text_with,
};
pub use error::{CrawlError, FetchError};
pub use fetcher::{BrowserFetcher, HttpFetcher, PageFetcher, REMOTE_DEBUGGING_URL_ENV};
pub use site_crawler::{CrawlProgress, Frontier, SiteCrawler, VisitedSet, crawl_website};

use serde::{Deserialize, Serialize};

/// Outcome of fetching one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageContent {
    /// Extracted plain text
    Fetched {
        /// Whitespace-collapsed visible text
        text: String,
    },
    /// The page could not be fetched
    Failed {
        /// Why the fetch failed
        reason: String,
    },
}

/// A page visited during a traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// URL of the page
    pub url: String,

    /// Extracted text or failure marker
    #[serde(flatten)]
    pub content: PageContent,
}

impl PageResult {
    /// A successfully fetched page
    pub fn fetched(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: PageContent::Fetched { text: text.into() },
        }
    }

    /// A page whose fetch failed
    pub fn failed(url: impl Into<String>, error: &FetchError) -> Self {
        Self {
            url: url.into(),
            content: PageContent::Failed {
                reason: error.to_string(),
            },
        }
    }

    /// The extracted text, if the fetch succeeded
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            PageContent::Fetched { text } => Some(text),
            PageContent::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.content, PageContent::Failed { .. })
    }
}

/// Result of one seed traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlOutcome {
    /// The seed URL the traversal started from
    pub seed: String,

    /// Visited pages in discovery order
    pub pages: Vec<PageResult>,

    /// Number of pages whose fetch failed
    pub failed: usize,

    /// The traversal stopped because it was cancelled
    pub cancelled: bool,

    /// The traversal stopped at its wall-clock budget
    pub deadline_hit: bool,
}

impl CrawlOutcome {
    /// Number of distinct pages visited, failures included
    pub fn visited(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_result_accessors() {
        let page = PageResult::fetched("https://example.fr", "Bonjour");
        assert_eq!(page.text(), Some("Bonjour"));
        assert!(!page.is_failed());

        let error = FetchError::Navigation {
            url: "https://example.fr/x".to_string(),
            reason: "HTTP 500".to_string(),
        };
        let page = PageResult::failed("https://example.fr/x", &error);
        assert_eq!(page.text(), None);
        assert!(page.is_failed());
    }

    #[test]
    fn test_page_result_serialization() {
        let page = PageResult::fetched("https://example.fr", "Bonjour");
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["url"], "https://example.fr");
        assert_eq!(json["status"], "fetched");
        assert_eq!(json["text"], "Bonjour");
    }
}
