//! # Crawler Configuration Module
//!
//! Configuration for a single-site traversal: the page budget, the per-page
//! navigation timeout and settle delay used by the fetchers, the browser
//! identity, plus optional page concurrency, a whole-seed wall-clock budget
//! and a readiness selector.

use std::time::Duration;

/// Default page budget per seed
pub const DEFAULT_MAX_PAGES: u32 = 20;

/// Navigation timeout applied to every page load
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Delay after navigation before the rendered document is read
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(7);

/// Desktop Chrome identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of distinct pages fetched per seed
    pub max_pages: u32,

    /// Navigation timeout for a single page
    pub navigation_timeout: Duration,

    /// Fixed wait after navigation so client-rendered content can populate
    pub settle_delay: Duration,

    /// User agent to use for requests
    pub user_agent: String,

    /// Number of pages fetched concurrently within one site (1 = sequential)
    pub concurrency: usize,

    /// Wall-clock budget for one seed traversal
    pub crawl_deadline: Option<Duration>,

    /// CSS selector whose presence marks the page as ready.
    /// Replaces the fixed settle delay, which still bounds the wait.
    pub wait_for_selector: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 1,
            crawl_deadline: None,
            wait_for_selector: None,
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum number of pages to crawl per seed
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the navigation timeout
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.config.navigation_timeout = timeout;
        self
    }

    /// Set the settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the number of concurrent fetches within one site
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency.max(1);
        self
    }

    /// Set the wall-clock budget for one seed traversal
    pub fn crawl_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.config.crawl_deadline = deadline;
        self
    }

    /// Set the readiness selector
    pub fn wait_for_selector(mut self, selector: Option<String>) -> Self {
        self.config.wait_for_selector = selector;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::default();

        assert_eq!(config.max_pages, 20);
        assert_eq!(config.navigation_timeout, Duration::from_secs(15));
        assert_eq!(config.settle_delay, Duration::from_secs(7));
        assert_eq!(config.concurrency, 1);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.crawl_deadline.is_none());
    }

    #[test]
    fn test_builder_clamps_concurrency() {
        let config = CrawlerConfig::builder()
            .max_pages(5)
            .concurrency(0)
            .settle_delay(Duration::ZERO)
            .build();

        assert_eq!(config.max_pages, 5);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.settle_delay, Duration::ZERO);
    }
}
