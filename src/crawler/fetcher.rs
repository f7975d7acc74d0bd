//! Page fetchers
//!
//! A [`PageFetcher`] turns a URL into the HTML the crawler extracts text and
//! links from. Two back-ends are provided:
//!
//! - [`BrowserFetcher`] drives headless Chrome through chromiumoxide so
//!   client-rendered content is present: navigate under the navigation
//!   timeout, wait for the settle delay (or a readiness selector), then read
//!   the rendered document.
//! - [`HttpFetcher`] issues a plain GET with reqwest, for static sites.

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use reqwest::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::crawler::CrawlerConfig;
use crate::crawler::error::{CrawlError, FetchError};

/// Environment variable naming a running Chrome to attach to instead of launching one
pub const REMOTE_DEBUGGING_URL_ENV: &str = "CHROMIUM_REMOTE_DEBUGGING_URL";

/// Interval between readiness-selector probes
const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Source of page HTML for the crawler
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the final HTML of the page at `url`
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

/// Fetcher backed by a headless Chrome instance
///
/// The browser is launched on first use and shared by every page fetched
/// through this fetcher.
pub struct BrowserFetcher {
    browser: OnceCell<Browser>,
    remote_url: Option<String>,
    navigation_timeout: Duration,
    settle_delay: Duration,
    user_agent: String,
    wait_for_selector: Option<String>,
}

impl BrowserFetcher {
    /// Create a browser fetcher from the crawler configuration.
    ///
    /// Honors [`REMOTE_DEBUGGING_URL_ENV`] when set.
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            browser: OnceCell::new(),
            remote_url: std::env::var(REMOTE_DEBUGGING_URL_ENV).ok(),
            navigation_timeout: config.navigation_timeout,
            settle_delay: config.settle_delay,
            user_agent: config.user_agent.clone(),
            wait_for_selector: config.wait_for_selector.clone(),
        }
    }

    /// Attach to an already running Chrome instead of launching one
    pub fn with_remote_url(mut self, remote_url: impl Into<String>) -> Self {
        self.remote_url = Some(remote_url.into());
        self
    }

    async fn browser(&self) -> Result<&Browser, FetchError> {
        self.browser
            .get_or_try_init(|| async {
                let (browser, mut handler) = match &self.remote_url {
                    Some(remote_url) => {
                        info!("Connecting to remote Chrome instance at {}", remote_url);
                        Browser::connect(remote_url.as_str())
                            .await
                            .map_err(|e| FetchError::Unavailable(e.to_string()))?
                    }
                    None => {
                        let config = BrowserConfig::builder()
                            .no_sandbox()
                            .request_timeout(self.navigation_timeout)
                            .arg("--disable-gpu")
                            .arg("--disable-dev-shm-usage")
                            .build()
                            .map_err(FetchError::Unavailable)?;
                        info!("Launching headless Chrome");
                        Browser::launch(config)
                            .await
                            .map_err(|e| FetchError::Unavailable(e.to_string()))?
                    }
                };

                tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if event.is_err() {
                            break;
                        }
                    }
                });

                Ok(browser)
            })
            .await
    }

    async fn wait_until_settled(&self, page: &Page) {
        let Some(selector) = self.wait_for_selector.as_deref() else {
            sleep(self.settle_delay).await;
            return;
        };

        let deadline = Instant::now() + self.settle_delay;
        while Instant::now() < deadline {
            if page.find_element(selector).await.is_ok() {
                debug!("Readiness selector {} present", selector);
                return;
            }
            sleep(READINESS_POLL_INTERVAL).await;
        }
        debug!("Readiness selector {} not found before settle delay", selector);
    }

    async fn render(&self, page: &Page, url: &Url) -> Result<String, FetchError> {
        page.set_user_agent(self.user_agent.as_str())
            .await
            .map_err(|e| FetchError::navigation(url, e))?;

        tokio::time::timeout(self.navigation_timeout, page.goto(url.as_str()))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                after: self.navigation_timeout,
            })?
            .map_err(|e| FetchError::navigation(url, e))?;

        self.wait_until_settled(page).await;

        page.content()
            .await
            .map_err(|e| FetchError::navigation(url, e))
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let browser = self.browser().await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::navigation(url, e))?;

        let result = self.render(&page, url).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", url, e);
        }
        result
    }
}

/// Fetcher issuing plain HTTP GET requests
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create an HTTP fetcher from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let client = ReqwestClient::builder()
            .timeout(config.navigation_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            timeout: config.navigation_timeout,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                }
            } else {
                FetchError::navigation(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::navigation(url, format!("HTTP {}", status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_ascii_lowercase);
        if let Some(content_type) = content_type {
            if !content_type.contains("html") {
                return Err(FetchError::navigation(
                    url,
                    format!("unsupported content type {}", content_type),
                ));
            }
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                }
            } else {
                FetchError::navigation(url, e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> HttpFetcher {
        let config = CrawlerConfig::builder()
            .navigation_timeout(Duration::from_secs(5))
            .build();
        HttpFetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_http_fetch_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/accueil")
            .match_header("user-agent", mockito::Matcher::Regex("Mozilla".to_string()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<p>Bonjour</p>")
            .expect(1)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/accueil", server.url())).unwrap();
        let html = fetcher().fetch(&url).await.unwrap();

        assert_eq!(html, "<p>Bonjour</p>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_fetch_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/absent")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/absent", server.url())).unwrap();
        let result = fetcher().fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Navigation { .. })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_fetch_rejects_non_html() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/brochure.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/brochure.pdf", server.url())).unwrap();
        let result = fetcher().fetch(&url).await;

        match result {
            Err(FetchError::Navigation { reason, .. }) => {
                assert!(reason.contains("application/pdf"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
