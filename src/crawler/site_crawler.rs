//! Breadth-first, same-domain site traversal
//!
//! One traversal owns exactly one [`Frontier`] and one [`VisitedSet`]; both
//! are created from the seed and dropped when the traversal returns. A URL is
//! marked visited at dispatch time, before its fetch starts, so no canonical
//! URL is fetched twice even when several fetches are in flight, and the page
//! budget is never exceeded.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashSet, VecDeque};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, info, instrument, warn};
use url::Url;

use crate::crawler::canonical::CanonicalUrl;
use crate::crawler::content_extraction::{extract_links, extract_text};
use crate::crawler::error::{CrawlError, FetchError};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::{CrawlOutcome, CrawlerConfig, PageResult};

/// Progress notifications emitted during a traversal
#[derive(Debug, Clone)]
pub enum CrawlProgress {
    /// A page was fetched and its text extracted
    PageFetched {
        /// The seed the traversal started from
        seed: String,
        /// The page URL
        url: String,
    },
    /// A page failed and was skipped
    PageFailed {
        /// The seed the traversal started from
        seed: String,
        /// The page URL
        url: String,
    },
}

/// Ordered queue of URLs waiting to be fetched
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<(Url, CanonicalUrl)>,
    queued: HashSet<CanonicalUrl>,
}

impl Frontier {
    /// Frontier holding only the seed
    pub fn seeded(seed: Url) -> Self {
        let mut frontier = Self::default();
        let canonical = CanonicalUrl::from(&seed);
        frontier.queued.insert(canonical.clone());
        frontier.queue.push_back((seed, canonical));
        frontier
    }

    /// Append a URL unless it is already visited or queued
    pub fn push(&mut self, url: Url, visited: &VisitedSet) -> bool {
        let canonical = CanonicalUrl::from(&url);
        if visited.contains(&canonical) || self.queued.contains(&canonical) {
            return false;
        }
        self.queued.insert(canonical.clone());
        self.queue.push_back((url, canonical));
        true
    }

    /// Take the head of the queue
    pub fn pop(&mut self) -> Option<(Url, CanonicalUrl)> {
        let (url, canonical) = self.queue.pop_front()?;
        self.queued.remove(&canonical);
        Some((url, canonical))
    }

    /// URLs waiting to be dispatched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// No URL is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Canonical URLs already dispatched in the current traversal
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<CanonicalUrl>,
}

impl VisitedSet {
    /// Mark a URL visited; returns `false` when it already was
    pub fn mark(&mut self, canonical: CanonicalUrl) -> bool {
        self.seen.insert(canonical)
    }

    /// Whether the URL was already dispatched
    pub fn contains(&self, canonical: &CanonicalUrl) -> bool {
        self.seen.contains(canonical)
    }

    /// Number of URLs dispatched so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Nothing dispatched yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Crawls one site at a time with a given fetcher
pub struct SiteCrawler<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    config: &'a CrawlerConfig,
    cancel: CancellationToken,
    progress: Option<mpsc::Sender<CrawlProgress>>,
}

impl<'a, F: PageFetcher + ?Sized> SiteCrawler<'a, F> {
    /// Create a crawler using the given fetcher and configuration
    pub fn new(fetcher: &'a F, config: &'a CrawlerConfig) -> Self {
        Self {
            fetcher,
            config,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Stop the traversal when this token is cancelled
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report per-page progress on this channel
    pub fn with_progress(mut self, progress: mpsc::Sender<CrawlProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Traverse the site rooted at `seed`
    ///
    /// Returns the pages in discovery order. Per-page failures are recorded
    /// as failed [`PageResult`]s; only an unusable seed or fetcher fails the
    /// whole traversal.
    #[instrument(skip(self), fields(max_pages = self.config.max_pages))]
    pub async fn crawl(&self, seed: &str) -> Result<CrawlOutcome, CrawlError> {
        let seed_url = Url::parse(seed.trim()).map_err(|source| CrawlError::InvalidSeed {
            url: seed.to_string(),
            source,
        })?;
        let host = seed_url
            .host_str()
            .ok_or_else(|| CrawlError::MissingHost(seed.to_string()))?
            .to_string();

        info!("Starting crawl for {}", seed_url);

        let max_pages = self.config.max_pages as usize;
        let concurrency = self.config.concurrency.max(1);
        let deadline = self.config.crawl_deadline.map(|budget| Instant::now() + budget);

        let mut frontier = Frontier::seeded(seed_url.clone());
        let mut visited = VisitedSet::default();
        let mut in_flight = FuturesUnordered::new();
        let mut pages: Vec<(usize, PageResult)> = Vec::new();
        let mut cancelled = false;
        let mut deadline_hit = false;

        let deadline_sleep = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => futures::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline_sleep);

        loop {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            while in_flight.len() < concurrency && visited.len() < max_pages {
                let Some((url, canonical)) = frontier.pop() else {
                    break;
                };
                if !visited.mark(canonical) {
                    continue;
                }
                let sequence = visited.len() - 1;
                let span = debug_span!("process_page", url = %url);
                let fetcher = self.fetcher;
                in_flight.push(
                    async move {
                        let result = fetcher.fetch(&url).await;
                        (sequence, url, result)
                    }
                    .instrument(span),
                );
            }

            if in_flight.is_empty() {
                break;
            }

            let (sequence, url, result) = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                _ = &mut deadline_sleep => {
                    deadline_hit = true;
                    break;
                }
                Some(done) = in_flight.next() => done,
            };

            match result {
                Ok(html) => {
                    let text = extract_text(&html);
                    debug!("Extracted {} characters from {}", text.len(), url);

                    let mut discovered = 0;
                    for link in extract_links(&html, &url) {
                        if link.host_str() == Some(host.as_str()) && frontier.push(link, &visited) {
                            discovered += 1;
                        }
                    }
                    debug!("Queued {} new links from {}", discovered, url);

                    self.report(CrawlProgress::PageFetched {
                        seed: seed_url.to_string(),
                        url: url.to_string(),
                    })
                    .await;
                    pages.push((sequence, PageResult::fetched(url.as_str(), text)));
                }
                Err(FetchError::Unavailable(reason)) => {
                    return Err(CrawlError::Fetcher(FetchError::Unavailable(reason)));
                }
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    self.report(CrawlProgress::PageFailed {
                        seed: seed_url.to_string(),
                        url: url.to_string(),
                    })
                    .await;
                    pages.push((sequence, PageResult::failed(url.as_str(), &e)));
                }
            }
        }

        if cancelled {
            info!("Crawl of {} cancelled", seed_url);
        } else if deadline_hit {
            warn!("Crawl of {} stopped at its time budget", seed_url);
        }

        pages.sort_by_key(|(sequence, _)| *sequence);
        let pages: Vec<PageResult> = pages.into_iter().map(|(_, page)| page).collect();
        let failed = pages.iter().filter(|page| page.is_failed()).count();

        info!(
            "Crawl finished for {}: {} pages ({} failed)",
            seed_url,
            pages.len(),
            failed
        );

        Ok(CrawlOutcome {
            seed: seed_url.to_string(),
            pages,
            failed,
            cancelled,
            deadline_hit,
        })
    }

    async fn report(&self, event: CrawlProgress) {
        if let Some(progress) = &self.progress {
            let _ = progress.send(event).await;
        }
    }
}

/// Crawl a website with the given fetcher and configuration
///
/// # Arguments
///
/// * `url` - The seed URL
/// * `fetcher` - Source of page HTML
/// * `config` - The crawler configuration
///
/// # Returns
///
/// The traversal outcome, pages in discovery order
pub async fn crawl_website<F: PageFetcher + ?Sized>(
    url: &str,
    fetcher: &F,
    config: &CrawlerConfig,
) -> Result<CrawlOutcome, CrawlError> {
    SiteCrawler::new(fetcher, config).crawl(url).await
}
