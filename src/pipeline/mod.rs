//! # Crawl-and-deduplicate pipeline
//!
//! Validates a [`CrawlRequest`], crawls each seed site independently, then
//! runs every page through the passage processor in seed order and page
//! discovery order. A seed whose traversal fails is reported as a
//! [`SeedWarning`] and the remaining seeds carry on.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use veille::crawler::BrowserFetcher;
//! use veille::pipeline::{CrawlRequest, Pipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> veille::Result<()> {
//!     let config = PipelineConfig::default();
//!     let fetcher = Arc::new(BrowserFetcher::new(&config.crawler));
//!     let pipeline = Pipeline::new(fetcher, config);
//!
//!     let request = CrawlRequest::from_raw("ACME", "https://acme.fr", "innovation, énergie");
//!     let report = pipeline.run(&request, CancellationToken::new()).await?;
//!
//!     for passage in report.top(30) {
//!         println!("{} ({})", passage.text, passage.url);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod report;
mod request;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use report::{DEFAULT_REPORT_LIMIT, IntelReport, PipelineStats, SeedWarning};
pub use request::{CrawlRequest, MAX_SEED_URLS, ValidationError};

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::crawler::{CrawlError, CrawlOutcome, CrawlProgress, PageFetcher, SiteCrawler};
use crate::error::{Error, Result};
use crate::processor::PassageProcessor;

/// Runs crawl requests against a page fetcher
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    config: PipelineConfig,
    progress: Option<mpsc::Sender<CrawlProgress>>,
}

impl Pipeline {
    /// Create a pipeline fetching pages through `fetcher`
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: PipelineConfig) -> Self {
        Self {
            fetcher,
            config,
            progress: None,
        }
    }

    /// Report per-page progress of every seed on this channel
    pub fn with_progress(mut self, progress: mpsc::Sender<CrawlProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Settings this pipeline runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Crawl every seed of the request and build the passage report
    ///
    /// Validation failures are returned before any page is fetched. When
    /// `cancel` fires mid-run, the pages fetched so far are still processed
    /// and the report is flagged incomplete.
    #[instrument(skip_all, fields(company = %request.company, seeds = request.urls.len()))]
    pub async fn run(&self, request: &CrawlRequest, cancel: CancellationToken) -> Result<IntelReport> {
        request.validate(self.config.max_seeds)?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let seeds: Vec<&str> = request.seeds().collect();

        let results = if self.config.parallel_seeds {
            join_all(seeds.iter().map(|seed| self.crawl_seed(seed, cancel.clone()))).await
        } else {
            let mut results = Vec::with_capacity(seeds.len());
            for seed in &seeds {
                if cancel.is_cancelled() {
                    break;
                }
                results.push(self.crawl_seed(seed, cancel.clone()).await);
            }
            results
        };

        let mut processor = PassageProcessor::new(request.keywords.as_slice(), self.config.processor.clone());
        let mut warnings = Vec::new();
        let mut stats = PipelineStats::default();
        let mut pages_visited = 0;
        let mut incomplete = cancel.is_cancelled();

        for (seed, result) in seeds.iter().zip(results) {
            match result {
                Ok(outcome) => {
                    stats.seeds_crawled += 1;
                    stats.pages_failed += outcome.failed;
                    pages_visited += outcome.visited();
                    incomplete |= outcome.cancelled || outcome.deadline_hit;
                    for page in &outcome.pages {
                        processor.offer_page(page);
                    }
                }
                Err(e) => {
                    warn!("Crawl of {} failed: {}", seed, e);
                    warnings.push(SeedWarning {
                        seed: seed.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let (passages, passage_stats) = processor.finish();
        stats.passages = passage_stats;

        info!(
            pages_visited,
            accepted = passages.len(),
            warnings = warnings.len(),
            "Pipeline finished for {}",
            request.company
        );

        Ok(IntelReport {
            company: request.company.clone(),
            keywords: request.keywords.clone(),
            generated_at: Utc::now(),
            pages_visited,
            passages,
            warnings,
            stats,
            incomplete,
        })
    }

    async fn crawl_seed(&self, seed: &str, cancel: CancellationToken) -> std::result::Result<CrawlOutcome, CrawlError> {
        let mut crawler =
            SiteCrawler::new(&*self.fetcher, &self.config.crawler).with_cancellation(cancel);
        if let Some(progress) = &self.progress {
            crawler = crawler.with_progress(progress.clone());
        }
        crawler.crawl(seed).await
    }
}
