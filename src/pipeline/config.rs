//! Configuration for a whole crawl-and-deduplicate run

use crate::crawler::CrawlerConfig;
use crate::pipeline::request::MAX_SEED_URLS;
use crate::processor::ProcessorConfig;

/// Crawler and processor settings plus seed-level options
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Per-seed traversal settings
    pub crawler: CrawlerConfig,

    /// Passage processing settings
    pub processor: ProcessorConfig,

    /// Most seed URLs accepted in one request, never above
    /// [`MAX_SEED_URLS`](crate::pipeline::MAX_SEED_URLS)
    pub max_seeds: usize,

    /// Crawl seeds concurrently instead of one after another
    pub parallel_seeds: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            processor: ProcessorConfig::default(),
            max_seeds: MAX_SEED_URLS,
            parallel_seeds: false,
        }
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Start from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-seed traversal settings
    pub fn crawler(mut self, crawler: CrawlerConfig) -> Self {
        self.config.crawler = crawler;
        self
    }

    /// Set the passage processing settings
    pub fn processor(mut self, processor: ProcessorConfig) -> Self {
        self.config.processor = processor;
        self
    }

    /// Set the seed cap; it can be lowered but never raised past the hard cap
    pub fn max_seeds(mut self, max_seeds: usize) -> Self {
        self.config.max_seeds = max_seeds.min(MAX_SEED_URLS);
        self
    }

    /// Crawl all seeds at once instead of in request order
    pub fn parallel_seeds(mut self, parallel: bool) -> Self {
        self.config.parallel_seeds = parallel;
        self
    }

    /// Finish building
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl PipelineConfig {
    /// Create a new builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}
