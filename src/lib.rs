//! # veille - competitive-intelligence crawling for French company websites
//!
//! Given a company, a few seed URLs and a list of keywords, this crate crawls
//! each site within its own domain, extracts readable text, keeps French
//! sentences that mention a keyword, and removes near-duplicate passages
//! (repeated headers, footers, cookie banners) before handing back an ordered
//! passage list.
//!
//! ## Features
//!
//! - Breadth-first, same-host crawling with a hard page budget per seed
//! - Rendered-page fetching through headless Chrome, or plain HTTP
//! - Chrome-free text extraction (scripts, navigation, forms and media removed)
//! - Accent- and case-insensitive keyword gate plus French language detection
//! - Three-rule near-duplicate detection, first-seen-wins
//! - Cancellation and optional wall-clock budgets
//! - Async API with Tokio, structured logging with `tracing`
//!
//! ## Modules
//!
//! - [`crawler`]: URL canonicalization, fetchers, text extraction, site traversal
//! - [`processor`]: segmentation, relevance filtering, deduplication
//! - [`pipeline`]: request validation, multi-seed orchestration, report

mod error;

pub mod crawler;
pub mod pipeline;
pub mod processor;

pub use error::{Error, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::crawler::{BrowserFetcher, CrawlerConfig, HttpFetcher, PageFetcher};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::pipeline::{CrawlRequest, IntelReport, Pipeline, PipelineConfig};
    pub use crate::processor::{Passage, ProcessorConfig};
}
