//! Passage processor
//!
//! Turns crawled page text into the final passage list: each page is split
//! into sentence-like passages, passages are kept only when they mention a
//! keyword and are in the target language, and near-duplicates of already
//! accepted passages are dropped.
//!
//! Pages must be offered in discovery order. Acceptance is first-seen-wins,
//! so the order in which pages arrive decides which copy of a repeated
//! passage survives.

mod config;
mod dedup;
mod normalize;
mod relevance;
mod segmenter;
mod similarity;

pub use config::{DedupThresholds, ProcessorConfig, ProcessorConfigBuilder};
pub use dedup::{Deduplicator, DuplicateRule, Verdict, deduplicate, near_duplicate_rule};
pub use normalize::{NormalizedPassage, fold, is_stop_word};
pub use relevance::{Relevance, RelevanceFilter};
pub use segmenter::segment;
pub use similarity::{is_contained, sequence_ratio, token_overlap};

use crate::crawler::PageResult;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// A passage of page text attributed to its source page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// The page the passage was extracted from
    pub url: String,

    /// The passage text, trimmed
    pub text: String,
}

impl Passage {
    /// Passage `text` found on `url`
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Counters for each stage of passage processing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    /// Candidate passages produced by the segmenter
    pub segmented: usize,

    /// Candidates without any keyword
    pub keyword_rejected: usize,

    /// Candidates not classified as the target language
    pub language_rejected: usize,

    /// Candidates identical to an accepted passage
    pub exact_duplicates: usize,

    /// Candidates judged near-duplicates of an accepted passage
    pub near_duplicates: usize,

    /// Passages in the final list
    pub accepted: usize,
}

/// Streaming segment → filter → dedup stage
#[derive(Debug, Clone)]
pub struct PassageProcessor {
    config: ProcessorConfig,
    filter: RelevanceFilter,
    deduplicator: Deduplicator,
    stats: ProcessStats,
}

impl PassageProcessor {
    /// Create a processor for the given keywords
    pub fn new<S: AsRef<str>>(keywords: &[S], config: ProcessorConfig) -> Self {
        let filter = RelevanceFilter::new(keywords, &config);
        let deduplicator = Deduplicator::new(config.dedup);
        Self {
            config,
            filter,
            deduplicator,
            stats: ProcessStats::default(),
        }
    }

    /// Segment a page and offer each of its passages; failed pages are ignored
    pub fn offer_page(&mut self, page: &PageResult) {
        let Some(text) = page.text() else {
            return;
        };
        let candidates = segment(text, &self.config);
        self.stats.segmented += candidates.len();
        for candidate in candidates {
            self.offer_candidate(Passage::new(page.url.as_str(), candidate));
        }
    }

    /// Run one already-segmented passage through the filter and dedup
    pub fn offer_candidate(&mut self, passage: Passage) -> Option<Verdict> {
        match self.filter.check(&passage.text) {
            Relevance::NoKeyword => {
                self.stats.keyword_rejected += 1;
                return None;
            }
            Relevance::WrongLanguage => {
                debug!("Rejected non-target-language passage from {}", passage.url);
                self.stats.language_rejected += 1;
                return None;
            }
            Relevance::Relevant => {}
        }

        let verdict = self.deduplicator.offer(passage);
        match verdict {
            Verdict::Accepted => self.stats.accepted += 1,
            Verdict::ExactDuplicate => self.stats.exact_duplicates += 1,
            Verdict::NearDuplicate { .. } => self.stats.near_duplicates += 1,
        }
        Some(verdict)
    }

    /// Counters so far
    pub fn stats(&self) -> ProcessStats {
        self.stats
    }

    /// Accepted passages so far, in acceptance order
    pub fn accepted(&self) -> &[Passage] {
        self.deduplicator.accepted()
    }

    /// Consume the processor, returning accepted passages and counters
    pub fn finish(self) -> (Vec<Passage>, ProcessStats) {
        (self.deduplicator.into_accepted(), self.stats)
    }
}

/// Process pages in order into the deduplicated, relevant passage list
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn process_pages<S: AsRef<str>>(
    pages: &[PageResult],
    keywords: &[S],
    config: &ProcessorConfig,
) -> (Vec<Passage>, ProcessStats) {
    let mut processor = PassageProcessor::new(keywords, config.clone());
    for page in pages {
        processor.offer_page(page);
    }
    let (passages, stats) = processor.finish();
    info!(
        segmented = stats.segmented,
        accepted = stats.accepted,
        "Processed {} pages",
        pages.len()
    );
    (passages, stats)
}

/// Filter and deduplicate passages that are already segmented
///
/// Used to re-check a saved passage list; passages are not re-segmented.
#[instrument(skip_all, fields(passages = passages.len()))]
pub fn filter_passages<S: AsRef<str>>(
    passages: Vec<Passage>,
    keywords: &[S],
    config: &ProcessorConfig,
) -> (Vec<Passage>, ProcessStats) {
    let mut processor = PassageProcessor::new(keywords, config.clone());
    processor.stats.segmented = passages.len();
    for passage in passages {
        processor.offer_candidate(passage);
    }
    processor.finish()
}

/// Load a JSON array of `{url, text}` passages, as written by a JSON report
pub async fn read_passages(path: &Path) -> Result<Vec<Passage>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FetchError;
    use crate::error::Error;

    const INNOVATION_FR: &str =
        "Notre entreprise place l'innovation au cœur de sa stratégie et de ses relations avec les clients.";

    #[test]
    fn test_processor_config() {
        let config = ProcessorConfig::builder()
            .passage_chars(40, 400)
            .require_reliable_language(true)
            .build();

        assert_eq!(config.min_passage_chars, 40);
        assert_eq!(config.max_passage_chars, 400);
        assert!(config.require_reliable_language);
        assert_eq!(config.dedup, DedupThresholds::default());
    }

    #[test]
    fn test_process_pages_counts_each_stage() {
        let text = format!(
            "Menu. {} This company focuses on innovation and growth. {} Rien à voir avec le sujet de la recherche.",
            INNOVATION_FR, INNOVATION_FR
        );
        let pages = vec![
            PageResult::fetched("https://exemple.fr", text),
            PageResult::failed(
                "https://exemple.fr/erreur",
                &FetchError::Navigation {
                    url: "https://exemple.fr/erreur".to_string(),
                    reason: "HTTP 500".to_string(),
                },
            ),
        ];

        let (passages, stats) = process_pages(&pages, &["innovation"], &ProcessorConfig::default());

        assert_eq!(passages, vec![Passage::new("https://exemple.fr", INNOVATION_FR)]);
        assert_eq!(
            stats,
            ProcessStats {
                segmented: 4,
                keyword_rejected: 1,
                language_rejected: 1,
                exact_duplicates: 1,
                near_duplicates: 0,
                accepted: 1,
            }
        );
    }

    #[test]
    fn test_first_page_wins_across_urls() {
        let pages = vec![
            PageResult::fetched("https://exemple.fr/a", INNOVATION_FR),
            PageResult::fetched("https://exemple.fr/b", INNOVATION_FR.replace("ses relations", "leurs relations")),
        ];

        let (passages, stats) = process_pages(&pages, &["innovation"], &ProcessorConfig::default());

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].url, "https://exemple.fr/a");
        assert_eq!(stats.near_duplicates, 1);
    }

    #[test]
    fn test_filter_passages_does_not_resegment() {
        let passages = vec![
            Passage::new("https://exemple.fr", "Court mais innovation."),
            Passage::new("https://exemple.fr/b", INNOVATION_FR),
        ];

        let (kept, stats) = filter_passages(passages, &["innovation"], &ProcessorConfig::default());

        assert_eq!(stats.segmented, 2);
        assert!(kept.iter().any(|p| p.url == "https://exemple.fr/b"));
    }

    #[tokio::test]
    async fn test_read_passages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passages.json");
        std::fs::write(
            &path,
            format!(r#"[{{"url": "https://acme.fr/", "text": "{INNOVATION_FR}"}}]"#),
        )
        .unwrap();

        let passages = read_passages(&path).await.unwrap();
        assert_eq!(passages, vec![Passage::new("https://acme.fr/", INNOVATION_FR)]);

        std::fs::write(&path, "pas du json").unwrap();
        assert!(matches!(read_passages(&path).await, Err(Error::Json(_))));

        let missing = dir.path().join("absent.json");
        assert!(matches!(read_passages(&missing).await, Err(Error::Io(_))));
    }
}
