//! # Processor Configuration Module
//!
//! Configuration for turning page text into accepted passages: the passage
//! length window used by the segmenter, the target language of the relevance
//! filter, and the thresholds of the duplicate detector.

use serde::{Deserialize, Serialize};
use whatlang::Lang;

/// Thresholds of the three near-duplicate rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DedupThresholds {
    /// Minimum shared-token ratio (over the smaller token set)
    pub token_overlap: f64,

    /// Minimum character sequence-similarity ratio
    pub sequence_ratio: f64,

    /// Minimum length of both normalized strings for the containment rule
    pub containment_min_chars: usize,
}

impl Default for DedupThresholds {
    fn default() -> Self {
        Self {
            token_overlap: 0.55,
            sequence_ratio: 0.78,
            containment_min_chars: 20,
        }
    }
}

/// Configuration for the processor
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Shortest passage kept, in characters after trimming
    pub min_passage_chars: usize,

    /// Longest passage kept, in characters after trimming
    pub max_passage_chars: usize,

    /// Language a passage must be classified as
    pub target_language: Lang,

    /// Reject passages whose language classification is flagged unreliable
    pub require_reliable_language: bool,

    /// Near-duplicate thresholds
    pub dedup: DedupThresholds,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            min_passage_chars: 30,
            max_passage_chars: 600,
            target_language: Lang::Fra,
            require_reliable_language: false,
            dedup: DedupThresholds::default(),
        }
    }
}

/// Builder for ProcessorConfig
#[derive(Debug, Default)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ProcessorConfig::default(),
        }
    }

    /// Set the passage length window
    pub fn passage_chars(mut self, min: usize, max: usize) -> Self {
        self.config.min_passage_chars = min;
        self.config.max_passage_chars = max;
        self
    }

    /// Set the target language
    pub fn target_language(mut self, language: Lang) -> Self {
        self.config.target_language = language;
        self
    }

    /// Set whether unreliable language classifications are rejected
    pub fn require_reliable_language(mut self, require: bool) -> Self {
        self.config.require_reliable_language = require;
        self
    }

    /// Set the dedup thresholds
    pub fn dedup(mut self, thresholds: DedupThresholds) -> Self {
        self.config.dedup = thresholds;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ProcessorConfig {
        self.config
    }
}

impl ProcessorConfig {
    /// Create a new builder
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::new()
    }
}
