//! Relevance gate: keyword presence plus language classification
//!
//! Both gates must pass. Keyword matching is a plain substring test on
//! diacritic-stripped, lowercased text, so `"café"` matches `"Cafe"`. A
//! passage the language detector cannot classify is treated as not being in
//! the target language.

use tracing::trace;
use whatlang::Lang;

use crate::processor::ProcessorConfig;
use crate::processor::normalize::fold;

/// Why a passage did or did not pass the relevance gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    /// Mentions a keyword and is in the target language
    Relevant,
    /// No keyword occurs in the passage
    NoKeyword,
    /// Classified as another language, or not classifiable
    WrongLanguage,
}

/// Keyword and language filter for passages
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
    language: Lang,
    require_reliable: bool,
}

impl RelevanceFilter {
    /// Create a filter for the given keywords
    ///
    /// Keywords are folded once here; blank keywords are ignored.
    pub fn new<S: AsRef<str>>(keywords: &[S], config: &ProcessorConfig) -> Self {
        let keywords = keywords
            .iter()
            .map(|keyword| fold(keyword.as_ref().trim()))
            .filter(|keyword| !keyword.is_empty())
            .collect();

        Self {
            keywords,
            language: config.target_language,
            require_reliable: config.require_reliable_language,
        }
    }

    /// Folded keywords in use
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether any keyword occurs in the passage
    pub fn matches_keyword(&self, passage: &str) -> bool {
        let folded = fold(passage);
        self.keywords.iter().any(|keyword| folded.contains(keyword.as_str()))
    }

    /// Whether the passage is classified as the target language
    pub fn is_target_language(&self, passage: &str) -> bool {
        match whatlang::detect(passage) {
            Some(info) => {
                trace!(
                    lang = ?info.lang(),
                    confidence = info.confidence(),
                    reliable = info.is_reliable(),
                    "Classified passage"
                );
                info.lang() == self.language && (!self.require_reliable || info.is_reliable())
            }
            None => false,
        }
    }

    /// Run both gates; the keyword gate is checked first
    pub fn check(&self, passage: &str) -> Relevance {
        if !self.matches_keyword(passage) {
            Relevance::NoKeyword
        } else if !self.is_target_language(passage) {
            Relevance::WrongLanguage
        } else {
            Relevance::Relevant
        }
    }

    pub fn is_relevant(&self, passage: &str) -> bool {
        self.check(passage) == Relevance::Relevant
    }
}
