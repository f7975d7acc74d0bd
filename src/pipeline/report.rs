//! Pipeline output handed to report renderers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::processor::{Passage, ProcessStats};

/// Passages a renderer shows by default
pub const DEFAULT_REPORT_LIMIT: usize = 30;

/// A seed whose traversal failed; other seeds are unaffected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedWarning {
    pub seed: String,
    pub message: String,
}

/// Crawl and processing counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Seeds whose traversal completed or was stopped early
    pub seeds_crawled: usize,

    /// Pages whose fetch failed and were skipped
    pub pages_failed: usize,

    /// Passage counters
    #[serde(flatten)]
    pub passages: ProcessStats,
}

/// Deduplicated, relevant passages for one company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelReport {
    pub company: String,
    pub keywords: Vec<String>,
    pub generated_at: DateTime<Utc>,

    /// Pages visited across all seeds, failures included
    pub pages_visited: usize,

    /// Accepted passages, first-seen order
    pub passages: Vec<Passage>,

    pub warnings: Vec<SeedWarning>,
    pub stats: PipelineStats,

    /// The run was cancelled or hit a time budget before finishing
    #[serde(default)]
    pub incomplete: bool,
}

impl IntelReport {
    /// The first `n` passages
    pub fn top(&self, n: usize) -> &[Passage] {
        &self.passages[..n.min(self.passages.len())]
    }

    /// Plain-text rendering showing at most `limit` passages
    pub fn to_text(&self, limit: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Veille : {}", self.company);
        let _ = writeln!(out, "Généré le {}", self.generated_at.format("%d/%m/%Y %H:%M UTC"));
        let _ = writeln!(out, "Mots-clés : {}", self.keywords.join(", "));
        let _ = writeln!(
            out,
            "{} pages visitées, {} passages retenus",
            self.pages_visited,
            self.passages.len()
        );
        if self.incomplete {
            let _ = writeln!(out, "Attention : exploration interrompue, résultats partiels");
        }
        for warning in &self.warnings {
            let _ = writeln!(out, "Attention : {} : {}", warning.seed, warning.message);
        }

        for (index, passage) in self.top(limit).iter().enumerate() {
            let _ = write!(out, "\n{}. {}\n   {}\n", index + 1, passage.text, passage.url);
        }
        if self.passages.len() > limit {
            let _ = write!(out, "\n… {} passages non affichés\n", self.passages.len() - limit);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(passages: usize) -> IntelReport {
        IntelReport {
            company: "ACME".to_string(),
            keywords: vec!["innovation".to_string()],
            generated_at: Utc::now(),
            pages_visited: 3,
            passages: (0..passages)
                .map(|i| Passage::new(format!("https://acme.fr/{i}"), format!("Passage {i}")))
                .collect(),
            warnings: vec![SeedWarning {
                seed: "https://hs.fr".to_string(),
                message: "fetcher unavailable".to_string(),
            }],
            stats: PipelineStats::default(),
            incomplete: false,
        }
    }

    #[test]
    fn test_top_truncates() {
        let report = report(40);

        assert_eq!(report.top(DEFAULT_REPORT_LIMIT).len(), 30);
        assert_eq!(report.top(100).len(), 40);
        assert_eq!(report.top(2)[1].url, "https://acme.fr/1");
    }

    #[test]
    fn test_to_text() {
        let text = report(3).to_text(2);

        assert!(text.contains("Veille : ACME"));
        assert!(text.contains("3 pages visitées, 3 passages retenus"));
        assert!(text.contains("https://hs.fr : fetcher unavailable"));
        assert!(text.contains("2. Passage 1"));
        assert!(!text.contains("Passage 2\n"));
        assert!(text.contains("1 passages non affichés"));
    }

    #[test]
    fn test_stats_serialize_flat() {
        let json = serde_json::to_value(report(1)).unwrap();

        assert_eq!(json["stats"]["accepted"], 0);
        assert_eq!(json["stats"]["seeds_crawled"], 0);
        assert_eq!(json["passages"][0]["text"], "Passage 0");
    }
}
