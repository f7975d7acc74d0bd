//! # Duplicate Detector
//!
//! Accepts passages one at a time, first-seen-wins. A candidate is compared
//! with every accepted passage in acceptance order and rejected on the first
//! near-duplicate; otherwise it is appended. Acceptance is inherently
//! sequential, so a [`Deduplicator`] has a single owner.
//!
//! A pair is a near-duplicate when any of these holds on the normalized forms:
//!
//! 1. shared tokens / smaller token set ≥ `token_overlap`
//! 2. character sequence ratio ≥ `sequence_ratio`
//! 3. one string contains the other, both at least `containment_min_chars` long
//!
//! Identical raw text is caught first by a set lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::processor::normalize::NormalizedPassage;
use crate::processor::similarity::{is_contained, sequence_ratio, token_overlap};
use crate::processor::{DedupThresholds, Passage};

/// Rule that flagged a near-duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRule {
    /// Token-set overlap
    TokenOverlap,
    /// Character sequence similarity
    SequenceRatio,
    /// One passage contained in the other
    Containment,
}

/// Outcome of offering a passage to the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The passage was appended to the accepted list
    Accepted,
    /// Same raw text as an accepted passage
    ExactDuplicate,
    /// Near-duplicate of the accepted passage at `index`
    NearDuplicate {
        /// Position of the matching passage in the accepted list
        index: usize,
        /// The first rule that matched
        rule: DuplicateRule,
    },
}

/// Which rule, if any, makes `candidate` a near-duplicate of `accepted`
pub fn near_duplicate_rule(
    candidate: &NormalizedPassage,
    accepted: &NormalizedPassage,
    thresholds: &DedupThresholds,
) -> Option<DuplicateRule> {
    if token_overlap(&candidate.tokens, &accepted.tokens) >= thresholds.token_overlap {
        return Some(DuplicateRule::TokenOverlap);
    }
    if sequence_ratio(&candidate.joined, &accepted.joined) >= thresholds.sequence_ratio {
        return Some(DuplicateRule::SequenceRatio);
    }
    if is_contained(
        &candidate.joined,
        &accepted.joined,
        thresholds.containment_min_chars,
    ) {
        return Some(DuplicateRule::Containment);
    }
    None
}

/// Append-only, first-seen-wins passage set
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    thresholds: DedupThresholds,
    accepted: Vec<Passage>,
    normalized: Vec<NormalizedPassage>,
    exact: HashSet<String>,
}

impl Deduplicator {
    /// Create an empty detector
    pub fn new(thresholds: DedupThresholds) -> Self {
        Self {
            thresholds,
            ..Default::default()
        }
    }

    /// Compare a passage text against everything accepted so far
    pub fn check(&self, text: &str) -> Verdict {
        if self.exact.contains(text) {
            return Verdict::ExactDuplicate;
        }
        let candidate = NormalizedPassage::new(text);
        self.check_normalized(&candidate)
    }

    fn check_normalized(&self, candidate: &NormalizedPassage) -> Verdict {
        self.normalized
            .iter()
            .enumerate()
            .find_map(|(index, accepted)| {
                near_duplicate_rule(candidate, accepted, &self.thresholds)
                    .map(|rule| Verdict::NearDuplicate { index, rule })
            })
            .unwrap_or(Verdict::Accepted)
    }

    /// Offer a passage; it is appended when it is not a duplicate
    pub fn offer(&mut self, passage: Passage) -> Verdict {
        if self.exact.contains(&passage.text) {
            debug!("Exact duplicate from {}", passage.url);
            return Verdict::ExactDuplicate;
        }

        let candidate = NormalizedPassage::new(&passage.text);
        let verdict = self.check_normalized(&candidate);
        match verdict {
            Verdict::Accepted => {
                self.exact.insert(passage.text.clone());
                self.normalized.push(candidate);
                self.accepted.push(passage);
            }
            Verdict::NearDuplicate { index, rule } => {
                debug!(
                    ?rule,
                    "Near duplicate from {} of passage from {}",
                    passage.url,
                    self.accepted[index].url
                );
            }
            Verdict::ExactDuplicate => {}
        }
        verdict
    }

    /// Passages accepted so far, in acceptance order
    pub fn accepted(&self) -> &[Passage] {
        &self.accepted
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Consume the detector, returning the accepted passages
    pub fn into_accepted(self) -> Vec<Passage> {
        self.accepted
    }
}

/// Remove near-duplicates from an ordered passage list, keeping first occurrences
pub fn deduplicate(
    passages: impl IntoIterator<Item = Passage>,
    thresholds: DedupThresholds,
) -> Vec<Passage> {
    let mut deduplicator = Deduplicator::new(thresholds);
    for passage in passages {
        deduplicator.offer(passage);
    }
    deduplicator.into_accepted()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(url: &str, text: &str) -> Passage {
        Passage::new(url, text)
    }

    #[test]
    fn test_reworded_sentence_flagged_by_sequence_ratio() {
        let a = NormalizedPassage::new(
            "Notre entreprise propose des solutions innovantes pour nos clients partout en France.",
        );
        let b = NormalizedPassage::new(
            "Notre societe propose des solutions innovantes pour ses clients partout en France.",
        );

        assert!(sequence_ratio(&b.joined, &a.joined) >= 0.78);

        let thresholds = DedupThresholds {
            token_overlap: 1.1,
            ..DedupThresholds::default()
        };
        assert_eq!(
            near_duplicate_rule(&b, &a, &thresholds),
            Some(DuplicateRule::SequenceRatio)
        );
        assert!(near_duplicate_rule(&b, &a, &DedupThresholds::default()).is_some());
    }

    #[test]
    fn test_reordered_boilerplate_flagged_by_token_overlap() {
        let a = NormalizedPassage::new(
            "Nous utilisons des cookies pour améliorer votre expérience de navigation sur notre site.",
        );
        let b = NormalizedPassage::new(
            "Pour améliorer votre navigation, notre site utilise des cookies et mesure l'audience.",
        );

        assert_eq!(
            near_duplicate_rule(&b, &a, &DedupThresholds::default()),
            Some(DuplicateRule::TokenOverlap)
        );
    }

    #[test]
    fn test_pull_quote_flagged_by_containment() {
        let quote = NormalizedPassage::new("Cinquante ateliers rénovés chaque année en Bretagne.");
        let paragraph = NormalizedPassage::new(
            "Grâce au programme régional, cinquante ateliers rénovés chaque année en Bretagne \
             accueillent apprentis, artisans, designers, chercheurs, étudiants, associations, \
             investisseurs, collectivités, visiteurs.",
        );

        let thresholds = DedupThresholds {
            token_overlap: 1.1,
            sequence_ratio: 1.1,
            containment_min_chars: 20,
        };
        assert_eq!(
            near_duplicate_rule(&quote, &paragraph, &thresholds),
            Some(DuplicateRule::Containment)
        );
    }

    #[test]
    fn test_distinct_passages_both_accepted() {
        let mut dedup = Deduplicator::new(DedupThresholds::default());

        assert_eq!(
            dedup.offer(passage(
                "https://a.fr",
                "Le groupe a inauguré une nouvelle usine de recyclage à Lyon."
            )),
            Verdict::Accepted
        );
        assert_eq!(
            dedup.offer(passage(
                "https://a.fr/rh",
                "Nos équipes recrutent des techniciens de maintenance expérimentés."
            )),
            Verdict::Accepted
        );
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_exact_duplicate_short_circuit() {
        let mut dedup = Deduplicator::new(DedupThresholds::default());
        let text = "Le groupe a inauguré une nouvelle usine de recyclage à Lyon.";

        assert_eq!(dedup.offer(passage("https://a.fr", text)), Verdict::Accepted);
        assert_eq!(dedup.check(text), Verdict::ExactDuplicate);
        assert_eq!(
            dedup.offer(passage("https://a.fr/autre", text)),
            Verdict::ExactDuplicate
        );
        assert_eq!(dedup.accepted()[0].url, "https://a.fr");
    }

    #[test]
    fn test_first_seen_wins() {
        let passages = vec![
            passage(
                "https://a.fr/actualites",
                "Notre entreprise propose des solutions innovantes pour nos clients partout en France.",
            ),
            passage(
                "https://a.fr/accueil",
                "Notre societe propose des solutions innovantes pour ses clients partout en France.",
            ),
        ];

        let accepted = deduplicate(passages, DedupThresholds::default());

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].url, "https://a.fr/actualites");
    }

    #[test]
    fn test_deduplicate_is_idempotent() {
        let passages = vec![
            passage("https://a.fr", "Le groupe a inauguré une nouvelle usine de recyclage à Lyon."),
            passage("https://a.fr/b", "Le groupe a inauguré une nouvelle usine de recyclage à Lyon !"),
            passage("https://a.fr/c", "Nos équipes recrutent des techniciens de maintenance expérimentés."),
            passage("https://a.fr/d", "Contactez-nous pour toute demande de devis personnalisé."),
            passage("https://a.fr/e", "Contactez nous pour toute demande de devis personnalisé et rapide."),
        ];

        let once = deduplicate(passages, DedupThresholds::default());
        let twice = deduplicate(once.clone(), DedupThresholds::default());

        assert_eq!(once.len(), 3);
        assert_eq!(once, twice);
    }
}
