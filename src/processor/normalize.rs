//! Text normalization shared by the relevance filter and the duplicate detector

use deunicode::deunicode;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)\S+").expect("valid URL pattern"));

static DIGIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

static PUNCTUATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]|_").expect("valid punctuation pattern"));

/// French and English function words ignored when comparing passages
const STOP_WORDS: &[&str] = &[
    // French
    "au", "aux", "avec", "ce", "ces", "cette", "cet", "ceci", "cela", "celui", "celle", "ceux",
    "dans", "de", "des", "du", "elle", "elles", "en", "et", "eux", "il", "ils", "je", "la", "le",
    "les", "leur", "leurs", "lui", "ma", "mais", "me", "meme", "mes", "moi", "mon", "ne", "nos",
    "notre", "nous", "on", "ou", "par", "pas", "pour", "qu", "que", "qui", "quoi", "sa", "se",
    "ses", "son", "sur", "ta", "te", "tes", "toi", "ton", "tu", "un", "une", "vos", "votre",
    "vous", "est", "sont", "etre", "avoir", "ont", "avait", "etait", "ete", "fait", "faire",
    "plus", "moins", "tres", "tout", "tous", "toute", "toutes", "aussi", "ainsi", "donc", "car",
    "comme", "lors", "entre", "chez", "sans", "sous", "vers", "depuis", "dont", "afin", "alors",
    "ici", "peut", "encore", "deja", "bien", "leurs", "celles",
    // English
    "the", "and", "for", "are", "but", "not", "you", "your", "yours", "our", "ours", "their",
    "theirs", "they", "them", "this", "that", "these", "those", "with", "from", "into", "onto",
    "over", "about", "was", "were", "been", "being", "have", "has", "had", "does", "did", "doing",
    "will", "would", "shall", "should", "can", "could", "may", "might", "must", "its", "his",
    "her", "hers", "him", "she", "who", "whom", "which", "what", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "than", "too",
    "very", "just", "also", "only", "then", "there", "here", "out", "off", "again", "once",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Strip diacritics and lowercase
///
/// `"Café"` and `"CAFE"` both fold to `"cafe"`.
pub fn fold(text: &str) -> String {
    deunicode(text).to_lowercase()
}

/// Whether a folded token is a stop-word
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

/// A passage reduced to its comparable content words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPassage {
    /// Content tokens in passage order
    pub tokens: Vec<String>,

    /// Tokens joined by single spaces
    pub joined: String,
}

impl NormalizedPassage {
    /// Normalize a passage for near-duplicate comparison
    ///
    /// Lowercases, strips diacritics, URLs, digit runs and punctuation,
    /// collapses whitespace, then drops stop-words and tokens of two
    /// characters or fewer.
    pub fn new(text: &str) -> Self {
        let folded = fold(text);
        let without_urls = URL_PATTERN.replace_all(&folded, " ");
        let without_digits = DIGIT_PATTERN.replace_all(&without_urls, " ");
        let without_punctuation = PUNCTUATION_PATTERN.replace_all(&without_digits, " ");

        let tokens: Vec<String> = without_punctuation
            .split_whitespace()
            .filter(|token| token.chars().count() > 2 && !is_stop_word(token))
            .map(String::from)
            .collect();
        let joined = tokens.join(" ");

        Self { tokens, joined }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("Café Crème"), "cafe creme");
        assert_eq!(fold("ÉLÈVE"), "eleve");
        assert_eq!(fold("Innovation"), "innovation");
    }

    #[test]
    fn test_normalized_passage() {
        let normalized = NormalizedPassage::new(
            "Depuis 1998, notre équipe (12 ingénieurs) innove : voir https://exemple.fr/equipe ou www.exemple.fr !",
        );

        assert_eq!(
            normalized.tokens,
            vec!["equipe", "ingenieurs", "innove", "voir"]
        );
        assert_eq!(normalized.joined, "equipe ingenieurs innove voir");
    }

    #[test]
    fn test_normalized_passage_splits_on_apostrophes() {
        let normalized = NormalizedPassage::new("L'entreprise d'aujourd'hui");

        assert_eq!(normalized.tokens, vec!["entreprise", "aujourd", "hui"]);
    }

    #[test]
    fn test_only_stop_words_normalizes_to_empty() {
        let normalized = NormalizedPassage::new("Ils sont avec nous et pour vous.");

        assert!(normalized.tokens.is_empty());
        assert_eq!(normalized.joined, "");
    }
}
