//! # Passage Segmenter
//!
//! Splits page text into sentence-like passages. A passage ends at `.`, `!`,
//! `?`, `;` or `:` when followed by whitespace; the punctuation stays with the
//! passage. Spans outside the configured length window (trimmed, counted in
//! characters) are dropped, which removes menu fragments and runaway blocks.

use tracing::{debug, instrument};

use crate::processor::ProcessorConfig;

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ';' | ':')
}

/// Split text into raw spans at terminal punctuation followed by whitespace
fn split_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }
        let Some(&(next_index, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }

        spans.push(&text[start..next_index]);

        let mut resume = next_index;
        while let Some(&(ws_index, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                break;
            }
            resume = ws_index + ws.len_utf8();
            chars.next();
        }
        start = resume;
    }

    if start < text.len() {
        spans.push(&text[start..]);
    }
    spans
}

/// Segment text into passages within the configured length window
#[instrument(skip(text, config), fields(text_len = text.len()))]
pub fn segment(text: &str, config: &ProcessorConfig) -> Vec<String> {
    let passages: Vec<String> = split_spans(text)
        .into_iter()
        .map(str::trim)
        .filter(|span| {
            let len = span.chars().count();
            len >= config.min_passage_chars && len <= config.max_passage_chars
        })
        .map(String::from)
        .collect();

    debug!("Segmented text into {} passages", passages.len());
    passages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProcessorConfig {
        ProcessorConfig::default()
    }

    #[test]
    fn test_split_on_terminal_punctuation() {
        let spans = split_spans("Un. Deux! Trois? Quatre; Cinq: Six");

        assert_eq!(spans, vec!["Un.", "Deux!", "Trois?", "Quatre;", "Cinq:", "Six"]);
    }

    #[test]
    fn test_no_split_without_whitespace() {
        let spans = split_spans("Version 2.5 du site www.exemple.fr:8080 est en ligne.");

        assert_eq!(spans, vec!["Version 2.5 du site www.exemple.fr:8080 est en ligne."]);
    }

    #[test]
    fn test_segment_keeps_length_window() {
        let short = "Menu.";
        let kept = "Notre entreprise accompagne les collectivités locales depuis vingt ans.";
        let long = format!("{}.", "mot ".repeat(200).trim());
        let text = format!("{} {}   {} Fin", short, kept, long);

        let passages = segment(&text, &config());

        assert_eq!(passages, vec![kept.to_string()]);
    }

    #[test]
    fn test_segment_bounds_are_inclusive_in_characters() {
        let exactly_min = format!("{} !", "é".repeat(28));
        let just_short = format!("{} !", "é".repeat(27));
        assert_eq!(exactly_min.chars().count(), 30);
        assert!(exactly_min.len() > 30);

        let text = format!("{} {}", exactly_min, just_short);
        let passages = segment(&text, &config());

        assert_eq!(passages, vec![exactly_min]);
    }

    #[test]
    fn test_segment_output_always_within_bounds() {
        let text = "a. ".repeat(50)
            + &"Phrase de longueur tout à fait raisonnable pour un test. ".repeat(5)
            + &"x".repeat(700);
        let config = config();

        for passage in segment(&text, &config) {
            let len = passage.chars().count();
            assert!(len >= config.min_passage_chars && len <= config.max_passage_chars);
        }
    }
}
