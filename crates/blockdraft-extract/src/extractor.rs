use log::trace;

use crate::{lexer, vocabulary::vocabulary};

/// Collects candidate component names from `text`.
///
/// Three sources contribute, in this order:
///
/// 1. vocabulary terms found on word boundaries, case-insensitively, in
///    vocabulary order (the term itself is the candidate);
/// 2. runs of title-case words longer than three characters whose
///    lower-case form is not already a candidate;
/// 3. the verbatim contents of double-quoted phrases.
///
/// Duplicates are removed keeping the first occurrence.
pub fn extract_components(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for category in vocabulary().categories() {
        for term in category.terms_in(text) {
            push_unique(&mut found, term.to_string());
        }
    }

    for phrase in lexer::capitalized_phrases(text) {
        if phrase.chars().count() > 3 && !found.contains(&phrase.to_lowercase()) {
            push_unique(&mut found, phrase);
        }
    }

    for quoted in lexer::quoted_phrases(text) {
        push_unique(&mut found, quoted.to_string());
    }

    trace!(count = found.len(); "Candidate extraction finished");
    found
}

fn push_unique(found: &mut Vec<String>, candidate: String) {
    if !found.contains(&candidate) {
        found.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_terms_in_vocabulary_order() {
        let found = extract_components("an led and a battery");
        assert_eq!(found, ["battery", "led"]);
    }

    #[test]
    fn test_overlapping_terms_are_all_reported() {
        let found = extract_components("pir motion sensor");
        assert_eq!(found, ["sensor", "motion sensor"]);
    }

    #[test]
    fn test_capitalized_phrase_skipped_when_already_found() {
        let found = extract_components("Camera with Night Vision");
        assert_eq!(found, ["camera", "Night Vision"]);
    }

    #[test]
    fn test_short_capitalized_words_ignored() {
        assert!(extract_components("Fan").is_empty());
        assert_eq!(extract_components("Fans"), ["Fans"]);
    }

    #[test]
    fn test_quoted_phrases_verbatim() {
        let found = extract_components("uses a \"flux capacitor\" core");
        assert_eq!(found, ["flux capacitor"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_components("").is_empty());
    }
}
