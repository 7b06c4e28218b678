//! Lightweight natural-language interpretation of retrieval requests.

use log::debug;

/// Words whose following word is taken as a search term.
const CONNECTOR_CUES: [&str; 4] = ["like", "about", "with", "containing"];

/// Cues selecting newest-first ordering.
const RECENT_CUES: [&str; 3] = ["recent", "latest", "newest"];

/// Cues selecting oldest-first ordering.
const OLDEST_CUES: [&str; 3] = ["oldest", "first", "earliest"];

/// Common words skipped during keyword fallback.
const STOPWORDS: [&str; 13] = [
    "show", "me", "find", "get", "the", "a", "an", "in", "on", "with", "and", "or", "my",
];

/// Irregular-ish plural pairs seen in creation prompts.
const PLURAL_FORMS: [(&str, &str); 9] = [
    ("cities", "city"),
    ("castles", "castle"),
    ("dragons", "dragon"),
    ("robots", "robot"),
    ("mountains", "mountain"),
    ("islands", "island"),
    ("clouds", "cloud"),
    ("towers", "tower"),
    ("buildings", "building"),
];

/// Structured form of a free-text retrieval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Ordered search terms; duplicates allowed, singular/plural pairs
    /// both included so either form matches.
    pub search_terms: Vec<String>,
    /// Maximum number of results requested.
    pub limit: usize,
    /// Newest-first when true.
    pub descending: bool,
}

impl Default for ParsedQuery {
    fn default() -> Self {
        Self {
            search_terms: Vec::new(),
            limit: 5,
            descending: true,
        }
    }
}

/// Interpret a free-text retrieval request.
///
/// Terms come from words following connector cues ("like", "about",
/// "with", "containing"); when none are present, from all words longer
/// than three characters outside the stopword set. "last N" overrides the
/// result limit; oldest/first/earliest flips the sort to ascending.
pub fn parse(text: &str) -> ParsedQuery {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let mut parsed = ParsedQuery::default();

    let mut terms: Vec<String> = Vec::new();
    for pair in words.windows(2) {
        if CONNECTOR_CUES.contains(&pair[0]) {
            terms.push(pair[1].to_string());
        }
    }

    if RECENT_CUES.iter().any(|cue| lowered.contains(cue)) {
        parsed.descending = true;
    } else if OLDEST_CUES.iter().any(|cue| lowered.contains(cue)) {
        parsed.descending = false;
    }

    for pair in words.windows(2) {
        if pair[0] == "last" {
            if let Ok(count) = pair[1].parse::<usize>() {
                parsed.limit = count;
            }
        }
    }

    if terms.is_empty() {
        terms = words
            .iter()
            .filter(|word| word.len() > 3 && !STOPWORDS.contains(word))
            .map(|word| (*word).to_string())
            .collect();
    }

    parsed.search_terms = expand_terms(terms);
    debug!(
        "parsed retrieval request (terms={:?}, limit={}, descending={})",
        parsed.search_terms, parsed.limit, parsed.descending
    );
    parsed
}

/// Add the singular/plural counterpart of each term so either form
/// matches at search time.
fn expand_terms(terms: Vec<String>) -> Vec<String> {
    let mut expanded = terms.clone();
    for term in &terms {
        if let Some(singular) = singular_form(term) {
            if !expanded.contains(&singular) {
                expanded.push(singular);
            }
        }
        if let Some(plural) = plural_form(term) {
            if !expanded.contains(&plural) {
                expanded.push(plural);
            }
        }
    }
    expanded
}

/// Singular counterpart of a plural term, when meaningful.
fn singular_form(word: &str) -> Option<String> {
    if let Some((_, singular)) = PLURAL_FORMS.iter().find(|(plural, _)| *plural == word) {
        return Some((*singular).to_string());
    }
    let stem = word.strip_suffix('s')?;
    if stem.len() > 1 && !STOPWORDS.contains(&stem) {
        return Some(stem.to_string());
    }
    None
}

/// Plural counterpart of a known singular term.
fn plural_form(word: &str) -> Option<String> {
    PLURAL_FORMS
        .iter()
        .find(|(_, singular)| *singular == word)
        .map(|(plural, _)| (*plural).to_string())
}

#[cfg(test)]
mod tests {
    use super::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn connector_cue_takes_following_word() {
        let parsed = parse("find something like dragons");
        assert!(parsed.search_terms.contains(&"dragons".to_string()));
        assert!(parsed.search_terms.contains(&"dragon".to_string()));
    }

    #[test]
    fn last_n_overrides_limit() {
        let parsed = parse("Get my last 2 creations");
        assert_eq!(parsed.limit, 2);
    }

    #[test]
    fn oldest_cue_flips_direction() {
        let parsed = parse("Show me the oldest robot");
        assert!(!parsed.descending);
        assert!(parsed.search_terms.contains(&"robot".to_string()));
    }

    #[test]
    fn recent_cue_keeps_newest_first() {
        let parsed = parse("show my most recent castles");
        assert!(parsed.descending);
        assert!(parsed.search_terms.contains(&"castles".to_string()));
        assert!(parsed.search_terms.contains(&"castle".to_string()));
    }

    #[test]
    fn keyword_fallback_skips_stopwords_and_short_words() {
        let parsed = parse("show me the red fox");
        assert!(!parsed.search_terms.contains(&"show".to_string()));
        assert!(!parsed.search_terms.contains(&"the".to_string()));
        assert!(!parsed.search_terms.contains(&"red".to_string()));
    }

    #[test]
    fn singular_gains_plural_counterpart() {
        let parsed = parse("any city builds");
        assert!(parsed.search_terms.contains(&"city".to_string()));
        assert!(parsed.search_terms.contains(&"cities".to_string()));
    }

    #[test]
    fn defaults_apply_without_cues() {
        let parsed = parse("anything");
        assert_eq!(parsed.limit, 5);
        assert!(parsed.descending);
    }
}
