//! Rule-based detection of retrieval intent.

/// Cues that mark a request as asking about previous creations rather
/// than describing a new one.
const RETRIEVAL_CUES: [&str; 15] = [
    "show me",
    "find",
    "retrieve",
    "get",
    "recall",
    "remember",
    "like before",
    "like last time",
    "previous",
    "earlier",
    "last",
    "search for",
    "look for",
    "any",
    "all",
];

/// Whether free text expresses a retrieval intent.
///
/// Callers use this to decide whether to hand the text to the query
/// handler at all; creation requests go to the producing workflow instead.
pub fn is_retrieval_intent(text: &str) -> bool {
    let lowered = text.to_lowercase();
    RETRIEVAL_CUES.iter().any(|cue| lowered.contains(cue))
}

#[cfg(test)]
mod tests {
    use super::is_retrieval_intent;

    #[test]
    fn retrieval_phrases_are_detected() {
        assert!(is_retrieval_intent("Show me my dragons"));
        assert!(is_retrieval_intent("get my last 2 creations"));
        assert!(is_retrieval_intent("something like last time"));
    }

    #[test]
    fn creation_phrases_are_not() {
        assert!(!is_retrieval_intent("a glowing dragon on a cliff"));
        assert!(!is_retrieval_intent("make me a castle in the clouds"));
    }
}
