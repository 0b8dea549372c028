// src/ingest/filter.rs

/// True if any blocked word equals a title token, ignoring case.
///
/// Tokens come from splitting on a literal `' '`, so punctuation stays glued
/// to the word ("Google," is not "google") and multi-word entries never match.
pub fn contains_blocked_keyword<S: AsRef<str>>(blocked: &[S], title: &str) -> bool {
    let lowered = title.to_lowercase();
    let tokens: Vec<&str> = lowered.split(' ').collect();
    blocked.iter().any(|w| {
        let w = w.as_ref().to_lowercase();
        tokens.iter().any(|t| *t == w)
    })
}
