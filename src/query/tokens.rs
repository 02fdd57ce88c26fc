//! Token normalization and order-preserving deduplication

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Lowercase, replace punctuation with spaces and collapse whitespace
pub fn normalize_token(token: &str) -> String {
    let stripped = PUNCT_RE.replace_all(token, " ").to_lowercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove tokens whose normalized form was already seen, keeping the
/// first surface form and the original order. Tokens that normalize to
/// nothing are dropped.
pub fn dedupe_preserve<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| {
            let norm = normalize_token(t);
            !norm.is_empty() && seen.insert(norm)
        })
        .map(str::to_string)
        .collect()
}
