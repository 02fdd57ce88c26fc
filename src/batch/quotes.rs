//! Quotation extraction from article text

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static QUOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”"#).unwrap());

/// Quoted passages of at least `min_chars` characters, trimmed, first
/// occurrence kept
pub fn extract_quotes(article: &str, min_chars: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    QUOTE_RE
        .captures_iter(article)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim())
        .filter(|q| q.chars().count() >= min_chars)
        .filter(|q| seen.insert(q.to_string()))
        .map(str::to_string)
        .collect()
}
