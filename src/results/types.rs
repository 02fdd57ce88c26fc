//! Result type definitions

use serde::{Deserialize, Serialize};

/// A single item returned by a search backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResultItem {
    /// The URL of the result
    pub link: String,
    /// The title of the result (empty when the backend supplies none)
    #[serde(default)]
    pub title: String,
    /// Content snippet (empty for link-only backends)
    #[serde(default)]
    pub snippet: String,
}

impl SearchResultItem {
    /// Create a new item
    pub fn new(link: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: String::new(),
            snippet: snippet.into(),
        }
    }

    /// Create an item carrying only a link
    pub fn link_only(link: impl Into<String>) -> Self {
        Self::new(link, "")
    }

    /// Add a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Normalized unit of text submitted to the similarity scorer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Source URL
    pub url: String,
    /// Snippet or fetched document body
    pub text: String,
}

impl Candidate {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Best-matching span within one candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpanResult {
    /// Source URL of the candidate
    pub url: String,
    /// The single sentence closest to the quotation
    pub best_sentence: String,
    /// Best sentence plus surrounding context
    pub span_text: String,
    /// Similarity between the quotation and the best sentence
    pub best_score: f32,
}

/// Which backend supplied a set of search items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Specialized,
    General,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Specialized => write!(f, "specialized"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Backend failure classes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("failed to build request: {0}")]
    Request(String),
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("no {0} backend configured")]
    Unavailable(BackendKind),
}
