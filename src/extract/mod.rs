//! Candidate extraction
//!
//! Turns routed search items into scoring candidates: either the item's
//! snippet, or the body of the transcript page it links to.

mod transcript;

pub use transcript::{extract_transcript, fetch_transcript_text, FetchError, TRANSCRIPT_MARKER};

use crate::network::HttpClient;
use crate::results::{Candidate, SearchResultItem};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Where candidate text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Fetch each link and read the transcript body
    Transcript,
    /// Use the backend snippet as-is
    Snippet,
}

impl ExtractionMode {
    /// Transcript bodies are read exactly when the router used the
    /// specialized branch condition
    pub fn select(specialized: bool, rollcall: bool) -> Self {
        if specialized && rollcall {
            Self::Transcript
        } else {
            Self::Snippet
        }
    }
}

/// Builds candidates from search items
#[derive(Clone)]
pub struct CandidateExtractor {
    client: HttpClient,
    fetch_timeout: Duration,
}

impl CandidateExtractor {
    pub fn new(client: HttpClient, fetch_timeout: Duration) -> Self {
        Self {
            client,
            fetch_timeout,
        }
    }

    /// One candidate per usable item, in item order
    pub async fn extract(&self, items: &[SearchResultItem], mode: ExtractionMode) -> Vec<Candidate> {
        match mode {
            ExtractionMode::Snippet => snippet_candidates(items),
            ExtractionMode::Transcript => self.transcript_candidates(items).await,
        }
    }

    async fn transcript_candidates(&self, items: &[SearchResultItem]) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(items.len());
        for item in items {
            match fetch_transcript_text(&self.client, &item.link, self.fetch_timeout).await {
                Ok(text) => candidates.push(Candidate::new(item.link.clone(), text)),
                Err(e) => warn!("Skipping {}: {}", item.link, e),
            }
        }
        debug!("Extracted {} transcript candidates from {} links", candidates.len(), items.len());
        candidates
    }
}

/// Candidates from non-empty snippets
pub fn snippet_candidates(items: &[SearchResultItem]) -> Vec<Candidate> {
    items
        .iter()
        .filter(|item| !item.snippet.trim().is_empty())
        .map(|item| Candidate::new(item.link.clone(), item.snippet.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_mode_selection() {
        assert_eq!(ExtractionMode::select(true, true), ExtractionMode::Transcript);
        assert_eq!(ExtractionMode::select(true, false), ExtractionMode::Snippet);
        assert_eq!(ExtractionMode::select(false, true), ExtractionMode::Snippet);
    }

    #[test]
    fn test_snippet_candidates_skip_empty() {
        let items = vec![
            SearchResultItem::new("https://a", "said it"),
            SearchResultItem::link_only("https://b"),
            SearchResultItem::new("https://c", "  "),
        ];
        assert_eq!(
            snippet_candidates(&items),
            vec![Candidate::new("https://a", "said it")]
        );
    }

    #[tokio::test]
    async fn test_transcript_candidates_skip_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>We will win.</p>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let extractor = CandidateExtractor::new(HttpClient::new().unwrap(), Duration::from_secs(5));
        let ok = format!("{}/ok", server.uri());
        let items = vec![
            SearchResultItem::link_only(format!("{}/gone", server.uri())),
            SearchResultItem::link_only(ok.clone()),
        ];

        let candidates = extractor.extract(&items, ExtractionMode::Transcript).await;
        assert_eq!(candidates, vec![Candidate::new(ok, "We will win.")]);
    }
}
