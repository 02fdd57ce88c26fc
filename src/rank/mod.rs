//! Span ranking
//!
//! Scores every candidate independently against the quotation, keeps each
//! candidate's best span when it clears the minimum score, and returns the
//! top `k` spans in descending score order.

mod embedder;
mod scorer;
mod sentences;

pub use embedder::{cosine_similarity, Embedder, Embedding, HashingEmbedder, OpenAiEmbedder, SharedEmbedder};
pub use scorer::{EmbeddingScorer, SharedScorer, SimilarityScorer, SpanMatch, SpanWindow};
pub use sentences::split_sentences;

use crate::config::{EmbedderKind, RankingSettings};
use crate::network::HttpClient;
use crate::results::{Candidate, SpanResult};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Ranking parameters shared by every request
#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    pub window: SpanWindow,
    pub min_score: f32,
    /// Concurrent scoring calls
    pub workers: usize,
}

impl From<&RankingSettings> for RankOptions {
    fn from(settings: &RankingSettings) -> Self {
        Self {
            window: SpanWindow {
                num_before: settings.num_before,
                num_after: settings.num_after,
            },
            min_score: settings.min_score,
            workers: settings.workers.max(1),
        }
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self::from(&RankingSettings::default())
    }
}

/// Scores candidates over a bounded worker pool
#[derive(Clone)]
pub struct SpanRanker {
    scorer: SharedScorer,
    options: RankOptions,
}

impl SpanRanker {
    pub fn new(scorer: SharedScorer, options: RankOptions) -> Self {
        Self { scorer, options }
    }

    /// Ranker backed by the embedder named in the settings
    pub fn from_settings(settings: &RankingSettings, client: HttpClient) -> Self {
        let embedder: SharedEmbedder = match (settings.embedder, &settings.embedding_api_key) {
            (EmbedderKind::OpenAi, Some(key)) => Arc::new(
                OpenAiEmbedder::new(client, settings.embedding_url.clone(), key.clone())
                    .with_model(settings.embedding_model.clone(), 1536),
            ),
            (EmbedderKind::OpenAi, None) => {
                warn!("openai embedder selected without an API key; using hashing embedder");
                Arc::new(HashingEmbedder::new(settings.hashing_dimension))
            }
            (EmbedderKind::Hashing, _) => Arc::new(HashingEmbedder::new(settings.hashing_dimension)),
        };
        Self::new(Arc::new(EmbeddingScorer::new(embedder)), RankOptions::from(settings))
    }

    /// Top `k` spans across all candidates, at most one per candidate
    pub async fn rank(&self, quote: &str, candidates: &[Candidate], k: usize) -> Vec<SpanResult> {
        if k == 0 || candidates.is_empty() || quote.trim().is_empty() {
            return Vec::new();
        }

        let window = self.options.window;
        let scored: Vec<Option<SpanResult>> = stream::iter(candidates)
            .map(|candidate| {
                let scorer = Arc::clone(&self.scorer);
                async move {
                    match scorer.best_span(quote, &candidate.text, window).await {
                        Ok(Some(m)) => Some(SpanResult {
                            url: candidate.url.clone(),
                            best_sentence: m.best_sentence,
                            span_text: m.span_text,
                            best_score: m.score,
                        }),
                        Ok(None) => None,
                        Err(e) => {
                            warn!("Scoring failed for {}: {}", candidate.url, e);
                            None
                        }
                    }
                }
            })
            .buffered(self.options.workers.max(1))
            .collect()
            .await;

        let ranked = select_top_k(scored.into_iter().flatten().collect(), k, self.options.min_score);
        debug!(
            "Ranked {} candidates into {} spans",
            candidates.len(),
            ranked.len()
        );
        ranked
    }
}

/// Keep spans at or above `min_score`, order by descending score (input
/// order on ties) and truncate to `k`
pub fn select_top_k(spans: Vec<SpanResult>, k: usize, min_score: f32) -> Vec<SpanResult> {
    let mut kept: Vec<SpanResult> = spans
        .into_iter()
        .filter(|s| s.best_score.is_finite() && s.best_score >= min_score)
        .collect();
    kept.sort_by(|a, b| b.best_score.total_cmp(&a.best_score));
    kept.truncate(k);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn span(url: &str, score: f32) -> SpanResult {
        SpanResult {
            url: url.to_string(),
            best_sentence: String::new(),
            span_text: String::new(),
            best_score: score,
        }
    }

    /// Scores each candidate by the number parsed from its text
    struct NumericScorer;

    #[async_trait]
    impl SimilarityScorer for NumericScorer {
        async fn best_span(
            &self,
            _quote: &str,
            text: &str,
            _window: SpanWindow,
        ) -> anyhow::Result<Option<SpanMatch>> {
            if text == "fail" {
                anyhow::bail!("scorer unavailable");
            }
            let score: f32 = text.parse()?;
            Ok(Some(SpanMatch {
                best_sentence: text.to_string(),
                span_text: text.to_string(),
                score,
            }))
        }
    }

    fn ranker(min_score: f32) -> SpanRanker {
        SpanRanker::new(
            Arc::new(NumericScorer),
            RankOptions {
                window: SpanWindow::default(),
                min_score,
                workers: 3,
            },
        )
    }

    #[test]
    fn test_select_top_k_ties_keep_input_order() {
        let spans = vec![span("a", 0.5), span("b", 0.9), span("c", 0.5), span("d", 0.05)];
        let top = select_top_k(spans, 3, 0.1);
        let urls: Vec<_> = top.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_select_top_k_drops_nan() {
        let top = select_top_k(vec![span("a", f32::NAN), span("b", 0.2)], 5, 0.0);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].url, "b");
    }

    #[test]
    fn test_top_k_invariant_random_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(0..30);
            let k = rng.gen_range(0..10);
            let min_score = rng.gen_range(0.0..0.5f32);
            let spans: Vec<_> = (0..n)
                .map(|i| span(&i.to_string(), (rng.gen_range(0..20) as f32) / 20.0))
                .collect();
            let eligible = spans.iter().filter(|s| s.best_score >= min_score).count();

            let top = select_top_k(spans, k, min_score);
            assert_eq!(top.len(), eligible.min(k));
            assert!(top.iter().all(|s| s.best_score >= min_score));
            for pair in top.windows(2) {
                assert!(pair[0].best_score >= pair[1].best_score);
                if pair[0].best_score == pair[1].best_score {
                    let a: usize = pair[0].url.parse().unwrap();
                    let b: usize = pair[1].url.parse().unwrap();
                    assert!(a < b);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_rank_scores_each_candidate() {
        let candidates = vec![
            Candidate::new("https://a", "0.3"),
            Candidate::new("https://b", "fail"),
            Candidate::new("https://c", "0.8"),
            Candidate::new("https://d", "0.05"),
            Candidate::new("https://e", "0.6"),
        ];

        let top = ranker(0.1).rank("quote", &candidates, 2).await;
        let urls: Vec<_> = top.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://c", "https://e"]);
    }

    #[tokio::test]
    async fn test_rank_below_threshold_is_empty() {
        let candidates = vec![Candidate::new("https://a", "0.05")];
        assert!(ranker(0.1).rank("quote", &candidates, 3).await.is_empty());
        assert!(ranker(0.0).rank("quote", &candidates, 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_from_settings_defaults_to_hashing() {
        let ranker = SpanRanker::from_settings(&RankingSettings::default(), HttpClient::new().unwrap());
        let candidates = vec![
            Candidate::new("https://a", "Stocks fell today."),
            Candidate::new("https://b", "He said we will build the wall. Then he left."),
        ];
        let top = ranker.rank("We will build the wall", &candidates, 1).await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].url, "https://b");
        assert_eq!(top[0].best_sentence, "He said we will build the wall.");
    }
}
