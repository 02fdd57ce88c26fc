//! Best-span scoring of one candidate against a quotation

use super::embedder::{cosine_similarity, SharedEmbedder};
use super::sentences::split_sentences;
use async_trait::async_trait;
use std::sync::Arc;

/// Sentences of context around the best sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanWindow {
    pub num_before: usize,
    pub num_after: usize,
}

impl Default for SpanWindow {
    fn default() -> Self {
        Self {
            num_before: 1,
            num_after: 1,
        }
    }
}

/// Best-matching sentence of one text
#[derive(Debug, Clone, PartialEq)]
pub struct SpanMatch {
    pub best_sentence: String,
    pub span_text: String,
    pub score: f32,
}

#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    /// Best span of `text` for `quote`; `None` when the text has no
    /// sentences
    async fn best_span(
        &self,
        quote: &str,
        text: &str,
        window: SpanWindow,
    ) -> anyhow::Result<Option<SpanMatch>>;
}

/// Shared scorer handle
pub type SharedScorer = Arc<dyn SimilarityScorer>;

/// Cosine similarity between embedded quote and embedded sentences
pub struct EmbeddingScorer {
    embedder: SharedEmbedder,
}

impl EmbeddingScorer {
    pub fn new(embedder: SharedEmbedder) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl SimilarityScorer for EmbeddingScorer {
    async fn best_span(
        &self,
        quote: &str,
        text: &str,
        window: SpanWindow,
    ) -> anyhow::Result<Option<SpanMatch>> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Ok(None);
        }

        let mut inputs: Vec<&str> = Vec::with_capacity(sentences.len() + 1);
        inputs.push(quote);
        inputs.extend(sentences.iter().map(String::as_str));
        let embeddings = self.embedder.embed_batch(&inputs).await?;
        let Some((quote_vec, sentence_vecs)) = embeddings.split_first() else {
            return Ok(None);
        };

        // First maximum wins
        let mut best = (0, f32::NEG_INFINITY);
        for (i, vec) in sentence_vecs.iter().enumerate() {
            let score = cosine_similarity(quote_vec, vec);
            if score > best.1 {
                best = (i, score);
            }
        }
        let (index, score) = best;
        if !score.is_finite() {
            return Ok(None);
        }

        let lo = index.saturating_sub(window.num_before);
        let hi = (index + window.num_after).min(sentences.len() - 1);
        Ok(Some(SpanMatch {
            best_sentence: sentences[index].clone(),
            span_text: sentences[lo..=hi].join(" "),
            score,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::embedder::HashingEmbedder;

    fn scorer() -> EmbeddingScorer {
        EmbeddingScorer::new(Arc::new(HashingEmbedder::default()))
    }

    #[tokio::test]
    async fn test_best_sentence_with_window() {
        let text = "Thank you all. The weather is nice.\nWe will build the wall. It will be beautiful. Goodbye.";
        let span = scorer()
            .best_span("We are going to build the wall", text, SpanWindow::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(span.best_sentence, "We will build the wall.");
        assert_eq!(
            span.span_text,
            "The weather is nice. We will build the wall. It will be beautiful."
        );
        assert!(span.score > 0.5);
    }

    #[tokio::test]
    async fn test_window_clamps_at_edges() {
        let window = SpanWindow {
            num_before: 3,
            num_after: 0,
        };
        let span = scorer()
            .best_span("first sentence", "First sentence. Second one.", window)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(span.span_text, "First sentence.");
    }

    #[tokio::test]
    async fn test_empty_text_has_no_span() {
        assert!(scorer()
            .best_span("q", " \n ", SpanWindow::default())
            .await
            .unwrap()
            .is_none());
    }
}
