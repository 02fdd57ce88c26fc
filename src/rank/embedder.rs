//! Text embedders and vector similarity

use crate::engines::EngineRequest;
use crate::network::{accept_json, HttpClient};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

/// Vector embedding
pub type Embedding = Vec<f32>;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed several texts, preserving order
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Embedding dimension
    fn dimension(&self) -> usize;
}

/// Shared embedder handle
pub type SharedEmbedder = Arc<dyn Embedder>;

/// Cosine similarity; zero when either vector has no magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Offline embedder: lowercased word counts hashed into a fixed number of
/// buckets, L2-normalized
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, word: &str) -> usize {
        // FNV-1a
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in word.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        (hash % self.dimension as u64) as usize
    }

    fn vectorize(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        for word in WORD_RE.find_iter(&lowered) {
            vector[self.bucket(word.as_str())] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.vectorize(text))
    }

    fn model_name(&self) -> &str {
        "hashing-tf"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// OpenAI-compatible `/embeddings` client
pub struct OpenAiEmbedder {
    client: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl OpenAiEmbedder {
    pub fn new(client: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    /// Use a specific model
    pub fn with_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.model = model.into();
        self.dimension = dimension;
        self
    }

    async fn request(&self, input: serde_json::Value) -> Result<Vec<Embedding>> {
        let request = EngineRequest::post(format!("{}/embeddings", self.base_url))
            .header("Accept", accept_json())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(serde_json::json!({
                "model": self.model,
                "input": input,
            }));

        let response = self.client.execute(request).await?;
        if !response.is_success() {
            return Err(anyhow!("embeddings request failed: HTTP {}", response.status));
        }

        let mut payload: EmbeddingResponse = response.json()?;
        payload.data.sort_by_key(|d| d.index);
        Ok(payload.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.request(serde_json::json!(text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No embedding in response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.request(serde_json::json!(texts)).await?;
        if embeddings.len() != texts.len() {
            return Err(anyhow!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            ));
        }
        Ok(embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_hashing_embedder_overlap() {
        let embedder = HashingEmbedder::default();
        let quote = embedder
            .embed("Denuclearization of the Korean Peninsula is urgent.")
            .await
            .unwrap();
        let close = embedder
            .embed("Moon Jae-in said denuclearization of the peninsula is urgent.")
            .await
            .unwrap();
        let far = embedder.embed("Stocks rallied on Friday").await.unwrap();

        assert_eq!(quote.len(), 1024);
        assert!(cosine_similarity(&quote, &close) > 0.5);
        assert!(cosine_similarity(&quote, &close) > cosine_similarity(&quote, &far));
    }

    #[tokio::test]
    async fn test_hashing_embedder_is_case_insensitive() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed("We WILL win").await.unwrap();
        let b = embedder.embed("we will win!").await.unwrap();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert!(embedder.embed("...").await.unwrap().iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_openai_embedder_batch_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]
            })))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedder::new(
            HttpClient::new().unwrap(),
            format!("{}/v1/", server.uri()),
            "sk-test",
        );
        let out = embedder.embed_batch(&["a", "b"]).await.unwrap();
        assert_eq!(out, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_openai_embedder_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let embedder = OpenAiEmbedder::new(HttpClient::new().unwrap(), server.uri(), "bad");
        assert!(embedder.embed("a").await.is_err());
    }
}
