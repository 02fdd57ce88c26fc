//! Batch dataset builder
//!
//! Reads an article table, extracts every quotation, resolves each one
//! through the pipeline over a bounded worker pool and writes one output
//! row per quotation.

mod quotes;

pub use quotes::extract_quotes;

use crate::config::BatchSettings;
use crate::pipeline::{Pipeline, PipelineError, PipelineResult, ResolveRequest};
use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Batch run options
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub text_col: String,
    pub date_col: String,
    pub rollcall: bool,
    pub workers: usize,
    pub top_matches: usize,
    pub min_quote_chars: usize,
}

impl From<&BatchSettings> for BatchOptions {
    fn from(settings: &BatchSettings) -> Self {
        Self {
            text_col: settings.text_col.clone(),
            date_col: settings.date_col.clone(),
            rollcall: settings.rollcall,
            workers: settings.workers,
            top_matches: settings.top_matches,
            min_quote_chars: settings.min_quote_chars,
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&BatchSettings::default())
    }
}

/// Input article row
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub text: String,
    pub date: Option<String>,
}

/// Output row, one per quotation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatasetRecord {
    pub id: u64,
    pub original: String,
    pub original_en: Option<String>,
    pub source_quote_en: Option<String>,
    pub article_text: Option<String>,
    pub similarity: Option<f32>,
    pub source_url: Option<String>,
    pub error: Option<String>,
}

impl DatasetRecord {
    /// Row for one resolved (or failed) quotation
    pub fn from_outcome(
        id: u64,
        original: String,
        original_en: Option<String>,
        outcome: Result<PipelineResult, PipelineError>,
    ) -> Self {
        match outcome {
            Ok(result) => {
                let best = result.best_span;
                Self {
                    id,
                    original,
                    original_en,
                    source_quote_en: best.as_ref().map(|s| s.best_sentence.clone()),
                    article_text: best.as_ref().map(|s| s.span_text.clone()),
                    similarity: best.as_ref().map(|s| s.best_score),
                    source_url: best.map(|s| s.url),
                    error: None,
                }
            }
            Err(e) => Self {
                id,
                original,
                original_en,
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }
}

/// Read articles from a CSV file, skipping rows with empty text
pub fn read_articles(path: &Path, text_col: &str, date_col: &str) -> Result<Vec<Article>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let text_idx = headers
        .iter()
        .position(|h| h == text_col)
        .ok_or_else(|| anyhow!("Missing text column: {}", text_col))?;
    let date_idx = headers.iter().position(|h| h == date_col);
    if date_idx.is_none() {
        warn!("Date column {} not found; articles are undated", date_col);
    }

    let mut articles = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read row {}", idx + 1))?;
        let text = row.get(text_idx).unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        let date = date_idx
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        articles.push(Article {
            text: text.to_string(),
            date,
        });
    }
    Ok(articles)
}

/// Write records as CSV
pub fn write_records(path: &Path, records: &[DatasetRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Resolve every quotation of every article; rows are ordered by id
pub async fn build_records(
    pipeline: &Pipeline,
    articles: &[Article],
    options: &BatchOptions,
) -> Vec<DatasetRecord> {
    let jobs: Vec<(u64, &Article, String)> = articles
        .iter()
        .flat_map(|article| {
            extract_quotes(&article.text, options.min_quote_chars)
                .into_iter()
                .map(move |quote| (article, quote))
        })
        .enumerate()
        .map(|(i, (article, quote))| (i as u64 + 1, article, quote))
        .collect();
    info!("Resolving {} quotes from {} articles", jobs.len(), articles.len());

    let mut records: Vec<DatasetRecord> = stream::iter(jobs)
        .map(|(id, article, quote)| async move {
            let original_en = match pipeline.translator().translate(&quote).await {
                Ok(text) if !text.trim().is_empty() => Some(text),
                _ => None,
            };

            let mut request = ResolveRequest::from_text(article.text.clone())
                .with_quote(quote.clone())
                .with_rollcall(options.rollcall)
                .with_search(true)
                .with_top_matches(options.top_matches);
            request.date = article.date.clone();

            let outcome = pipeline.resolve(&request).await;
            if let Err(e) = &outcome {
                warn!("Quote {} failed: {}", id, e);
            }
            DatasetRecord::from_outcome(id, quote, original_en, outcome)
        })
        .buffer_unordered(options.workers.max(1))
        .collect()
        .await;

    records.sort_by_key(|r| r.id);
    records
}

/// Read `input`, resolve all quotations and write the dataset to `output`
pub async fn build_dataset(
    pipeline: &Pipeline,
    input: &Path,
    output: &Path,
    options: &BatchOptions,
) -> Result<Vec<DatasetRecord>> {
    let articles = read_articles(input, &options.text_col, &options.date_col)?;
    let records = build_records(pipeline, &articles, options).await;
    write_records(output, &records)?;
    info!(
        "Wrote {} records ({} matched) to {}",
        records.len(),
        records.iter().filter(|r| r.source_url.is_some()).count(),
        output.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, EngineRole, Settings};
    use crate::engines::google_cse::GoogleCse;
    use crate::engines::EngineRegistry;
    use crate::extraction::{Entity, Extraction, StaticExtractor, PERSON};
    use crate::network::HttpClient;
    use crate::results::SpanResult;
    use crate::translate::DictionaryTranslator;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Arc;
    use uuid::Uuid;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}.csv", name, Uuid::new_v4()))
    }

    fn pipeline(server: &MockServer) -> Pipeline {
        let mut settings = Settings::default();
        settings.query.use_name_resolution = false;

        let mut registry = EngineRegistry::new();
        registry.register(
            Arc::new(GoogleCse::new("k", "c").with_base_url(server.uri())),
            EngineConfig {
                name: "google".to_string(),
                engine: "google_cse".to_string(),
                role: Some(EngineRole::General),
                ..Default::default()
            },
        );

        let translator = DictionaryTranslator::new()
            .entry("문재인", "Moon Jae-in")
            .entry("비핵화는 시급하다", "Denuclearization is urgent.");
        Pipeline::builder(&settings, HttpClient::new().unwrap())
            .with_extractor(Arc::new(StaticExtractor::new(Extraction::from_entities(
                vec![Entity::new(PERSON, "문재인")],
                vec![],
            ))))
            .with_translator(Arc::new(translator))
            .with_registry(registry)
            .build()
    }

    #[test]
    fn test_read_articles_skips_empty_text() {
        let path = temp_path("articles");
        std::fs::write(&path, "content,date\n\"본문 하나\",2024-11-29\n\"  \",2024-11-30\n본문 둘,\n").unwrap();

        let articles = read_articles(&path, "content", "date").unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(
            articles,
            vec![
                Article {
                    text: "본문 하나".to_string(),
                    date: Some("2024-11-29".to_string()),
                },
                Article {
                    text: "본문 둘".to_string(),
                    date: None,
                },
            ]
        );
    }

    #[test]
    fn test_missing_text_column() {
        let path = temp_path("articles");
        std::fs::write(&path, "body,date\nx,y\n").unwrap();
        let result = read_articles(&path, "content", "date");
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_from_error() {
        let record = DatasetRecord::from_outcome(
            3,
            "인용".to_string(),
            Some("quote".to_string()),
            Err(PipelineError::InputMissing),
        );
        assert_eq!(record.id, 3);
        assert!(record.error.is_some());
        assert!(record.source_quote_en.is_none());
        assert!(record.similarity.is_none());
    }

    #[test]
    fn test_record_from_result() {
        let result = PipelineResult {
            best_span: Some(SpanResult {
                url: "https://a".to_string(),
                best_sentence: "s".to_string(),
                span_text: "p s n".to_string(),
                best_score: 0.7,
            }),
            ..Default::default()
        };
        let record = DatasetRecord::from_outcome(1, "인용".to_string(), None, Ok(result));
        assert_eq!(record.source_url.as_deref(), Some("https://a"));
        assert_eq!(record.article_text.as_deref(), Some("p s n"));
        assert_eq!(record.similarity, Some(0.7));
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn test_build_dataset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "link": "https://news.example/moon",
                    "snippet": "Moon Jae-in said denuclearization is urgent."
                }]
            })))
            .mount(&server)
            .await;

        let input = temp_path("in");
        let output = temp_path("out");
        std::fs::write(
            &input,
            "content,date\n\
             \"문재인은 \"\"비핵화는 시급하다\"\"고 말했다. \"\"평화가 먼저다\"\"\",2024-11-29\n\
             ,2024-11-30\n",
        )
        .unwrap();

        let options = BatchOptions {
            workers: 2,
            ..Default::default()
        };
        let records = build_dataset(&pipeline(&server), &input, &output, &options)
            .await
            .unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].original, "비핵화는 시급하다");
        assert_eq!(records[0].original_en.as_deref(), Some("Denuclearization is urgent."));
        assert_eq!(
            records[0].source_quote_en.as_deref(),
            Some("Moon Jae-in said denuclearization is urgent.")
        );
        assert_eq!(records[1].original, "평화가 먼저다");
        assert!(records[1].original_en.is_none());
        assert!(written.starts_with(
            "id,original,original_en,source_quote_en,article_text,similarity,source_url,error"
        ));
    }
}
