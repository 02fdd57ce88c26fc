//! Search query construction
//!
//! Turns extracted entities and keywords into a pair of search queries:
//! one in the article's language (`ko`) and one in the working language
//! (`en`). Two layouts are supported:
//! - rollcall mode: `speaker date keyword`, tuned for the date-indexed
//!   transcript backend
//! - default mode: speaker, locations, keywords and the translated quote
//!
//! Translation failures never abort construction; the untranslated token
//! is used instead.

mod date;
mod tokens;

pub use date::{format_long_date, parse_article_date, target_year};
pub use tokens::{dedupe_preserve, normalize_token};

use crate::config::QuerySettings;
use crate::extraction::{Extraction, LOCATION};
use crate::translate::{NameResolver, SharedTranslator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Bilingual search query; a field is `None` rather than empty
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub ko: Option<String>,
    pub en: Option<String>,
}

impl Query {
    /// Build from raw strings, mapping blank strings to `None`
    pub fn new(ko: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            ko: non_empty(ko.into()),
            en: non_empty(en.into()),
        }
    }

    /// The query to search with: English when present, else Korean
    pub fn preferred(&self) -> Option<&str> {
        self.en.as_deref().or(self.ko.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.ko.is_none() && self.en.is_none()
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Per-request query options
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Keywords included in the query
    pub top_k: usize,
    /// The quotation itself, in the article's language
    pub quote: Option<String>,
    /// Article date as written in the source
    pub article_date: Option<String>,
    /// Use the transcript-backend layout
    pub rollcall_mode: bool,
}

/// Builds bilingual queries from an extraction result
pub struct QueryBuilder {
    translator: SharedTranslator,
    names: Option<Arc<dyn NameResolver>>,
    settings: QuerySettings,
}

impl QueryBuilder {
    pub fn new(translator: SharedTranslator, settings: QuerySettings) -> Self {
        Self {
            translator,
            names: None,
            settings,
        }
    }

    /// Resolve speaker names through a dedicated resolver
    pub fn with_name_resolver(mut self, names: Arc<dyn NameResolver>) -> Self {
        self.names = Some(names);
        self
    }

    /// Build the query pair. Without a person entity both fields are `None`.
    pub async fn build(&self, extraction: &Extraction, options: &QueryOptions) -> Query {
        let Some(speaker_ko) = extraction.speaker() else {
            debug!("No PER entity; skipping query construction");
            return Query::default();
        };
        let speaker_en = self.resolve_speaker(speaker_ko).await;

        let keywords_ko: Vec<&str> = extraction
            .keywords
            .iter()
            .take(options.top_k)
            .map(|k| k.text.as_str())
            .collect();
        let keywords_ko = dedupe_preserve(&keywords_ko);

        let article_date = options
            .article_date
            .as_deref()
            .filter(|d| !d.trim().is_empty());
        match (article_date, options.rollcall_mode) {
            (Some(date), true) => {
                self.rollcall_query(speaker_ko, &speaker_en, date, &keywords_ko)
                    .await
            }
            _ => {
                self.default_query(speaker_ko, &speaker_en, extraction, &keywords_ko, options)
                    .await
            }
        }
    }

    /// `speaker date keyword` layout
    async fn rollcall_query(
        &self,
        speaker_ko: &str,
        speaker_en: &str,
        article_date: &str,
        keywords_ko: &[String],
    ) -> Query {
        let date_en = format_long_date(article_date);

        let keyword_ko = keywords_ko.first().map(String::as_str).unwrap_or_default();
        let keyword_en = if keyword_ko.is_empty() {
            String::new()
        } else {
            match self.translator.translate(keyword_ko).await {
                Ok(full) => full
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                Err(e) => {
                    warn!("Keyword translation failed, falling back to original: {} ({})", keyword_ko, e);
                    keyword_ko.to_string()
                }
            }
        };

        let en = join_non_empty(&[speaker_en, &date_en, &keyword_en]);
        let ko = join_non_empty(&[speaker_ko, article_date, keyword_ko]);
        Query::new(ko, en)
    }

    /// Speaker + locations + keywords + quote layout
    async fn default_query(
        &self,
        speaker_ko: &str,
        speaker_en: &str,
        extraction: &Extraction,
        keywords_ko: &[String],
        options: &QueryOptions,
    ) -> Query {
        let locations: Vec<&str> = extraction
            .of_type(LOCATION)
            .iter()
            .take(self.settings.max_locations)
            .map(String::as_str)
            .collect();
        let locations_ko = dedupe_preserve(&locations);

        let mut phrases_en = vec![speaker_en.to_string()];
        for location in &locations_ko {
            match self.translator.translate(location).await {
                Ok(full) => {
                    let first = full.split(',').next().unwrap_or_default();
                    let short = first_words(first, self.settings.location_words);
                    if !short.is_empty() {
                        phrases_en.push(short);
                    }
                }
                Err(e) => {
                    warn!("Location translation failed, falling back to original: {} ({})", location, e);
                    phrases_en.push(location.clone());
                }
            }
        }
        for keyword in keywords_ko {
            match self.translator.translate(keyword).await {
                Ok(full) => {
                    let short = first_words(&full, self.settings.keyword_words);
                    if !short.is_empty() {
                        phrases_en.push(short);
                    }
                }
                Err(e) => {
                    warn!("Keyword translation failed, falling back to original: {} ({})", keyword, e);
                    phrases_en.push(keyword.clone());
                }
            }
        }

        let quote = options.quote.as_deref().filter(|q| !q.trim().is_empty());
        let quote_en = match quote {
            Some(q) => match self.translator.translate(q).await {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("Quote translation failed; query omits it ({})", e);
                    None
                }
            },
            None => None,
        };

        let mut tokens_en = dedupe_preserve(&phrases_en);
        tokens_en.extend(quote_en);
        let en = tokens_en.join(" ");

        let mut parts_ko = vec![speaker_ko.to_string()];
        parts_ko.push(locations_ko.join(" "));
        parts_ko.push(keywords_ko.join(" "));
        if let Some(q) = quote {
            parts_ko.push(q.to_string());
        }
        let words_ko: Vec<&str> = parts_ko.iter().flat_map(|p| p.split_whitespace()).collect();
        let ko = dedupe_preserve(&words_ko).join(" ");

        Query::new(ko, en)
    }

    /// English form of the speaker: resolver, then translation, then as-is
    async fn resolve_speaker(&self, speaker_ko: &str) -> String {
        if self.settings.use_name_resolution {
            if let Some(names) = &self.names {
                match names.resolve(speaker_ko).await {
                    Ok(name) => return name,
                    Err(e) => debug!("Name resolution failed for {}: {}", speaker_ko, e),
                }
            }
        }
        match self.translator.translate(speaker_ko).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Speaker translation failed, using original: {} ({})", speaker_ko, e);
                speaker_ko.to_string()
            }
        }
    }
}

fn first_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{Entity, Keyword, PERSON};
    use crate::translate::{DictionaryTranslator, TranslateError};
    use async_trait::async_trait;

    fn builder(dict: DictionaryTranslator) -> QueryBuilder {
        QueryBuilder::new(Arc::new(dict), QuerySettings::default())
    }

    fn extraction(entities: Vec<Entity>, keywords: &[(&str, f32)]) -> Extraction {
        Extraction::from_entities(
            entities,
            keywords.iter().map(|(t, s)| Keyword::new(*t, *s)).collect(),
        )
    }

    struct FixedResolver(&'static str);

    #[async_trait]
    impl NameResolver for FixedResolver {
        async fn resolve(&self, _name: &str) -> Result<String, TranslateError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl NameResolver for FailingResolver {
        async fn resolve(&self, name: &str) -> Result<String, TranslateError> {
            Err(TranslateError::Unavailable(name.to_string()))
        }
    }

    #[tokio::test]
    async fn test_no_speaker_yields_null_query() {
        let ex = extraction(vec![Entity::new(LOCATION, "서울")], &[("회담", 0.9)]);
        let query = builder(DictionaryTranslator::new())
            .build(&ex, &QueryOptions::default())
            .await;
        assert_eq!(query, Query::default());
        assert!(query.preferred().is_none());
    }

    #[tokio::test]
    async fn test_rollcall_query() {
        let dict = DictionaryTranslator::new()
            .entry("김철수", "Kim Cheol-su")
            .entry("회담", "summit meeting");
        let ex = extraction(
            vec![Entity::new(PERSON, "김철수"), Entity::new(LOCATION, "평양")],
            &[("회담", 0.9), ("협상", 0.5)],
        );
        let options = QueryOptions {
            top_k: 3,
            quote: Some("회담은 계속된다".to_string()),
            article_date: Some("2024-11-29".to_string()),
            rollcall_mode: true,
        };

        let query = builder(dict).build(&ex, &options).await;
        assert_eq!(query.en.as_deref(), Some("Kim Cheol-su November 29 2024 summit"));
        assert_eq!(query.ko.as_deref(), Some("김철수 2024-11-29 회담"));
    }

    #[tokio::test]
    async fn test_rollcall_unparseable_date_and_failed_keyword() {
        let dict = DictionaryTranslator::new().entry("김철수", "Kim Cheol-su");
        let ex = extraction(vec![Entity::new(PERSON, "김철수")], &[("회담", 0.9)]);
        let options = QueryOptions {
            top_k: 3,
            article_date: Some("지난주".to_string()),
            rollcall_mode: true,
            ..Default::default()
        };

        let query = builder(dict).build(&ex, &options).await;
        assert_eq!(query.en.as_deref(), Some("Kim Cheol-su 지난주 회담"));
    }

    #[tokio::test]
    async fn test_rollcall_without_date_uses_default_layout() {
        let dict = DictionaryTranslator::new()
            .entry("김철수", "Kim Cheol-su")
            .entry("회담", "summit meeting");
        let ex = extraction(vec![Entity::new(PERSON, "김철수")], &[("회담", 0.9)]);
        let options = QueryOptions {
            top_k: 3,
            rollcall_mode: true,
            ..Default::default()
        };

        let query = builder(dict).build(&ex, &options).await;
        assert_eq!(query.en.as_deref(), Some("Kim Cheol-su summit meeting"));
    }

    #[tokio::test]
    async fn test_rollcall_blank_date_uses_default_layout() {
        let dict = DictionaryTranslator::new()
            .entry("김철수", "Kim Cheol-su")
            .entry("회담", "summit meeting");
        let ex = extraction(vec![Entity::new(PERSON, "김철수")], &[("회담", 0.9)]);
        let options = QueryOptions {
            top_k: 3,
            article_date: Some("  ".to_string()),
            rollcall_mode: true,
            ..Default::default()
        };

        let query = builder(dict).build(&ex, &options).await;
        assert_eq!(query.en.as_deref(), Some("Kim Cheol-su summit meeting"));
        assert_eq!(query.ko.as_deref(), Some("김철수 회담"));
    }

    #[tokio::test]
    async fn test_default_query() {
        let dict = DictionaryTranslator::new()
            .entry("문재인", "Moon Jae-in")
            .entry("평양", "Pyongyang, North Korea")
            .entry("서울", "Seoul Special City Area")
            .entry("비핵화", "denuclearization")
            .entry("한반도", "the Korean Peninsula region")
            .entry("한반도 비핵화는 시급하다", "Denuclearization of the Korean Peninsula is urgent.");
        let ex = extraction(
            vec![
                Entity::new(PERSON, "문재인"),
                Entity::new(LOCATION, "평양"),
                Entity::new(LOCATION, "서울"),
                Entity::new(LOCATION, "부산"),
            ],
            &[("비핵화", 0.9), ("한반도", 0.7), ("평화", 0.5), ("통일", 0.1)],
        );
        let options = QueryOptions {
            top_k: 2,
            quote: Some("한반도 비핵화는 시급하다".to_string()),
            ..Default::default()
        };

        let query = builder(dict).build(&ex, &options).await;
        assert_eq!(
            query.en.as_deref(),
            Some("Moon Jae-in Pyongyang Seoul Special denuclearization the Korean Peninsula Denuclearization of the Korean Peninsula is urgent.")
        );
        assert_eq!(
            query.ko.as_deref(),
            Some("문재인 평양 서울 비핵화 한반도 비핵화는 시급하다")
        );
    }

    #[tokio::test]
    async fn test_default_query_degrades_on_translation_failure() {
        let ex = extraction(
            vec![Entity::new(PERSON, "문재인"), Entity::new(LOCATION, "평양")],
            &[("비핵화", 0.9), ("비핵화!", 0.8)],
        );
        let options = QueryOptions {
            top_k: 3,
            quote: Some("시급하다".to_string()),
            ..Default::default()
        };

        let query = builder(DictionaryTranslator::new()).build(&ex, &options).await;
        assert_eq!(query.en.as_deref(), Some("문재인 평양 비핵화"));
        assert_eq!(query.ko.as_deref(), Some("문재인 평양 비핵화 시급하다"));
    }

    #[tokio::test]
    async fn test_name_resolver_preferred_then_translation() {
        let dict = DictionaryTranslator::new().entry("문재인", "Moon Jae In");
        let ex = extraction(vec![Entity::new(PERSON, "문재인")], &[]);

        let resolved = builder(dict.clone())
            .with_name_resolver(Arc::new(FixedResolver("Moon Jae-in")))
            .build(&ex, &QueryOptions::default())
            .await;
        assert_eq!(resolved.en.as_deref(), Some("Moon Jae-in"));

        let fallback = builder(dict)
            .with_name_resolver(Arc::new(FailingResolver))
            .build(&ex, &QueryOptions::default())
            .await;
        assert_eq!(fallback.en.as_deref(), Some("Moon Jae In"));
    }

    #[test]
    fn test_query_preferred() {
        assert_eq!(Query::new("한", "en").preferred(), Some("en"));
        assert_eq!(Query::new("한", " ").preferred(), Some("한"));
        assert!(Query::new("", "").is_empty());
    }
}
