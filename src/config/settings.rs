//! Settings structures for quote-origin configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub query: QuerySettings,
    pub search: SearchSettings,
    pub context: ContextSettings,
    pub translation: TranslationSettings,
    pub names: NameSettings,
    pub ranking: RankingSettings,
    pub extraction: ExtractionSettings,
    pub outgoing: OutgoingSettings,
    pub batch: BatchSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (QUOTE_ORIGIN_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("QUOTE_ORIGIN_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("QUOTE_ORIGIN_GOOGLE_API_KEY") {
            for engine in self.search.engines.iter_mut() {
                if engine.engine == "google_cse" {
                    engine.api_key = Some(val.clone());
                }
            }
        }
        if let Ok(val) = std::env::var("QUOTE_ORIGIN_GOOGLE_CSE_ID") {
            for engine in self.search.engines.iter_mut() {
                if engine.engine == "google_cse" {
                    engine
                        .extra
                        .insert("cx".to_string(), serde_yaml::Value::String(val.clone()));
                }
            }
        }
        if let Ok(val) = std::env::var("QUOTE_ORIGIN_TRANSLATE_URL") {
            self.translation.api_url = Some(val);
        }
        if let Ok(val) = std::env::var("QUOTE_ORIGIN_TRANSLATE_API_KEY") {
            self.translation.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("QUOTE_ORIGIN_EMBEDDING_API_KEY") {
            self.ranking.embedding_api_key = Some(val);
        }
    }

    /// Get engine config by name
    pub fn get_engine(&self, name: &str) -> Option<&EngineConfig> {
        self.search.engines.iter().find(|e| e.name == name)
    }

    /// Get all enabled engines
    pub fn enabled_engines(&self) -> Vec<&EngineConfig> {
        self.search.engines.iter().filter(|e| !e.disabled).collect()
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Query construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Number of keywords to extract from the article
    pub top_n: usize,
    /// Number of keywords that make it into the query
    pub top_k: usize,
    /// Resolve the speaker's English name through the name resolver
    pub use_name_resolution: bool,
    /// Maximum number of location entities in the query
    pub max_locations: usize,
    /// Words kept from each translated location
    pub location_words: usize,
    /// Words kept from each translated keyword
    pub keyword_words: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            top_n: 15,
            top_k: 3,
            use_name_resolution: true,
            max_locations: 2,
            location_words: 2,
            keyword_words: 3,
        }
    }
}

/// Search routing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Links requested from the specialized backend
    pub specialized_count: usize,
    /// Results requested from the general backend after a specialized miss
    pub fallback_count: usize,
    /// Results requested from the general backend on the direct branch
    pub general_count: usize,
    /// Backend configurations
    pub engines: Vec<EngineConfig>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            specialized_count: 5,
            fallback_count: 20,
            general_count: 5,
            engines: default_engines(),
        }
    }
}

/// Role a backend plays in routing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EngineRole {
    /// Dedicated, higher-precision backend for a specific subject
    Specialized,
    /// Baseline web search
    #[default]
    General,
}

/// Individual backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine name (unique identifier)
    pub name: String,
    /// Engine module to use
    pub engine: String,
    /// Routing role; the engine's own role when unset
    pub role: Option<EngineRole>,
    /// Whether engine is disabled
    pub disabled: bool,
    /// Custom timeout for this engine
    pub timeout: Option<f64>,
    /// API key if required
    pub api_key: Option<String>,
    /// Additional engine-specific settings
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl EngineConfig {
    /// Read a string-valued extra setting
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            engine: String::new(),
            role: None,
            disabled: false,
            timeout: None,
            api_key: None,
            extra: HashMap::new(),
        }
    }
}

/// Specialized-context detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// Surface forms that identify the specialized subject
    pub subject_aliases: Vec<String>,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            subject_aliases: vec![
                "트럼프".to_string(),
                "도널드 트럼프".to_string(),
                "Trump".to_string(),
            ],
        }
    }
}

/// Machine translation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// LibreTranslate-compatible endpoint (none = translation unavailable)
    pub api_url: Option<String>,
    /// API key for the endpoint
    pub api_key: Option<String>,
    /// Source language code
    pub source: String,
    /// Target (working) language code
    pub target: String,
    /// Cache entry lifetime in seconds
    pub cache_ttl: u64,
    /// Maximum cached translations
    pub cache_capacity: u64,
    /// Fixed translations consulted before the endpoint
    pub glossary: HashMap<String, String>,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            source: "ko".to_string(),
            target: "en".to_string(),
            cache_ttl: 3600,
            cache_capacity: 10_000,
            glossary: HashMap::new(),
        }
    }
}

/// Person-name resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NameSettings {
    /// Wikidata API endpoint
    pub wikidata_url: String,
    /// Language of the names being looked up
    pub language: String,
}

impl Default for NameSettings {
    fn default() -> Self {
        Self {
            wikidata_url: "https://www.wikidata.org/w/api.php".to_string(),
            language: "ko".to_string(),
        }
    }
}

/// Embedding backend used by the span scorer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    #[default]
    Hashing,
    OpenAi,
}

/// Span ranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Minimum similarity a span must reach to be reported
    pub min_score: f32,
    /// Sentences of context before the best sentence
    pub num_before: usize,
    /// Sentences of context after the best sentence
    pub num_after: usize,
    /// Number of spans returned
    pub top_matches: usize,
    /// Concurrent scoring calls
    pub workers: usize,
    /// Embedding backend
    pub embedder: EmbedderKind,
    /// Embeddings endpoint base URL
    pub embedding_url: String,
    /// Embedding model name
    pub embedding_model: String,
    /// API key for the embeddings endpoint
    pub embedding_api_key: Option<String>,
    /// Vector size of the hashing embedder
    pub hashing_dimension: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            min_score: 0.1,
            num_before: 1,
            num_after: 1,
            top_matches: 1,
            workers: 4,
            embedder: EmbedderKind::Hashing,
            embedding_url: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_api_key: None,
            hashing_dimension: 1024,
        }
    }
}

/// Lexicon-based entity extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Known person names
    pub people: Vec<String>,
    /// Known location names
    pub locations: Vec<String>,
    /// Shortest token counted as a keyword
    pub min_keyword_chars: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            people: vec![],
            locations: vec![],
            min_keyword_chars: 2,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Timeout for transcript page downloads
    pub fetch_timeout: f64,
    /// Maximum request timeout
    pub max_request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            fetch_timeout: 15.0,
            max_request_timeout: 30.0,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Batch dataset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Column holding article text
    pub text_col: String,
    /// Column holding the article date
    pub date_col: String,
    /// Quotes resolved concurrently
    pub workers: usize,
    /// Allow the specialized backend when the context matches
    pub rollcall: bool,
    /// Spans kept per quote
    pub top_matches: usize,
    /// Shortest quotation considered
    pub min_quote_chars: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            text_col: "content".to_string(),
            date_col: "date".to_string(),
            workers: 4,
            rollcall: true,
            top_matches: 2,
            min_quote_chars: 5,
        }
    }
}

/// Default backend configurations
fn default_engines() -> Vec<EngineConfig> {
    vec![
        EngineConfig {
            name: "factbase".to_string(),
            engine: "factbase".to_string(),
            ..Default::default()
        },
        EngineConfig {
            name: "google".to_string(),
            engine: "google_cse".to_string(),
            ..Default::default()
        },
    ]
}
