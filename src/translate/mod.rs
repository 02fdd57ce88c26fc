//! Machine translation and person-name resolution
//!
//! Translation is an external collaborator. Every call returns an explicit
//! `Result` so callers decide how to degrade when it is unavailable.

mod cache;
mod libre;
mod names;

pub use cache::CachedTranslator;
pub use libre::LibreTranslate;
pub use names::{NameResolver, WikidataResolver};

use crate::config::TranslationSettings;
use crate::network::HttpClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Translation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("translation unavailable: {0}")]
    Unavailable(String),
    #[error("nothing to translate")]
    EmptyInput,
    #[error("translation service returned HTTP {0}")]
    Http(u16),
    #[error("translation request failed: {0}")]
    Network(String),
    #[error("translation service returned an unexpected body: {0}")]
    InvalidResponse(String),
}

/// Source-to-working-language translator
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the working language
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Shared translator handle
pub type SharedTranslator = Arc<dyn Translator>;

/// Translator used when no service is configured; every call fails
#[derive(Debug, Default, Clone)]
pub struct UnavailableTranslator;

#[async_trait]
impl Translator for UnavailableTranslator {
    async fn translate(&self, _text: &str) -> Result<String, TranslateError> {
        Err(TranslateError::Unavailable(
            "no translation service configured".to_string(),
        ))
    }
}

/// Fixed-term translator with an optional fallback for unknown input
#[derive(Default, Clone)]
pub struct DictionaryTranslator {
    entries: HashMap<String, String>,
    fallback: Option<SharedTranslator>,
}

impl DictionaryTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: HashMap<String, String>) -> Self {
        Self {
            entries,
            fallback: None,
        }
    }

    /// Add an entry
    pub fn entry(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.entries.insert(source.into(), target.into());
        self
    }

    /// Delegate unknown input to another translator
    pub fn with_fallback(mut self, fallback: SharedTranslator) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl Translator for DictionaryTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let key = text.trim();
        if key.is_empty() {
            return Err(TranslateError::EmptyInput);
        }
        if let Some(hit) = self.entries.get(key) {
            return Ok(hit.clone());
        }
        match &self.fallback {
            Some(fallback) => fallback.translate(key).await,
            None => Err(TranslateError::Unavailable(format!("no entry for '{}'", key))),
        }
    }
}

/// Build the translator stack described by the settings:
/// glossary, then the cached HTTP service (if any)
pub fn from_settings(settings: &TranslationSettings, client: HttpClient) -> SharedTranslator {
    let service: SharedTranslator = match &settings.api_url {
        Some(url) => {
            let libre = LibreTranslate::new(client, url.clone(), &settings.source, &settings.target)
                .with_api_key(settings.api_key.clone());
            Arc::new(CachedTranslator::new(
                libre,
                settings.cache_ttl,
                settings.cache_capacity,
            ))
        }
        None => Arc::new(UnavailableTranslator),
    };

    if settings.glossary.is_empty() {
        service
    } else {
        Arc::new(DictionaryTranslator::from_map(settings.glossary.clone()).with_fallback(service))
    }
}
