//! Translation cache

use super::{TranslateError, Translator};
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

/// Translator wrapper that remembers successful translations.
/// Failures are not cached.
pub struct CachedTranslator<T> {
    inner: T,
    cache: Cache<String, String>,
}

impl<T: Translator> CachedTranslator<T> {
    /// Wrap `inner` with a cache of the given TTL and capacity
    pub fn new(inner: T, ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { inner, cache }
    }

    /// Number of cached entries
    pub fn size(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<T: Translator> Translator for CachedTranslator<T> {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let key = text.trim().to_string();
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let translated = self.inner.translate(&key).await?;
        self.cache.insert(key, translated.clone()).await;
        Ok(translated)
    }
}
