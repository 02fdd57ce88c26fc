//! Person-name resolution via Wikidata

use super::TranslateError;
use crate::config::NameSettings;
use crate::engines::EngineRequest;
use crate::network::{accept_json, HttpClient};
use async_trait::async_trait;
use serde::Deserialize;

/// Resolves a source-language person name to its canonical English form
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<String, TranslateError>;
}

/// Looks names up with Wikidata's `wbsearchentities` action
pub struct WikidataResolver {
    client: HttpClient,
    api_url: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct SearchEntitiesResponse {
    #[serde(default)]
    search: Vec<EntityHit>,
}

#[derive(Debug, Deserialize)]
struct EntityHit {
    label: Option<String>,
}

impl WikidataResolver {
    pub fn new(client: HttpClient, settings: &NameSettings) -> Self {
        Self {
            client,
            api_url: settings.wikidata_url.clone(),
            language: settings.language.clone(),
        }
    }
}

#[async_trait]
impl NameResolver for WikidataResolver {
    async fn resolve(&self, name: &str) -> Result<String, TranslateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TranslateError::EmptyInput);
        }

        let request = EngineRequest::get(&self.api_url)
            .header("Accept", accept_json())
            .param("action", "wbsearchentities")
            .param("search", name)
            .param("language", self.language.clone())
            .param("uselang", "en")
            .param("type", "item")
            .param("limit", "1")
            .param("format", "json");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        if !response.is_success() {
            return Err(TranslateError::Http(response.status));
        }

        let parsed: SearchEntitiesResponse = response
            .json()
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;

        parsed
            .search
            .into_iter()
            .filter_map(|hit| hit.label)
            .map(|label| label.trim().to_string())
            .find(|label| !label.is_empty())
            .ok_or_else(|| TranslateError::Unavailable(format!("no Wikidata entity for '{}'", name)))
    }
}
