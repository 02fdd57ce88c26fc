//! LibreTranslate-compatible HTTP translator

use super::{TranslateError, Translator};
use crate::network::HttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Client for a `POST /translate` LibreTranslate endpoint
pub struct LibreTranslate {
    client: HttpClient,
    api_url: String,
    api_key: Option<String>,
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

impl LibreTranslate {
    pub fn new(
        client: HttpClient,
        api_url: impl Into<String>,
        source: &str,
        target: &str,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: None,
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/translate", self.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Translator for LibreTranslate {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslateError::EmptyInput);
        }

        let mut body = serde_json::json!({
            "q": text,
            "source": self.source,
            "target": self.target,
            "format": "text",
        });
        if let Some(ref key) = self.api_key {
            body["api_key"] = serde_json::Value::String(key.clone());
        }

        let response = self
            .client
            .post_json(&self.endpoint(), body)
            .await
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        if !response.is_success() {
            return Err(TranslateError::Http(response.status));
        }

        let parsed: TranslateResponse = response
            .json()
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;

        let translated = parsed
            .translated_text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TranslateError::InvalidResponse("empty translation".to_string()))?;

        debug!(source = text, translated = %translated, "translated");
        Ok(translated)
    }
}
