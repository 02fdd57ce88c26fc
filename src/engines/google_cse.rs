//! Google Custom Search JSON API (general backend)

use super::traits::*;
use crate::config::{EngineConfig, EngineRole};
use crate::network::accept_json;
use crate::results::SearchResultItem;
use anyhow::Result as AnyhowResult;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// The API never returns more than ten items per request
const MAX_PER_REQUEST: usize = 10;

/// Google Custom Search engine
pub struct GoogleCse {
    base_url: String,
    api_key: String,
    cx: String,
}

#[derive(Debug, Deserialize)]
struct CsePayload {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleCse {
    pub fn new(api_key: impl Into<String>, cx: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            cx: cx.into(),
        }
    }

    /// Override the API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for GoogleCse {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl Engine for GoogleCse {
    fn name(&self) -> &str {
        "google_cse"
    }

    fn role(&self) -> EngineRole {
        EngineRole::General
    }

    fn supports_paging(&self) -> bool {
        true
    }

    fn results_per_page(&self) -> usize {
        MAX_PER_REQUEST
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<EngineRequest> {
        let num = params.count.clamp(1, MAX_PER_REQUEST);
        let start = (params.pageno as usize - 1) * MAX_PER_REQUEST + 1;

        Ok(EngineRequest::get(&self.base_url)
            .header("Accept", accept_json())
            .param("key", self.api_key.clone())
            .param("cx", self.cx.clone())
            .param("q", params.query.clone())
            .param("num", num.to_string())
            .param("start", start.to_string()))
    }

    fn response(
        &self,
        params: &RequestParams,
        response: EngineResponse,
    ) -> AnyhowResult<EngineResults> {
        if !response.is_success() {
            return Err(anyhow::anyhow!("HTTP error: {}", response.status));
        }

        let payload: CsePayload = response.json()?;
        let items = payload
            .items
            .into_iter()
            .filter(|item| !item.link.is_empty())
            .take(params.count)
            .map(|item| SearchResultItem::new(item.link, item.snippet).with_title(item.title))
            .collect();

        Ok(EngineResults::with_items(items))
    }

    fn init(&mut self, config: &EngineConfig) -> AnyhowResult<()> {
        if let Some(ref key) = config.api_key {
            self.api_key = key.clone();
        }
        if let Some(cx) = config.extra_str("cx") {
            self.cx = cx.to_string();
        }
        if let Some(url) = config.extra_str("base_url") {
            self.base_url = url.to_string();
        }
        Ok(())
    }

    fn validate(&self, _config: &EngineConfig) -> AnyhowResult<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("google_cse requires an api_key"));
        }
        if self.cx.is_empty() {
            return Err(anyhow::anyhow!("google_cse requires a cx search engine id"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn response(status: u16, text: &str) -> EngineResponse {
        EngineResponse {
            status,
            headers: HashMap::new(),
            text: text.to_string(),
            url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[test]
    fn test_cse_request_paging() {
        let engine = GoogleCse::new("key", "cx");
        let first = engine.request(&RequestParams::new("moon", 20)).unwrap();
        assert_eq!(first.params.get("num").unwrap(), "10");
        assert_eq!(first.params.get("start").unwrap(), "1");

        let second = engine
            .request(&RequestParams::new("moon", 10).with_page(2))
            .unwrap();
        assert_eq!(second.params.get("start").unwrap(), "11");
        assert_eq!(second.params.get("q").unwrap(), "moon");
    }

    #[test]
    fn test_cse_response_parsing() {
        let engine = GoogleCse::new("key", "cx");
        let body = r#"{"items": [
            {"link": "https://a.com/1", "title": "A", "snippet": "first snippet"},
            {"link": "", "title": "broken"},
            {"link": "https://b.com/2", "title": "B"}
        ]}"#;
        let results = engine
            .response(&RequestParams::new("q", 5), response(200, body))
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results.items[0].title, "A");
        assert_eq!(results.items[0].snippet, "first snippet");
        assert_eq!(results.items[1].snippet, "");
    }

    #[test]
    fn test_cse_no_items_is_empty() {
        let engine = GoogleCse::new("key", "cx");
        let results = engine
            .response(&RequestParams::new("q", 5), response(200, r#"{"kind": "x"}"#))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_cse_http_error() {
        let engine = GoogleCse::new("key", "cx");
        assert!(engine
            .response(&RequestParams::new("q", 5), response(403, "{}"))
            .is_err());
    }

    #[test]
    fn test_cse_validation() {
        let config = EngineConfig::default();
        assert!(GoogleCse::default().validate(&config).is_err());
        assert!(GoogleCse::new("key", "").validate(&config).is_err());
        assert!(GoogleCse::new("key", "cx").validate(&config).is_ok());
    }
}
