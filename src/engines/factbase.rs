//! Factbase transcript search (specialized backend)
//!
//! Queries the Roll Call Factbase JSON search API and returns only links
//! into the configured subject's transcript tree.

use super::traits::*;
use crate::config::{EngineConfig, EngineRole};
use crate::network::accept_json;
use crate::results::{LinkSet, SearchResultItem};
use anyhow::Result as AnyhowResult;
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://rollcall.com/wp-json/factbase/v1/search";
const DEFAULT_PATH_FILTER: &str = "/factbase/trump/";

/// Factbase search engine
pub struct Factbase {
    base_url: String,
    path_filter: String,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    data: Option<Vec<FactbaseEntry>>,
}

#[derive(Debug, Deserialize)]
struct FactbaseEntry {
    factbase_url: Option<String>,
    url: Option<String>,
    permalink: Option<String>,
}

impl FactbaseEntry {
    /// First non-empty URL, in `factbase_url`, `url`, `permalink` order
    fn link(&self) -> Option<&str> {
        [&self.factbase_url, &self.url, &self.permalink]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .find(|u| !u.is_empty())
    }
}

impl Factbase {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            path_filter: DEFAULT_PATH_FILTER.to_string(),
        }
    }

    /// Override the API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Collect subject links, deduplicated and capped at `count`
    fn collect_links(&self, entries: &[FactbaseEntry], count: usize) -> Vec<String> {
        let mut links = LinkSet::with_cap(count);
        for entry in entries {
            if links.is_full() {
                break;
            }
            let Some(url) = entry.link() else {
                continue;
            };
            if !url.contains(&self.path_filter) {
                continue;
            }
            links.insert(url);
        }
        links.into_links()
    }
}

impl Default for Factbase {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Factbase {
    fn name(&self) -> &str {
        "factbase"
    }

    fn role(&self) -> EngineRole {
        EngineRole::Specialized
    }

    fn results_per_page(&self) -> usize {
        50
    }

    fn request(&self, params: &RequestParams) -> AnyhowResult<EngineRequest> {
        Ok(EngineRequest::get(&self.base_url)
            .header("Accept", accept_json())
            .param("q", params.query.clone())
            .param("media", "")
            .param("type", "")
            .param("sort", "date")
            .param("location", "all")
            .param("place", "all")
            .param("page", params.pageno.to_string())
            .param("format", "json"))
    }

    fn response(
        &self,
        params: &RequestParams,
        response: EngineResponse,
    ) -> AnyhowResult<EngineResults> {
        debug!(status = response.status, url = %response.url, "factbase response");

        if !response.is_success() {
            warn!("Factbase returned HTTP {}", response.status);
            return Ok(EngineResults::new());
        }

        let payload: SearchPayload = match response.json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Factbase returned invalid JSON: {}", e);
                return Ok(EngineResults::new());
            }
        };

        let entries = payload.data.unwrap_or_default();
        let links = self.collect_links(&entries, params.count);
        debug!(
            data_len = entries.len(),
            links = links.len(),
            "factbase links collected"
        );

        Ok(EngineResults::with_items(
            links.into_iter().map(SearchResultItem::link_only).collect(),
        ))
    }

    fn init(&mut self, config: &EngineConfig) -> AnyhowResult<()> {
        if let Some(url) = config.extra_str("base_url") {
            self.base_url = url.to_string();
        }
        if let Some(filter) = config.extra_str("path_filter") {
            self.path_filter = filter.to_string();
        }
        Ok(())
    }
}
