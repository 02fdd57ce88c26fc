//! Backend selection with specialized to general fallback

use super::executor::BackendExecutor;
use crate::config::SearchSettings;
use crate::query::{target_year, Query};
use crate::results::{dedupe_items, BackendKind, SearchResultItem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result counts requested from each branch
#[derive(Debug, Clone, Copy)]
pub struct RouteLimits {
    /// Links requested from the specialized backend
    pub specialized: usize,
    /// General results requested after a specialized miss
    pub fallback: usize,
    /// General results requested on the direct branch
    pub general: usize,
}

impl From<&SearchSettings> for RouteLimits {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            specialized: settings.specialized_count,
            fallback: settings.fallback_count,
            general: settings.general_count,
        }
    }
}

impl Default for RouteLimits {
    fn default() -> Self {
        Self::from(&SearchSettings::default())
    }
}

/// Items produced by routing and the backend that supplied them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoutedSearch {
    pub items: Vec<SearchResultItem>,
    /// `None` when no backend produced anything
    pub backend: Option<BackendKind>,
}

impl RoutedSearch {
    fn from_backend(kind: BackendKind, items: Vec<SearchResultItem>) -> Self {
        let backend = (!items.is_empty()).then_some(kind);
        Self { items, backend }
    }
}

/// Chooses a backend per request and applies the fallback chain
pub struct SearchRouter {
    executor: BackendExecutor,
    limits: RouteLimits,
}

impl SearchRouter {
    pub fn new(executor: BackendExecutor, limits: RouteLimits) -> Self {
        Self { executor, limits }
    }

    /// Route one query.
    ///
    /// The specialized branch runs only when the context matches and
    /// rollcall mode is on; a failed or empty specialized search falls
    /// back to the general backend with the larger fallback count.
    pub async fn route(
        &self,
        query: &Query,
        specialized: bool,
        rollcall: bool,
        target_date: Option<&str>,
    ) -> RoutedSearch {
        let Some(q) = query.preferred() else {
            warn!("No query available; skipping search");
            return RoutedSearch::default();
        };

        if specialized && rollcall {
            let items = self.specialized(q, target_date).await;
            if !items.is_empty() {
                info!("Specialized backend supplied {} links", items.len());
                return RoutedSearch::from_backend(BackendKind::Specialized, items);
            }
            info!("Specialized search empty; falling back to general backend");
            return self.general(q, self.limits.fallback).await;
        }

        self.general(q, self.limits.general).await
    }

    async fn specialized(&self, q: &str, target_date: Option<&str>) -> Vec<SearchResultItem> {
        let items = match self
            .executor
            .search(BackendKind::Specialized, q, self.limits.specialized)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!("Specialized search failed: {}", e);
                return Vec::new();
            }
        };

        let links: Vec<String> = items.into_iter().map(|item| item.link).collect();
        let year = target_date.and_then(target_year);
        filter_by_year(links, year)
            .into_iter()
            .map(SearchResultItem::link_only)
            .collect()
    }

    async fn general(&self, q: &str, count: usize) -> RoutedSearch {
        match self.executor.search(BackendKind::General, q, count).await {
            Ok(items) => {
                let items = dedupe_items(items);
                debug!("General backend supplied {} items", items.len());
                RoutedSearch::from_backend(BackendKind::General, items)
            }
            Err(e) => {
                warn!("General search failed: {}", e);
                RoutedSearch::default()
            }
        }
    }
}

/// Keep links containing `-<year>/`; if none match, keep them all
pub fn filter_by_year(links: Vec<String>, year: Option<i32>) -> Vec<String> {
    let Some(year) = year else {
        return links;
    };
    let token = format!("-{}/", year);
    let matching: Vec<String> = links.iter().filter(|l| l.contains(&token)).cloned().collect();
    if matching.is_empty() {
        debug!("No links match year {}; keeping unfiltered set", year);
        links
    } else {
        matching
    }
}
