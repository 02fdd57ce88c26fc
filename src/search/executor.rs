//! Backend execution with timeouts, paging and failure classification

use crate::engines::{Engine, EngineRegistry, RequestParams};
use crate::network::HttpClient;
use crate::results::{BackendError, BackendKind, SearchResultItem};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs registered backends on behalf of the router
pub struct BackendExecutor {
    /// HTTP client for making requests
    client: HttpClient,
    /// Engine registry
    registry: Arc<EngineRegistry>,
}

impl BackendExecutor {
    pub fn new(client: HttpClient, registry: Arc<EngineRegistry>) -> Self {
        Self { client, registry }
    }

    /// Search the backend registered for `kind`, returning up to `count`
    /// items in backend order
    pub async fn search(
        &self,
        kind: BackendKind,
        query: &str,
        count: usize,
    ) -> Result<Vec<SearchResultItem>, BackendError> {
        let backend = match kind {
            BackendKind::Specialized => self.registry.specialized(),
            BackendKind::General => self.registry.general(),
        };
        let Some((name, engine)) = backend else {
            return Err(BackendError::Unavailable(kind));
        };

        let start = Instant::now();
        let items = self.run_engine(name, engine.as_ref(), query, count).await?;
        debug!(
            "Backend {} ({}) returned {} items in {:?}",
            name,
            kind,
            items.len(),
            start.elapsed()
        );
        Ok(items)
    }

    /// Fetch pages until `count` items are collected, a page comes back
    /// short, or the engine does not page
    async fn run_engine(
        &self,
        name: &str,
        engine: &dyn Engine,
        query: &str,
        count: usize,
    ) -> Result<Vec<SearchResultItem>, BackendError> {
        if !engine.supports_paging() {
            return self
                .fetch_page(name, engine, RequestParams::new(query, count))
                .await;
        }

        let per_page = engine.results_per_page().max(1);
        let mut items = Vec::with_capacity(count);
        let mut page = 1;
        while items.len() < count {
            let wanted = (count - items.len()).min(per_page);
            let params = RequestParams::new(query, wanted).with_page(page);
            let batch = self.fetch_page(name, engine, params).await?;
            let short = batch.len() < wanted;
            items.extend(batch);
            if short {
                break;
            }
            page += 1;
        }
        items.truncate(count);
        Ok(items)
    }

    async fn fetch_page(
        &self,
        name: &str,
        engine: &dyn Engine,
        params: RequestParams,
    ) -> Result<Vec<SearchResultItem>, BackendError> {
        let engine_timeout = Duration::from_secs_f64(
            self.registry
                .get_timeout(name, self.client.default_timeout().as_secs_f64())
                .min(self.client.max_timeout().as_secs_f64()),
        );

        let request = engine
            .request(&params)
            .map_err(|e| BackendError::Request(e.to_string()))?;

        debug!(
            "Requesting {} page {} with timeout {:?}",
            name, params.pageno, engine_timeout
        );

        let response = match timeout(
            engine_timeout,
            self.client.execute_with_timeout(request, engine_timeout),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let error = classify(&e);
                warn!("Request failed for {}: {}", name, error);
                return Err(error);
            }
            Err(_) => {
                warn!("Timeout for backend {}", name);
                return Err(BackendError::Timeout);
            }
        };

        let status = response.status;
        let success = response.is_success();
        engine
            .response(&params, response)
            .map(|results| results.items)
            .map_err(|e| {
                if success {
                    BackendError::Parse(e.to_string())
                } else {
                    BackendError::Http(status)
                }
            })
    }
}

/// Map a transport error onto the backend failure classes
fn classify(error: &anyhow::Error) -> BackendError {
    match error.downcast_ref::<reqwest::Error>() {
        Some(e) if e.is_timeout() => BackendError::Timeout,
        Some(e) => match e.status() {
            Some(status) => BackendError::Http(status.as_u16()),
            None => BackendError::Network(e.to_string()),
        },
        None => BackendError::Network(error.to_string()),
    }
}
