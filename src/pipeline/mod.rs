//! Pipeline orchestration
//!
//! Sequences extraction, context classification, query construction,
//! search routing, candidate extraction and span ranking for one
//! quotation. Every step after input loading degrades to empty fields
//! instead of failing; only missing or unreadable input is an error.
//!
//! Each run executes inside a `resolve` tracing span carrying a fresh run
//! id, so all log lines of one run can be correlated.

mod types;

pub use types::{PipelineError, PipelineResult, PipelineSummary, ResolveRequest};

use crate::config::Settings;
use crate::context::{SharedClassifier, SubjectClassifier};
use crate::engines::{EngineLoader, EngineRegistry};
use crate::extract::{CandidateExtractor, ExtractionMode};
use crate::extraction::{Extraction, LexiconExtractor, SharedExtractor};
use crate::network::HttpClient;
use crate::query::{Query, QueryBuilder, QueryOptions};
use crate::rank::SpanRanker;
use crate::search::{BackendExecutor, RouteLimits, SearchRouter};
use crate::translate::{self, NameResolver, SharedTranslator, WikidataResolver};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Quotation origin resolver
pub struct Pipeline {
    extractor: SharedExtractor,
    classifier: SharedClassifier,
    translator: SharedTranslator,
    queries: QueryBuilder,
    router: SearchRouter,
    candidates: CandidateExtractor,
    ranker: SpanRanker,
    top_n: usize,
    top_k: usize,
    top_matches: usize,
}

impl Pipeline {
    /// Pipeline with every collaborator built from the settings
    pub fn from_settings(settings: &Settings, client: HttpClient) -> Self {
        Self::builder(settings, client).build()
    }

    pub fn builder(settings: &Settings, client: HttpClient) -> PipelineBuilder {
        PipelineBuilder::new(settings.clone(), client)
    }

    /// Translator used for quotes and query tokens
    pub fn translator(&self) -> &SharedTranslator {
        &self.translator
    }

    /// Resolve one quotation
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<PipelineResult, PipelineError> {
        let article = load_article(request).await?;
        let span = info_span!("resolve", run_id = %Uuid::new_v4());
        Ok(self.run(&article, request).instrument(span).await)
    }

    async fn run(&self, article: &str, request: &ResolveRequest) -> PipelineResult {
        let top_n = request.top_n.unwrap_or(self.top_n);
        let top_k = request.top_k.unwrap_or(self.top_k);
        let top_matches = request.top_matches.unwrap_or(self.top_matches);
        let quote = request.quote.as_deref().filter(|q| !q.trim().is_empty());
        info!(
            chars = article.chars().count(),
            top_n,
            top_k,
            rollcall = request.rollcall,
            search = request.search,
            top_matches,
            "Loaded article"
        );

        let extraction = match self.extractor.extract(article, top_n).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("Entity extraction failed: {}", e);
                Extraction::default()
            }
        };

        let specialized = self.classifier.is_specialized(article, quote, &extraction);
        info!("Specialized context: {}", specialized);

        let options = QueryOptions {
            top_k,
            quote: quote.map(str::to_string),
            article_date: request.date.clone(),
            rollcall_mode: request.rollcall,
        };
        let queries = self.queries.build(&extraction, &options).await;
        if queries.is_empty() {
            warn!("No speaker entity found; queries are empty");
        }
        info!(
            entities = extraction.entities.len(),
            keywords = extraction.keywords.len(),
            ko = queries.ko.is_some(),
            en = queries.en.is_some(),
            "Queries built"
        );

        let mut result = PipelineResult::new(PipelineSummary::new(extraction, queries), specialized);
        if !request.search {
            return result;
        }

        let routed = self
            .router
            .route(result.queries(), specialized, request.rollcall, request.date.as_deref())
            .await;
        result.search_items = routed.items;
        result.search_backend = routed.backend;
        if result.search_items.is_empty() {
            warn!("No results returned from search backends");
            return result;
        }
        info!(
            "{} search items from {:?} backend",
            result.search_items.len(),
            result.search_backend
        );

        let Some(target) = self.match_text(quote, result.queries()).await else {
            warn!("No English text available for similarity matching");
            return result;
        };

        let mode = ExtractionMode::select(specialized, request.rollcall);
        let candidates = self.candidates.extract(&result.search_items, mode).await;
        if candidates.is_empty() {
            warn!("No candidate texts for similarity matching");
            return result;
        }

        let spans = self.ranker.rank(&target, &candidates, top_matches).await;
        match spans.first() {
            Some(best) => info!(
                score = best.best_score,
                url = %best.url,
                "Best span found"
            ),
            None => warn!("No span passed the similarity threshold"),
        }
        result.best_span = spans.first().cloned();
        result.span_candidates = spans;
        result
    }

    /// The quotation in the working language: its translation, else the
    /// English query
    async fn match_text(&self, quote: Option<&str>, queries: &Query) -> Option<String> {
        if let Some(quote) = quote {
            match self.translator.translate(quote).await {
                Ok(text) if !text.trim().is_empty() => return Some(text),
                Ok(_) => debug!("Quote translated to empty text"),
                Err(e) => warn!("Quote translation failed, falling back to EN query: {}", e),
            }
        }
        queries.en.clone()
    }
}

async fn load_article(request: &ResolveRequest) -> Result<String, PipelineError> {
    if let Some(text) = request.text.as_ref().filter(|t| !t.trim().is_empty()) {
        return Ok(text.clone());
    }
    match &request.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PipelineError::InputUnreadable {
                path: path.clone(),
                source,
            }),
        None => Err(PipelineError::InputMissing),
    }
}

/// Assembles a [`Pipeline`], defaulting every collaborator from settings
pub struct PipelineBuilder {
    settings: Settings,
    client: HttpClient,
    extractor: Option<SharedExtractor>,
    classifier: Option<SharedClassifier>,
    translator: Option<SharedTranslator>,
    names: Option<Option<Arc<dyn NameResolver>>>,
    registry: Option<EngineRegistry>,
    ranker: Option<SpanRanker>,
}

impl PipelineBuilder {
    fn new(settings: Settings, client: HttpClient) -> Self {
        Self {
            settings,
            client,
            extractor: None,
            classifier: None,
            translator: None,
            names: None,
            registry: None,
            ranker: None,
        }
    }

    pub fn with_extractor(mut self, extractor: SharedExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_classifier(mut self, classifier: SharedClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_translator(mut self, translator: SharedTranslator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Override the speaker name resolver; `None` disables it
    pub fn with_name_resolver(mut self, names: Option<Arc<dyn NameResolver>>) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_registry(mut self, registry: EngineRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_ranker(mut self, ranker: SpanRanker) -> Self {
        self.ranker = Some(ranker);
        self
    }

    pub fn build(self) -> Pipeline {
        let settings = self.settings;
        let client = self.client;

        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(LexiconExtractor::new(&settings.extraction)));
        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(SubjectClassifier::from_settings(&settings.context)));
        let translator = self
            .translator
            .unwrap_or_else(|| translate::from_settings(&settings.translation, client.clone()));
        let names = self.names.unwrap_or_else(|| {
            settings.query.use_name_resolution.then(|| {
                Arc::new(WikidataResolver::new(client.clone(), &settings.names)) as Arc<dyn NameResolver>
            })
        });

        let mut queries = QueryBuilder::new(Arc::clone(&translator), settings.query.clone());
        if let Some(names) = names {
            queries = queries.with_name_resolver(names);
        }

        let registry = self
            .registry
            .unwrap_or_else(|| EngineLoader::load(&settings));
        let executor = BackendExecutor::new(client.clone(), Arc::new(registry));
        let router = SearchRouter::new(executor, RouteLimits::from(&settings.search));

        let candidates = CandidateExtractor::new(
            client.clone(),
            Duration::from_secs_f64(settings.outgoing.fetch_timeout),
        );
        let ranker = self
            .ranker
            .unwrap_or_else(|| SpanRanker::from_settings(&settings.ranking, client));

        Pipeline {
            extractor,
            classifier,
            translator,
            queries,
            router,
            candidates,
            ranker,
            top_n: settings.query.top_n,
            top_k: settings.query.top_k,
            top_matches: settings.ranking.top_matches,
        }
    }
}
