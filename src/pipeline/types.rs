//! Pipeline request and result types

use crate::extraction::{Entity, Extraction, Keyword};
use crate::query::Query;
use crate::results::{BackendKind, SearchResultItem, SpanResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Terminal pipeline failures
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("either article text or a file path must be provided")]
    InputMissing,

    #[error("failed to read {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One quotation-resolution request
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Inline article text
    pub text: Option<String>,
    /// Path to a UTF-8 article file, used when `text` is absent
    pub file: Option<PathBuf>,
    /// The quotation, in the article's language
    pub quote: Option<String>,
    /// Article date (`YYYY-MM-DD`, `YYYY.MM.DD` or `YYYY/MM/DD`)
    pub date: Option<String>,
    /// Keywords extracted; settings default when `None`
    pub top_n: Option<usize>,
    /// Keywords placed in the query; settings default when `None`
    pub top_k: Option<usize>,
    /// Spans returned; settings default when `None`
    pub top_matches: Option<usize>,
    /// Use the transcript backend when the context matches
    pub rollcall: bool,
    /// Run search and ranking after query construction
    pub search: bool,
}

impl ResolveRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_rollcall(mut self, rollcall: bool) -> Self {
        self.rollcall = rollcall;
        self
    }

    pub fn with_search(mut self, search: bool) -> Self {
        self.search = search;
        self
    }

    pub fn with_top_matches(mut self, top_matches: usize) -> Self {
        self.top_matches = Some(top_matches);
        self
    }
}

/// Extraction and query output of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineSummary {
    pub entities: Vec<Entity>,
    pub entities_by_type: BTreeMap<String, Vec<String>>,
    pub keywords: Vec<Keyword>,
    pub queries: Query,
}

impl PipelineSummary {
    pub fn new(extraction: Extraction, queries: Query) -> Self {
        Self {
            entities: extraction.entities,
            entities_by_type: extraction.entities_by_type,
            keywords: extraction.keywords,
            queries,
        }
    }
}

/// Full output of one run; returned even when every step degraded
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineResult {
    pub pipeline_result: PipelineSummary,
    pub search_items: Vec<SearchResultItem>,
    pub best_span: Option<SpanResult>,
    pub span_candidates: Vec<SpanResult>,
    pub specialized_context: bool,
    pub search_backend: Option<BackendKind>,
}

impl PipelineResult {
    pub fn new(summary: PipelineSummary, specialized_context: bool) -> Self {
        Self {
            pipeline_result: summary,
            specialized_context,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> &Query {
        &self.pipeline_result.queries
    }
}
