//! Quote-Origin: locates the original-language source of quotations that
//! appear, translated, in foreign-language news articles.
//!
//! A run extracts entities from the article, builds bilingual search
//! queries, routes them to a specialized transcript backend or a general
//! web search backend, and ranks spans from the results by similarity to
//! the quotation.

pub mod batch;
pub mod config;
pub mod context;
pub mod engines;
pub mod extract;
pub mod extraction;
pub mod network;
pub mod pipeline;
pub mod query;
pub mod rank;
pub mod results;
pub mod search;
pub mod translate;

pub use config::Settings;
pub use pipeline::{Pipeline, PipelineError, PipelineResult, ResolveRequest};
pub use query::Query;
pub use results::{Candidate, SearchResultItem, SpanResult};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
