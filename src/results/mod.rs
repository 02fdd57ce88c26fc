//! Search result types and link handling
//!
//! Defines the items passed between the router, the candidate extractor
//! and the span ranker.

mod links;
mod types;

pub use links::{dedupe_items, strip_fragment, LinkSet};
pub use types::*;
