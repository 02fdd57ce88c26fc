//! Specialized-context detection
//!
//! Decides whether a quotation's subject is covered by the dedicated
//! search backend.

use crate::config::ContextSettings;
use crate::extraction::{Extraction, PERSON};
use std::sync::Arc;

/// Pure decision over an article, its quote and the extraction result
pub trait ContextClassifier: Send + Sync {
    fn is_specialized(&self, article: &str, quote: Option<&str>, extraction: &Extraction) -> bool;
}

/// Shared classifier handle
pub type SharedClassifier = Arc<dyn ContextClassifier>;

/// Matches configured subject aliases against person entities and the quote
#[derive(Debug, Clone)]
pub struct SubjectClassifier {
    aliases: Vec<String>,
}

impl SubjectClassifier {
    pub fn new(aliases: Vec<String>) -> Self {
        Self {
            aliases: aliases.into_iter().filter(|a| !a.trim().is_empty()).collect(),
        }
    }

    pub fn from_settings(settings: &ContextSettings) -> Self {
        Self::new(settings.subject_aliases.clone())
    }

    fn mentions(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.aliases
            .iter()
            .any(|alias| lowered.contains(&alias.to_lowercase()))
    }
}

impl ContextClassifier for SubjectClassifier {
    fn is_specialized(&self, _article: &str, quote: Option<&str>, extraction: &Extraction) -> bool {
        extraction.of_type(PERSON).iter().any(|p| self.mentions(p))
            || quote.is_some_and(|q| self.mentions(q))
    }
}

/// Classifier with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier(pub bool);

impl ContextClassifier for FixedClassifier {
    fn is_specialized(&self, _article: &str, _quote: Option<&str>, _extraction: &Extraction) -> bool {
        self.0
    }
}
