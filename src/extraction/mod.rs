//! Entity and keyword extraction
//!
//! Named-entity recognition is an external collaborator. This module fixes
//! the shape of its output and ships two implementations: a fixed
//! extraction (loaded from JSON or built in tests) and a gazetteer-based
//! extractor driven by configured name lists.

mod lexicon;

pub use lexicon::LexiconExtractor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Entity label for people
pub const PERSON: &str = "PER";
/// Entity label for locations
pub const LOCATION: &str = "LOC";

/// A labelled entity occurrence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    #[serde(rename = "type")]
    pub label: String,
    pub text: String,
}

impl Entity {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// A scored keyword
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Keyword {
    pub text: String,
    pub score: f32,
}

impl Keyword {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Entities and keywords extracted from an article
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Extraction {
    /// Entities in order of first appearance
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Surface strings grouped by label, in order of appearance
    #[serde(default)]
    pub entities_by_type: BTreeMap<String, Vec<String>>,
    /// Keywords, descending by score
    #[serde(default)]
    pub keywords: Vec<Keyword>,
}

impl Extraction {
    /// Build from entities, grouping them by label
    pub fn from_entities(entities: Vec<Entity>, mut keywords: Vec<Keyword>) -> Self {
        let mut entities_by_type: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entity in &entities {
            entities_by_type
                .entry(entity.label.clone())
                .or_default()
                .push(entity.text.clone());
        }
        keywords.sort_by(|a, b| b.score.total_cmp(&a.score));

        Self {
            entities,
            entities_by_type,
            keywords,
        }
    }

    /// Surface strings for one label
    pub fn of_type(&self, label: &str) -> &[String] {
        self.entities_by_type
            .get(label)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The first person entity, taken as the quote's speaker
    pub fn speaker(&self) -> Option<&str> {
        self.of_type(PERSON).first().map(|s| s.as_str())
    }
}

/// Extracts entities and keywords from article text
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Extract entities and the `top_n` best keywords
    async fn extract(&self, text: &str, top_n: usize) -> anyhow::Result<Extraction>;
}

/// Shared extractor handle
pub type SharedExtractor = Arc<dyn EntityExtractor>;

/// Returns the same extraction for every article
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    extraction: Extraction,
}

impl StaticExtractor {
    pub fn new(extraction: Extraction) -> Self {
        Self { extraction }
    }

    /// Load an extraction serialized as JSON
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut extraction: Extraction = serde_json::from_str(json)?;
        if extraction.entities_by_type.is_empty() && !extraction.entities.is_empty() {
            extraction = Extraction::from_entities(extraction.entities, extraction.keywords);
        }
        Ok(Self::new(extraction))
    }
}

#[async_trait]
impl EntityExtractor for StaticExtractor {
    async fn extract(&self, _text: &str, top_n: usize) -> anyhow::Result<Extraction> {
        let mut extraction = self.extraction.clone();
        extraction.keywords.truncate(top_n);
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_preserves_order() {
        let extraction = Extraction::from_entities(
            vec![
                Entity::new(PERSON, "트럼프"),
                Entity::new(LOCATION, "베네수엘라"),
                Entity::new(PERSON, "마두로"),
                Entity::new(PERSON, "트럼프"),
            ],
            vec![Keyword::new("상공", 0.2), Keyword::new("폐쇄", 0.9)],
        );

        assert_eq!(extraction.of_type(PERSON), ["트럼프", "마두로", "트럼프"]);
        assert_eq!(extraction.speaker(), Some("트럼프"));
        assert_eq!(extraction.keywords[0].text, "폐쇄");
        assert!(extraction.of_type("ORG").is_empty());
    }

    #[test]
    fn test_static_extractor_from_json() {
        let json = r#"{
            "entities": [{"type": "PER", "text": "문재인"}],
            "keywords": [{"text": "비핵화", "score": 0.8}, {"text": "한반도", "score": 0.5}]
        }"#;
        let extractor = StaticExtractor::from_json(json).unwrap();
        let extraction = tokio_test::block_on(extractor.extract("ignored", 1)).unwrap();

        assert_eq!(extraction.speaker(), Some("문재인"));
        assert_eq!(extraction.keywords.len(), 1);
    }
}
