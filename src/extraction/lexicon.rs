//! Gazetteer entity matching with frequency keywords

use super::{Entity, EntityExtractor, Extraction, Keyword, LOCATION, PERSON};
use crate::config::ExtractionSettings;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}\-]*").unwrap());

/// Matches configured people and places, and ranks remaining tokens by
/// frequency
#[derive(Debug, Clone)]
pub struct LexiconExtractor {
    people: Vec<String>,
    locations: Vec<String>,
    min_keyword_chars: usize,
}

impl LexiconExtractor {
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            people: settings.people.clone(),
            locations: settings.locations.clone(),
            min_keyword_chars: settings.min_keyword_chars,
        }
    }

    /// Every lexicon occurrence, ordered by byte offset
    fn find_entities(&self, text: &str) -> Vec<Entity> {
        let mut hits: Vec<(usize, Entity)> = Vec::new();
        for (label, names) in [(PERSON, &self.people), (LOCATION, &self.locations)] {
            for name in names.iter().filter(|n| !n.is_empty()) {
                hits.extend(
                    text.match_indices(name.as_str())
                        .map(|(offset, _)| (offset, Entity::new(label, name.clone()))),
                );
            }
        }
        hits.sort_by_key(|(offset, _)| *offset);
        hits.into_iter().map(|(_, entity)| entity).collect()
    }

    fn keywords(&self, text: &str, entities: &[Entity], top_n: usize) -> Vec<Keyword> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (position, m) in TOKEN_RE.find_iter(text).enumerate() {
            let token = m.as_str();
            if token.chars().count() < self.min_keyword_chars {
                continue;
            }
            if entities.iter().any(|e| token.contains(e.text.as_str())) {
                continue;
            }
            counts.entry(token).or_insert((0, position)).0 += 1;
        }

        let max = counts.values().map(|(count, _)| *count).max().unwrap_or(1) as f32;
        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(token, (count, first))| (token, count, first))
            .collect();
        // Higher count first, earlier appearance breaks ties
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(top_n)
            .map(|(token, count, _)| Keyword::new(token, count as f32 / max))
            .collect()
    }
}

#[async_trait]
impl EntityExtractor for LexiconExtractor {
    async fn extract(&self, text: &str, top_n: usize) -> anyhow::Result<Extraction> {
        let entities = self.find_entities(text);
        let keywords = self.keywords(text, &entities, top_n);
        Ok(Extraction::from_entities(entities, keywords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LexiconExtractor {
        LexiconExtractor::new(&ExtractionSettings {
            people: vec!["트럼프".to_string(), "마두로".to_string()],
            locations: vec!["베네수엘라".to_string()],
            min_keyword_chars: 2,
        })
    }

    #[tokio::test]
    async fn test_entities_in_order_of_appearance() {
        let text = "마두로 대통령은 베네수엘라에서 트럼프 대통령을 비판했다. 트럼프는 반박했다.";
        let extraction = extractor().extract(text, 5).await.unwrap();

        assert_eq!(extraction.of_type(PERSON), ["마두로", "트럼프", "트럼프"]);
        assert_eq!(extraction.of_type(LOCATION), ["베네수엘라"]);
        assert_eq!(extraction.speaker(), Some("마두로"));
    }

    #[tokio::test]
    async fn test_keywords_by_frequency() {
        let text = "상공 폐쇄 조치. 상공 폐쇄 발표. 상공 통제. 트럼프는 말했다.";
        let extraction = extractor().extract(text, 2).await.unwrap();

        assert_eq!(extraction.keywords.len(), 2);
        assert_eq!(extraction.keywords[0].text, "상공");
        assert_eq!(extraction.keywords[0].score, 1.0);
        assert_eq!(extraction.keywords[1].text, "폐쇄");
        assert!(extraction.keywords.iter().all(|k| !k.text.contains("트럼프")));
    }
}
