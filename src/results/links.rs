//! Link deduplication for backend results

use super::types::SearchResultItem;
use std::collections::HashSet;

/// Strip a trailing `#fragment` from a URL
pub fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

/// Ordered set of links keyed by fragment-stripped URL; first occurrence wins
#[derive(Debug, Clone, Default)]
pub struct LinkSet {
    seen: HashSet<String>,
    links: Vec<String>,
    cap: Option<usize>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set that stops accepting links once `cap` are held
    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap: Some(cap),
            ..Default::default()
        }
    }

    /// Insert a link, storing its fragment-stripped form.
    /// Returns false when the link was a duplicate or the set is full.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.is_full() {
            return false;
        }
        let base = strip_fragment(url).trim();
        if base.is_empty() || !self.seen.insert(base.to_string()) {
            return false;
        }
        self.links.push(base.to_string());
        true
    }

    pub fn is_full(&self) -> bool {
        self.cap.is_some_and(|cap| self.links.len() >= cap)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }
}

/// Drop items whose fragment-stripped link was already seen
pub fn dedupe_items(items: Vec<SearchResultItem>) -> Vec<SearchResultItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let key = strip_fragment(&item.link).trim().to_string();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fragment() {
        assert_eq!(strip_fragment("https://a.com/x#y"), "https://a.com/x");
        assert_eq!(strip_fragment("https://a.com/x"), "https://a.com/x");
        assert_eq!(strip_fragment("#only"), "");
    }

    #[test]
    fn test_fragment_variants_collapse() {
        let mut set = LinkSet::new();
        assert!(set.insert("https://rollcall.com/factbase/trump/transcript-a/#t=10"));
        assert!(!set.insert("https://rollcall.com/factbase/trump/transcript-a/"));
        assert!(set.insert("https://rollcall.com/factbase/trump/transcript-b/"));
        assert_eq!(
            set.into_links(),
            vec![
                "https://rollcall.com/factbase/trump/transcript-a/",
                "https://rollcall.com/factbase/trump/transcript-b/",
            ]
        );
    }

    #[test]
    fn test_cap() {
        let mut set = LinkSet::with_cap(2);
        assert!(set.insert("https://a.com/1"));
        assert!(set.insert("https://a.com/2"));
        assert!(set.is_full());
        assert!(!set.insert("https://a.com/3"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_dedupe_items_keeps_first() {
        let items = vec![
            SearchResultItem::new("https://a.com/p#one", "first"),
            SearchResultItem::new("https://a.com/p#two", "second"),
            SearchResultItem::new("https://b.com/q", "third"),
        ];
        let deduped = dedupe_items(items);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].snippet, "first");
        assert_eq!(deduped[1].link, "https://b.com/q");
    }
}
