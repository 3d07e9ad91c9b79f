// ABOUTME: Ordered multi-selector fallback: the first configured selector that matches wins.
// ABOUTME: Selector order is significant and is the only defence against upstream markup churn.

//! Selector resolution.
//!
//! Key behaviors:
//! - Selectors are tried in their configured order; the first one that
//!   matches anything inside the root wins, even if a later selector would
//!   match an earlier element in the document.
//! - No match is `None`, never an error.
//! - Invalid selectors match nothing.
//! - Nothing is cached between calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::PageNode;

/// An ordered sequence of CSS selectors tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorSet(Vec<String>);

impl SelectorSet {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(selectors.into_iter().map(Into::into).collect())
    }

    /// A set holding exactly one selector.
    pub fn single(selector: impl Into<String>) -> Self {
        Self(vec![selector.into()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First match of the first selector that matches anything under `root`.
    pub fn resolve<N: PageNode>(&self, root: &N) -> Option<N> {
        resolve(self.iter(), root)
    }

    /// All matches of the first selector that matches anything under `root`.
    pub fn resolve_all<N: PageNode>(&self, root: &N) -> Vec<N> {
        resolve_all(self.iter(), root)
    }
}

impl fmt::Display for SelectorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for SelectorSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Tries each selector against `root` in order and returns the first match.
pub fn resolve<'s, N, I>(selectors: I, root: &N) -> Option<N>
where
    N: PageNode,
    I: IntoIterator<Item = &'s str>,
{
    for css in selectors {
        if let Some(node) = root.find_first(css) {
            tracing::trace!(selector = css, "selector matched");
            return Some(node);
        }
    }
    None
}

/// Like [`resolve`], but returns every match of the winning selector.
pub fn resolve_all<'s, N, I>(selectors: I, root: &N) -> Vec<N>
where
    N: PageNode,
    I: IntoIterator<Item = &'s str>,
{
    for css in selectors {
        let nodes = root.find_all(css);
        if !nodes.is_empty() {
            return nodes;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Page;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <body>
            <h2 id="sub">Subtitle</h2>
            <h1 id="main">Main Title</h1>
            <ul class="items">
                <li>Item One</li>
                <li>Item Two</li>
            </ul>
        </body>
        </html>
    "#;

    #[test]
    fn test_first_selector_wins_regardless_of_document_order() {
        let page = Page::parse(SAMPLE_HTML);
        let set = SelectorSet::new(["h1", "h2"]);
        let found = set.resolve(&page.root()).unwrap();
        assert_eq!(found.attr("id").as_deref(), Some("main"));
    }

    #[test]
    fn test_reordering_changes_result() {
        let page = Page::parse(SAMPLE_HTML);
        let forward = SelectorSet::new(["h1", "h2"]).resolve(&page.root()).unwrap();
        let reversed = SelectorSet::new(["h2", "h1"]).resolve(&page.root()).unwrap();
        assert_ne!(forward.attr("id"), reversed.attr("id"));
        assert_eq!(reversed.attr("id").as_deref(), Some("sub"));
    }

    #[test]
    fn test_falls_through_missing_and_invalid_selectors() {
        let page = Page::parse(SAMPLE_HTML);
        let set = SelectorSet::new(["article", "[[[invalid", "ul.items li"]);
        let found = set.resolve(&page.root()).unwrap();
        assert_eq!(found.text_content(), "Item One");
    }

    #[test]
    fn test_returns_none_when_nothing_matches() {
        let page = Page::parse(SAMPLE_HTML);
        let set = SelectorSet::new(["article", "section.nonexistent"]);
        assert!(set.resolve(&page.root()).is_none());
        assert!(SelectorSet::default().resolve(&page.root()).is_none());
    }

    #[test]
    fn test_resolve_all_uses_winning_selector_only() {
        let page = Page::parse(SAMPLE_HTML);
        let set = SelectorSet::new(["ol li", "ul.items li", "h1"]);
        let found = set.resolve_all(&page.root());
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_deserializes_from_plain_list() {
        let set: SelectorSet = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "a, b");
    }
}
