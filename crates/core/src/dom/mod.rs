// ABOUTME: DOM access capability used by every extractor, plus the scraper-backed implementation.
// ABOUTME: Extractors are generic over PageNode so one core serves every host tree.

//! DOM access for extraction.
//!
//! The extractors never touch a concrete HTML library directly. They query
//! through [`PageNode`], a small read-only capability: find the first or all
//! descendants matching a CSS selector, and read tag, attributes, text and
//! inner HTML. [`Page`] owns a parsed document and hands out
//! `scraper::ElementRef` roots, which implement the trait.

use scraper::{ElementRef, Html};

use crate::extractors::compiled::get_or_compile;

/// Read-only query capability over one element of a document tree.
///
/// Queries search descendants of `self` only, mirroring
/// `querySelector`/`querySelectorAll` called on an element.
pub trait PageNode: Clone {
    /// First descendant matching `css`, in document order.
    fn find_first(&self, css: &str) -> Option<Self>;

    /// All descendants matching `css`, in document order.
    fn find_all(&self, css: &str) -> Vec<Self>;

    /// Lowercase tag name, e.g. `section`.
    fn tag_name(&self) -> String;

    /// Raw attribute value, if present.
    fn attr(&self, name: &str) -> Option<String>;

    /// Concatenated text of all descendant text nodes.
    fn text_content(&self) -> String;

    /// Serialized children of this element.
    fn inner_html(&self) -> String;

    /// The raw `class` attribute, or an empty string.
    fn class_attr(&self) -> String {
        self.attr("class").unwrap_or_default()
    }

    /// True when at least one descendant matches `css`.
    fn contains(&self, css: &str) -> bool {
        self.find_first(css).is_some()
    }
}

impl<'a> PageNode for ElementRef<'a> {
    fn find_first(&self, css: &str) -> Option<Self> {
        let selector = get_or_compile(css)?;
        let found = self.select(&selector).next();
        found
    }

    fn find_all(&self, css: &str) -> Vec<Self> {
        match get_or_compile(css) {
            Some(selector) => {
                let found: Vec<_> = self.select(&selector).collect();
                found
            }
            None => Vec::new(),
        }
    }

    fn tag_name(&self) -> String {
        self.value().name().to_ascii_lowercase()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn inner_html(&self) -> String {
        ElementRef::inner_html(self)
    }
}

/// A parsed HTML document snapshot.
pub struct Page {
    html: Html,
}

impl Page {
    /// Parse a full HTML document. Parsing never fails; malformed markup is repaired.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// The document element, used as the search root for extraction.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }
}

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <html><body>
            <div id="outer" class="a b">
                <p>First <b>bold</b></p>
                <p>Second</p>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_find_first_and_all() {
        let page = Page::parse(SAMPLE_HTML);
        let root = page.root();
        let outer = root.find_first("#outer").unwrap();
        assert_eq!(outer.tag_name(), "div");
        assert_eq!(outer.class_attr(), "a b");
        assert_eq!(outer.find_all("p").len(), 2);
        assert_eq!(outer.find_first("p").unwrap().text_content(), "First bold");
    }

    #[test]
    fn test_queries_search_descendants_only() {
        let page = Page::parse(SAMPLE_HTML);
        let outer = page.root().find_first("#outer").unwrap();
        assert!(outer.find_first("#outer").is_none());
        assert!(outer.contains("b"));
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let page = Page::parse(SAMPLE_HTML);
        assert!(page.root().find_first("[[[").is_none());
        assert!(page.root().find_all("[[[").is_empty());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("no\textra\nspaces"), "no extra spaces");
        assert_eq!(normalize_whitespace(""), "");
    }
}
