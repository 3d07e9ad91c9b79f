// ABOUTME: Page-type detection from DOM fingerprints: rich-text article or short-form tweet.
// ABOUTME: A pure probe with no memoization; the document is re-inspected on every call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dom::PageNode;
use crate::extractors::article::ArticleSelectors;

/// Layout of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Article,
    Tweet,
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PageType::Article => "article",
            PageType::Tweet => "tweet",
        };
        write!(f, "{}", s)
    }
}

/// Decides the page type.
///
/// The page is an article only when the rich-text view marker, an editor
/// root, and at least one content block are all present anywhere in the
/// document. Any missing fingerprint means tweet.
pub fn detect<N: PageNode>(root: &N, selectors: &ArticleSelectors) -> PageType {
    let has_view = selectors.view.resolve(root).is_some();
    let has_editor = selectors.editor_root.resolve(root).is_some();
    let has_blocks = selectors.blocks.resolve(root).is_some();

    let page_type = if has_view && has_editor && has_blocks {
        PageType::Article
    } else {
        PageType::Tweet
    };
    tracing::debug!(has_view, has_editor, has_blocks, %page_type, "detected page type");
    page_type
}
