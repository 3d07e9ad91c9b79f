// ABOUTME: Article extractor for the rich-text long-form layout.
// ABOUTME: Enumerates content blocks in document order, classifies each, and drops empty ones.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::content::{Article, ContentBlock};
use crate::dom::PageNode;
use crate::error::{degrade, ExtractError};
use crate::extractors::author::{extract_author, AuthorSelectors};
use crate::extractors::classify::{block_text, classify, BlockType};
use crate::extractors::fields::{required_attr, resolve_media_url};
use crate::extractors::select::SelectorSet;
use crate::extractors::tweet::extract_timestamp;

/// Title used when neither the title element nor a heading exists.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Selector table for the article layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleSelectors {
    /// Marker element wrapping the rich-text view.
    pub view: SelectorSet,
    /// Editor root, searched inside the view.
    pub editor_root: SelectorSet,
    /// Content-block nodes, searched inside the editor root.
    pub blocks: SelectorSet,
    /// Dedicated title element, searched from the document root.
    pub title: SelectorSet,
    /// Heading fallback for the title, searched inside the editor root.
    pub title_fallback: SelectorSet,
    pub author: AuthorSelectors,
    pub timestamp: SelectorSet,
}

impl Default for ArticleSelectors {
    fn default() -> Self {
        Self {
            view: SelectorSet::single(r#"[data-testid="twitterArticleRichTextView"]"#),
            editor_root: SelectorSet::single(".DraftEditor-root"),
            blocks: SelectorSet::single(r#"[data-block="true"]"#),
            title: SelectorSet::single(r#"[data-testid="twitter-article-title"]"#),
            title_fallback: SelectorSet::single(".longform-header-two, h2"),
            author: AuthorSelectors::default(),
            timestamp: SelectorSet::single("time[datetime]"),
        }
    }
}

impl ArticleSelectors {
    /// Every selector in the table, for precompilation.
    pub fn all(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        out.extend(self.view.iter());
        out.extend(self.editor_root.iter());
        out.extend(self.blocks.iter());
        out.extend(self.title.iter());
        out.extend(self.title_fallback.iter());
        out.extend(self.author.all());
        out.extend(self.timestamp.iter());
        out
    }
}

/// Builds [`Article`] records from the rich-text layout.
#[derive(Debug, Clone, Default)]
pub struct ArticleExtractor {
    selectors: ArticleSelectors,
    base_url: Option<Url>,
}

impl ArticleExtractor {
    pub fn new(selectors: ArticleSelectors, base_url: Option<Url>) -> Self {
        Self {
            selectors,
            base_url,
        }
    }

    pub fn selectors(&self) -> &ArticleSelectors {
        &self.selectors
    }

    /// Locates the editor root: the view marker first, then the editor inside it.
    pub fn editor_root<N: PageNode>(&self, root: &N) -> Result<N, ExtractError> {
        let view = self
            .selectors
            .view
            .resolve(root)
            .ok_or_else(|| ExtractError::editor_root_not_found("article.view"))?;
        self.selectors
            .editor_root
            .resolve(&view)
            .ok_or_else(|| ExtractError::editor_root_not_found("article.editor_root"))
    }

    /// Extracts the article under `root`.
    pub fn extract<N: PageNode>(&self, root: &N) -> Result<Article, ExtractError> {
        let editor = self.editor_root(root)?;
        let base = self.base_url.as_ref();

        Ok(Article {
            title: self.extract_title(root, &editor),
            author: degrade(extract_author(root, &self.selectors.author, base)),
            blocks: self.extract_blocks(&editor),
            timestamp: degrade(extract_timestamp(root, &self.selectors.timestamp)),
        })
    }

    fn extract_title<N: PageNode>(&self, root: &N, editor: &N) -> String {
        let non_empty = |node: N| {
            let text = block_text(&node);
            (!text.trim().is_empty()).then_some(text)
        };
        self.selectors
            .title
            .resolve(root)
            .and_then(non_empty)
            .or_else(|| self.selectors.title_fallback.resolve(editor).and_then(non_empty))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    /// Classifies every block in document order; blocks with no usable content are dropped.
    pub fn extract_blocks<N: PageNode>(&self, editor: &N) -> Vec<ContentBlock> {
        self.selectors
            .blocks
            .resolve_all(editor)
            .iter()
            .filter_map(|node| degrade(self.extract_block(node)))
            .collect()
    }

    fn extract_block<N: PageNode>(&self, node: &N) -> Result<ContentBlock, ExtractError> {
        let block_type = classify(node);
        if block_type == BlockType::Image {
            return self.image_block(node);
        }

        let text = block_text(node);
        if text.trim().is_empty() {
            return Err(ExtractError::section_missing("article.block"));
        }
        let html = node.inner_html();

        Ok(match block_type {
            BlockType::Paragraph => ContentBlock::Paragraph { text, html },
            BlockType::Heading => ContentBlock::Heading { text, html },
            BlockType::Quote => ContentBlock::Quote { text, html },
            BlockType::ListItem => ContentBlock::ListItem { text, html },
            BlockType::Image | BlockType::Unknown => ContentBlock::Unknown { raw_html: html },
        })
    }

    fn image_block<N: PageNode>(&self, node: &N) -> Result<ContentBlock, ExtractError> {
        let img = node
            .find_first("img")
            .ok_or_else(|| ExtractError::section_missing("article.image"))?;
        let src = required_attr(&img, "src", "article.image")?;
        let url = resolve_media_url(&src, self.base_url.as_ref())
            .ok_or_else(|| ExtractError::malformed_attribute("article.image", "src", &src))?;
        Ok(ContentBlock::Image {
            url,
            alt: img.attr("alt").unwrap_or_default().trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Page;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    fn article_html(blocks: &str) -> String {
        format!(
            r#"<html><body>
            <div data-testid="User-Name"><div><span>Writer</span></div>
                <div><a href="/writer">@writer</a></div></div>
            <time datetime="2025-01-02T03:04:05.000Z">Jan 2</time>
            <div data-testid="twitterArticleRichTextView">
                <div class="DraftEditor-root"><div class="public-DraftEditor-content">{}</div></div>
            </div>
            </body></html>"#,
            blocks
        )
    }

    fn extract(html: &str) -> Result<Article, ExtractError> {
        let page = Page::parse(html);
        ArticleExtractor::default().extract(&page.root())
    }

    #[test]
    fn test_blocks_in_document_order() {
        let html = article_html(
            r#"
            <div data-block="true" class="longform-header-two"><span data-text="true">Intro</span></div>
            <div data-block="true" class="longform-unstyled"><span data-text="true">Body</span></div>
            <div data-block="true" class="longform-blockquote"><span data-text="true">Said</span></div>
            <section data-block="true"><img src="https://x/y.png" alt="cat"></section>
            <div data-block="true" class="longform-unordered-list-item"><span data-text="true">one</span></div>
            "#,
        );
        let article = extract(&html).unwrap();
        let kinds: Vec<&str> = article
            .blocks
            .iter()
            .map(|b| match b {
                ContentBlock::Heading { .. } => "heading",
                ContentBlock::Paragraph { .. } => "paragraph",
                ContentBlock::Quote { .. } => "quote",
                ContentBlock::Image { .. } => "image",
                ContentBlock::ListItem { .. } => "list",
                ContentBlock::Unknown { .. } => "unknown",
            })
            .collect();
        assert_eq!(kinds, vec!["heading", "paragraph", "quote", "image", "list"]);
        assert_eq!(
            article.blocks[3],
            ContentBlock::Image {
                url: "https://x/y.png".to_string(),
                alt: "cat".to_string(),
            }
        );
        assert_eq!(article.blocks[0].text(), Some("Intro"));
    }

    #[test]
    fn test_title_and_metadata() {
        let html = article_html(
            r#"<div data-block="true" class="longform-unstyled"><span data-text="true">Body</span></div>"#,
        )
        .replace(
            "<div data-testid=\"twitterArticleRichTextView\">",
            "<div data-testid=\"twitter-article-title\">My Title</div><div data-testid=\"twitterArticleRichTextView\">",
        );
        let article = extract(&html).unwrap();
        assert_eq!(article.title, "My Title");
        let author = article.author.unwrap();
        assert_eq!(author.display_name, "Writer");
        assert_eq!(author.handle, "@writer");
        assert_eq!(
            article.timestamp.unwrap().iso_datetime,
            "2025-01-02T03:04:05.000Z"
        );
    }

    #[test]
    fn test_title_falls_back_to_first_heading() {
        let html = article_html(
            r#"<div data-block="true" class="longform-header-two"><span data-text="true">Heading Title</span></div>"#,
        );
        assert_eq!(extract(&html).unwrap().title, "Heading Title");
    }

    #[test]
    fn test_empty_title_element_falls_back_to_heading() {
        let html = article_html(
            r#"<div data-block="true" class="longform-header-two"><span data-text="true">Heading Title</span></div>"#,
        )
        .replace(
            "<div data-testid=\"twitterArticleRichTextView\">",
            "<div data-testid=\"twitter-article-title\">  </div><div data-testid=\"twitterArticleRichTextView\">",
        );
        assert_eq!(extract(&html).unwrap().title, "Heading Title");
    }

    #[test]
    fn test_title_defaults_to_untitled() {
        let html = article_html(
            r#"<div data-block="true" class="longform-unstyled"><span data-text="true">Body</span></div>"#,
        );
        assert_eq!(extract(&html).unwrap().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_empty_article_is_valid() {
        let article = extract(&article_html("")).unwrap();
        assert!(article.blocks.is_empty());
        assert_eq!(article.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_empty_blocks_and_srcless_images_are_dropped() {
        let html = article_html(
            r#"
            <div data-block="true" class="longform-unstyled"><span data-text="true"></span></div>
            <section data-block="true"><img alt="no src"></section>
            <div data-block="true" class="longform-unstyled"><span data-text="true">kept</span></div>
            "#,
        );
        let article = extract(&html).unwrap();
        assert_eq!(article.blocks.len(), 1);
        assert_eq!(article.blocks[0].text(), Some("kept"));
    }

    #[test]
    fn test_unknown_block_keeps_raw_html() {
        let html = article_html(r#"<div data-block="true" class="atomic"><em>odd</em></div>"#);
        let article = extract(&html).unwrap();
        assert_eq!(
            article.blocks,
            vec![ContentBlock::Unknown {
                raw_html: "<em>odd</em>".to_string()
            }]
        );
    }

    #[test]
    fn test_nav_link_without_name_block_leaves_author_empty() {
        let html = article_html(
            r#"<div data-block="true" class="longform-unstyled"><span data-text="true">Body</span></div>"#,
        )
        .replace(
            r#"<div data-testid="User-Name"><div><span>Writer</span></div>
                <div><a href="/writer">@writer</a></div></div>"#,
            r#"<nav><a role="link" href="/home">Home</a></nav>"#,
        );
        assert!(html.contains("/home"));
        assert_eq!(extract(&html).unwrap().author, None);
    }

    #[test]
    fn test_missing_editor_root() {
        let html = r#"<div data-testid="twitterArticleRichTextView"><p>loading</p></div>"#;
        let err = extract(html).unwrap_err();
        assert_eq!(err.code, ErrorCode::EditorRootNotFound);
        assert_eq!(err.reason(), "not-initialized");

        let err = extract("<p>plain</p>").unwrap_err();
        assert!(err.is_editor_root_not_found());
    }
}
