// ABOUTME: The Reader facade: detects the page type, runs the matching extractor and renders the result.
// ABOUTME: Immutable after build, so one instance can serve any number of pages and threads.

use once_cell::sync::Lazy;

use crate::content::NormalizedContent;
use crate::detect::{detect, PageType};
use crate::dom::{Page, PageNode};
use crate::error::ExtractError;
use crate::extractors::article::ArticleExtractor;
use crate::extractors::compiled::precompile_selectors;
use crate::extractors::tweet::TweetExtractor;
use crate::formats::OutputFormat;
use crate::options::{Options, ReaderBuilder};
use crate::reading_mode::ReadingMode;
use crate::render::Renderer;
use crate::settings::ReaderSettings;

static DEFAULT_READER: Lazy<Reader> = Lazy::new(|| Reader::builder().build());

/// Extracts and renders tweet and article pages.
#[derive(Debug, Clone)]
pub struct Reader {
    opts: Options,
    tweet: TweetExtractor,
    article: ArticleExtractor,
    renderer: Renderer,
}

impl Reader {
    /// Create a new ReaderBuilder for configuring the reader.
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::new()
    }

    /// Create a reader from options, compiling every configured selector up front.
    pub fn new(opts: Options) -> Self {
        precompile_selectors(opts.tweet_selectors.all());
        precompile_selectors(opts.article_selectors.all());

        Self {
            tweet: TweetExtractor::new(opts.tweet_selectors.clone(), opts.base_url.clone()),
            article: ArticleExtractor::new(opts.article_selectors.clone(), opts.base_url.clone()),
            renderer: Renderer::new(opts.base_url.clone()),
            opts,
        }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Decide whether `root` holds an article or a tweet.
    pub fn detect<N: PageNode>(&self, root: &N) -> PageType {
        detect(root, self.article.selectors())
    }

    /// Detect the page type and run the matching extractor.
    ///
    /// Each call re-reads the document; nothing is cached between calls.
    pub fn detect_and_extract<N: PageNode>(
        &self,
        root: &N,
    ) -> Result<NormalizedContent, ExtractError> {
        let content = match self.detect(root) {
            PageType::Article => NormalizedContent::Article(self.article.extract(root)?),
            PageType::Tweet => NormalizedContent::Tweet(self.tweet.extract(root)?),
        };
        tracing::debug!(kind = content.kind(), "extracted content");
        Ok(content)
    }

    /// Parse an HTML document and extract its content.
    pub fn extract_html(&self, html: &str) -> Result<NormalizedContent, ExtractError> {
        let page = Page::parse(html);
        self.detect_and_extract(&page.root())
    }

    /// HTML fragment for the reading view.
    pub fn render(&self, content: &NormalizedContent) -> String {
        self.renderer.render(content)
    }

    /// Full reading-mode document using the configured settings.
    pub fn render_page(&self, content: &NormalizedContent) -> String {
        self.renderer.render_page(content, &self.opts.settings)
    }

    /// Full reading-mode document using explicit settings.
    pub fn render_page_with(&self, content: &NormalizedContent, settings: &ReaderSettings) -> String {
        self.renderer.render_page(content, settings)
    }

    /// Render `content` in the requested output format.
    pub fn format(
        &self,
        content: &NormalizedContent,
        format: OutputFormat,
    ) -> Result<String, serde_json::Error> {
        Ok(match format {
            OutputFormat::Html => self.render(content),
            OutputFormat::Markdown => self.renderer.render_markdown(content),
            OutputFormat::Text => self.renderer.render_text(content),
            OutputFormat::Json => serde_json::to_string_pretty(content)?,
        })
    }

    /// Switch `mode` into reading mode for `page_html`.
    ///
    /// The page markup becomes the snapshot and the returned string is the
    /// reading-mode document. If extraction fails the mode stays inactive.
    /// Returns `Ok(None)` when reading mode is already active.
    pub fn enter_reading_mode(
        &self,
        mode: &mut ReadingMode<String>,
        page_html: &str,
    ) -> Result<Option<String>, ExtractError> {
        mode.try_enter(page_html.to_string(), |snapshot| {
            let content = self.extract_html(snapshot)?;
            Ok(self.render_page(&content))
        })
    }
}

impl Default for Reader {
    fn default() -> Self {
        Reader::builder().build()
    }
}

/// Detect and extract with the default selector tables.
pub fn detect_and_extract<N: PageNode>(root: &N) -> Result<NormalizedContent, ExtractError> {
    DEFAULT_READER.detect_and_extract(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    const TWEET: &str = r#"<article data-testid="tweet">
        <div data-testid="User-Name"><div>Ada</div><div><a href="/ada">@ada</a></div></div>
        <div data-testid="tweetText" lang="en">hello</div>
        <div data-testid="tweetPhoto"><img src="/media/1.jpg"></div>
    </article>"#;

    #[test]
    fn test_detect_and_extract_tweet() {
        let content = Reader::default().extract_html(TWEET).unwrap();
        assert_eq!(content.kind(), "tweet");
        let NormalizedContent::Tweet(tweet) = content else {
            panic!("expected tweet");
        };
        assert_eq!(tweet.text.text, "hello");
        assert_eq!(tweet.media[0].url, "https://x.com/media/1.jpg");
    }

    #[test]
    fn test_without_base_relative_media_is_dropped() {
        let reader = Reader::builder().no_base_url().build();
        let NormalizedContent::Tweet(tweet) = reader.extract_html(TWEET).unwrap() else {
            panic!("expected tweet");
        };
        assert!(tweet.media.is_empty());
    }

    #[test]
    fn test_free_function_matches_reader() {
        let page = Page::parse(TWEET);
        let a = detect_and_extract(&page.root()).unwrap();
        let b = Reader::default().detect_and_extract(&page.root()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_marker_only_page_is_tweet_path() {
        let html = r#"<div data-testid="twitterArticleRichTextView"></div>"#;
        let err = Reader::default().extract_html(html).unwrap_err();
        assert_eq!(err.code, ErrorCode::ContainerNotFound);
    }

    #[test]
    fn test_format_json_is_tagged() {
        let reader = Reader::default();
        let content = reader.extract_html(TWEET).unwrap();
        let json = reader.format(&content, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "tweet");
        assert_eq!(value["text"]["language"], "en");
    }

    #[test]
    fn test_enter_reading_mode() {
        let reader = Reader::default();
        let mut mode = ReadingMode::new();

        let err = reader
            .enter_reading_mode(&mut mode, "<p>nothing</p>")
            .unwrap_err();
        assert!(err.is_container_not_found());
        assert!(!mode.is_active());

        let page = reader.enter_reading_mode(&mut mode, TWEET).unwrap().unwrap();
        assert!(page.contains("readx-reading-mode"));
        assert!(mode.is_active());
        assert_eq!(mode.exit().as_deref(), Some(TWEET));
    }
}
