// ABOUTME: Configuration options for the ReadX reader: selector tables, base URL and reader settings.
// ABOUTME: ReaderBuilder provides a fluent API for constructing Reader instances with custom settings.

use url::Url;

use crate::extractors::article::ArticleSelectors;
use crate::extractors::tweet::TweetSelectors;
use crate::reader::Reader;
use crate::settings::ReaderSettings;

/// Default origin used to resolve relative media and link URLs.
pub const DEFAULT_BASE_URL: &str = "https://x.com/";

/// Configuration options for the reader.
#[derive(Debug, Clone)]
pub struct Options {
    pub tweet_selectors: TweetSelectors,
    pub article_selectors: ArticleSelectors,
    /// `None` leaves relative URLs unresolved; relative media is then dropped.
    pub base_url: Option<Url>,
    pub settings: ReaderSettings,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tweet_selectors: TweetSelectors::default(),
            article_selectors: ArticleSelectors::default(),
            base_url: Url::parse(DEFAULT_BASE_URL).ok(),
            settings: ReaderSettings::default(),
        }
    }
}

/// Builder for constructing Reader instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    opts: Options,
}

impl ReaderBuilder {
    /// Create a new ReaderBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Replace the tweet selector table.
    pub fn tweet_selectors(mut self, selectors: TweetSelectors) -> Self {
        self.opts.tweet_selectors = selectors;
        self
    }

    /// Replace the article selector table.
    pub fn article_selectors(mut self, selectors: ArticleSelectors) -> Self {
        self.opts.article_selectors = selectors;
        self
    }

    /// Set the base URL for relative links and media.
    pub fn base_url(mut self, url: Url) -> Self {
        self.opts.base_url = Some(url);
        self
    }

    /// Leave relative URLs unresolved.
    pub fn no_base_url(mut self) -> Self {
        self.opts.base_url = None;
        self
    }

    /// Set the typography settings used by full-page rendering. Values are clamped.
    pub fn settings(mut self, settings: ReaderSettings) -> Self {
        self.opts.settings = settings.clamped();
        self
    }

    /// Build the Reader with the configured options.
    pub fn build(self) -> Reader {
        Reader::new(self.opts)
    }
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
