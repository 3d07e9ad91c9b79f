// ABOUTME: Main library entry point for ReadX, the tweet and article reading-mode extractor.
// ABOUTME: Re-exports the public API: Reader, ReaderBuilder, NormalizedContent, ExtractError, ErrorCode, render.

//! ReadX - extract tweets and long-form articles from a social-media page and
//! re-render them as a clean reading view.
//!
//! Extraction runs over any tree implementing [`PageNode`]; [`Page`] wraps a
//! parsed HTML document for the common case.
//!
//! # Example
//!
//! ```no_run
//! use readx_core::{render, Reader, ExtractError};
//!
//! fn main() -> Result<(), ExtractError> {
//!     let html = std::fs::read_to_string("tweet.html").unwrap_or_default();
//!     let reader = Reader::builder().build();
//!     let content = reader.extract_html(&html)?;
//!     println!("{}", render(&content));
//!     Ok(())
//! }
//! ```

pub mod content;
pub mod detect;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod formats;
pub mod options;
pub mod reader;
pub mod reading_mode;
pub mod render;
pub mod settings;

pub use crate::content::{
    Article, Author, ContentBlock, EngagementCounts, MediaItem, NormalizedContent, Timestamp,
    Tweet, TweetFlags, TweetText,
};
pub use crate::detect::{detect, PageType};
pub use crate::dom::{Page, PageNode};
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractors::article::{ArticleExtractor, ArticleSelectors};
pub use crate::extractors::author::AuthorSelectors;
pub use crate::extractors::classify::BlockType;
pub use crate::extractors::select::{resolve, SelectorSet};
pub use crate::extractors::tweet::{
    EngagementSelectors, FlagSelectors, TweetExtractor, TweetSelectors,
};
pub use crate::formats::OutputFormat;
pub use crate::options::{Options, ReaderBuilder};
pub use crate::reader::{detect_and_extract, Reader};
pub use crate::reading_mode::{ReadingMode, Transition};
pub use crate::render::{render, render_markdown, render_page, render_text, Renderer};
pub use crate::settings::{
    FontFamily, JsonFileStore, MemoryStore, ReaderSettings, SettingsStore, Theme,
};
