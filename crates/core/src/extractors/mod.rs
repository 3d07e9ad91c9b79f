// ABOUTME: Extraction strategies for the two supported page layouts plus their shared building blocks.
// ABOUTME: Includes the tweet and article extractors, selector resolution and block classification.

//! Content extraction module.
//!
//! Submodules:
//! - `tweet`, `article`: one extractor per page layout, each driven by a
//!   serde-deserializable selector table.
//! - `author`: the author block, shared by both layouts.
//! - `select`: ordered multi-selector fallback.
//! - `classify`: block classification for article content.
//! - `fields`: text, attribute, count and URL helpers.
//! - `compiled`: process-wide cache of compiled selectors.

pub mod article;
pub mod author;
pub mod classify;
pub mod compiled;
pub mod fields;
pub mod select;
pub mod tweet;
