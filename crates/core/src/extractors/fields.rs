// ABOUTME: Field-level helpers shared by the extractors: text/attr reads, handles, counts and URLs.
// ABOUTME: Every helper reports a SectionMissing or MalformedAttribute error instead of panicking.

//! Generic field extraction utilities.
//!
//! Key behaviors:
//! - Text is whitespace-normalized; empty strings are treated as no match.
//! - Attribute reads distinguish a missing element (`SectionMissing`) from an
//!   element whose attribute does not parse (`MalformedAttribute`).
//! - Engagement labels only accept the comma-grouped `1,234` form.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::dom::{normalize_whitespace, PageNode};
use crate::error::ExtractError;
use crate::extractors::select::SelectorSet;

static COUNT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:,\d+)*").unwrap());

/// URL schemes allowed for media and avatar links.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "data"];

/// Normalized text of the element resolved by `selectors`.
pub fn text_field<N: PageNode>(
    root: &N,
    selectors: &SelectorSet,
    op: &str,
) -> Result<String, ExtractError> {
    let node = selectors
        .resolve(root)
        .ok_or_else(|| ExtractError::section_missing(op))?;
    let text = normalize_whitespace(&node.text_content());
    if text.is_empty() {
        return Err(ExtractError::section_missing(op));
    }
    Ok(text)
}

/// Trimmed, non-empty attribute value of `node`.
pub fn required_attr<N: PageNode>(node: &N, attr: &str, op: &str) -> Result<String, ExtractError> {
    match node.attr(attr) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(value) => Err(ExtractError::malformed_attribute(op, attr, &value)),
        None => Err(ExtractError::section_missing(op)),
    }
}

/// Derives `@handle` from a profile link such as `/jack` or `/jack/status/1`.
///
/// Returns `None` unless the href is a site-relative path with a non-empty
/// first segment.
pub fn handle_from_href(href: &str) -> Option<String> {
    let path = href.trim().strip_prefix('/')?;
    let segment = path.split(['/', '?', '#']).next().unwrap_or("");
    if segment.is_empty() {
        return None;
    }
    Some(format!("@{}", segment))
}

/// Parses the first comma-grouped integer in an accessible label.
///
/// `"1,234 Likes. Like"` → 1234, `"0 Likes"` → 0. Labels with no digits, or
/// with a count that does not fit in `u64`, yield `None`.
pub fn parse_count_label(label: &str) -> Option<u64> {
    let token = COUNT_TOKEN.find(label)?;
    token.as_str().replace(',', "").parse().ok()
}

/// Resolves a media `src` against `base` and rejects non-web schemes.
pub fn resolve_media_url(src: &str, base: Option<&Url>) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    let resolved = match Url::parse(src) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(src).ok()?,
        Err(_) => return None,
    };

    if !ALLOWED_SCHEMES.contains(&resolved.scheme()) {
        return None;
    }
    if resolved.scheme() == "data" {
        return Some(src.to_string());
    }
    Some(resolved.to_string())
}
