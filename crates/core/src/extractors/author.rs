// ABOUTME: Author block extraction shared by the tweet and article extractors.
// ABOUTME: Both page layouts use the same author fingerprint, so one selector table serves both.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::content::Author;
use crate::dom::PageNode;
use crate::error::{degrade, ExtractError};
use crate::extractors::fields::{handle_from_href, required_attr, resolve_media_url, text_field};
use crate::extractors::select::SelectorSet;

/// Selector table for the author block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorSelectors {
    pub name: SelectorSet,
    pub handle: SelectorSet,
    pub verified: SelectorSet,
    pub avatar: SelectorSet,
}

impl Default for AuthorSelectors {
    fn default() -> Self {
        Self {
            name: SelectorSet::new([
                r#"[data-testid="User-Name"] > div:first-child"#,
                r#"[data-testid="User-Name"]"#,
            ]),
            // Only profile links inside the name block; nav links are not authors.
            handle: SelectorSet::single(r#"[data-testid="User-Name"] a[href^="/"]"#),
            verified: SelectorSet::new([
                r#"svg[data-testid="icon-verified"]"#,
                r#"[data-testid="icon-verified"]"#,
            ]),
            avatar: SelectorSet::new([
                r#"[data-testid="Tweet-User-Avatar"] img"#,
                r#"[data-testid="UserAvatar-Container"] img"#,
            ]),
        }
    }
}

impl AuthorSelectors {
    /// Every selector in the table, for precompilation.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.name
            .iter()
            .chain(self.handle.iter())
            .chain(self.verified.iter())
            .chain(self.avatar.iter())
    }
}

/// Extracts the author under `root`.
///
/// Fails with `SectionMissing` only when neither a display name nor a handle
/// can be read; the badge and avatar are optional.
pub fn extract_author<N: PageNode>(
    root: &N,
    selectors: &AuthorSelectors,
    base: Option<&Url>,
) -> Result<Author, ExtractError> {
    let display_name = degrade(text_field(root, &selectors.name, "author.name"));
    let handle = degrade(extract_handle(root, &selectors.handle));

    if display_name.is_none() && handle.is_none() {
        return Err(ExtractError::section_missing("author"));
    }

    let verified = selectors.verified.resolve(root).is_some();
    let avatar_url = degrade(extract_avatar(root, &selectors.avatar, base));

    Ok(Author {
        display_name: display_name.unwrap_or_default(),
        handle: handle.unwrap_or_default(),
        verified,
        avatar_url,
    })
}

fn extract_handle<N: PageNode>(root: &N, selectors: &SelectorSet) -> Result<String, ExtractError> {
    let link = selectors
        .resolve(root)
        .ok_or_else(|| ExtractError::section_missing("author.handle"))?;
    let href = required_attr(&link, "href", "author.handle")?;
    handle_from_href(&href)
        .ok_or_else(|| ExtractError::malformed_attribute("author.handle", "href", &href))
}

fn extract_avatar<N: PageNode>(
    root: &N,
    selectors: &SelectorSet,
    base: Option<&Url>,
) -> Result<String, ExtractError> {
    let img = selectors
        .resolve(root)
        .ok_or_else(|| ExtractError::section_missing("author.avatar"))?;
    let src = required_attr(&img, "src", "author.avatar")?;
    resolve_media_url(&src, base)
        .ok_or_else(|| ExtractError::malformed_attribute("author.avatar", "src", &src))
}
