// ABOUTME: Normalized content model produced by extraction: tweets, articles, blocks and metadata.
// ABOUTME: All values are owned snapshots with no references back into the source document.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// The result of one extraction pass: exactly one tweet or one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NormalizedContent {
    Tweet(Tweet),
    Article(Article),
}

impl NormalizedContent {
    /// `"tweet"` or `"article"`.
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizedContent::Tweet(_) => "tweet",
            NormalizedContent::Article(_) => "article",
        }
    }

    /// Author of either kind, if one was found.
    pub fn author(&self) -> Option<&Author> {
        match self {
            NormalizedContent::Tweet(t) => t.author.as_ref(),
            NormalizedContent::Article(a) => a.author.as_ref(),
        }
    }

    /// Timestamp of either kind, if one was found.
    pub fn timestamp(&self) -> Option<&Timestamp> {
        match self {
            NormalizedContent::Tweet(t) => t.timestamp.as_ref(),
            NormalizedContent::Article(a) => a.timestamp.as_ref(),
        }
    }
}

/// A short-form post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub text: TweetText,
    pub author: Option<Author>,
    pub engagement: EngagementCounts,
    pub timestamp: Option<Timestamp>,
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub flags: TweetFlags,
}

/// Conversation context markers around a tweet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TweetFlags {
    pub is_thread: bool,
    pub is_retweet: bool,
    pub has_quote: bool,
}

impl TweetFlags {
    pub fn any(&self) -> bool {
        self.is_thread || self.is_retweet || self.has_quote
    }
}

/// Body of a tweet: plain text plus the original inline markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetText {
    pub text: String,
    /// Unsanitized inner HTML of the text node; sanitized at render time.
    pub html: String,
    pub language: Option<String>,
}

/// A long-form rich-text article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub author: Option<Author>,
    pub blocks: Vec<ContentBlock>,
    pub timestamp: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Author {
    pub display_name: String,
    /// `@handle`, or empty when no profile link was found.
    pub handle: String,
    pub verified: bool,
    pub avatar_url: Option<String>,
}

/// One structural unit of article body, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph { text: String, html: String },
    Heading { text: String, html: String },
    Quote { text: String, html: String },
    ListItem { text: String, html: String },
    Image { url: String, alt: String },
    Unknown { raw_html: String },
}

impl ContentBlock {
    /// Plain text of text-bearing blocks. `Image` and `Unknown` carry none.
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentBlock::Paragraph { text, .. }
            | ContentBlock::Heading { text, .. }
            | ContentBlock::Quote { text, .. }
            | ContentBlock::ListItem { text, .. } => Some(text),
            ContentBlock::Image { .. } | ContentBlock::Unknown { .. } => None,
        }
    }
}

/// Engagement metrics. `None` means the control was not readable, not zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngagementCounts {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub likes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub retweets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub replies: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bookmarks: Option<u64>,
}

impl EngagementCounts {
    /// True when no metric could be read.
    pub fn is_empty(&self) -> bool {
        self.likes.is_none()
            && self.retweets.is_none()
            && self.replies.is_none()
            && self.bookmarks.is_none()
    }
}

/// Publication time. Only constructed from a parseable ISO-8601 datetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub iso_datetime: String,
    pub display_text: String,
}

impl Timestamp {
    /// Validates `iso` and builds a timestamp, or returns `None` if it does not parse.
    pub fn new(iso: &str, display_text: &str) -> Option<Self> {
        let iso = iso.trim();
        parse_iso_datetime(iso)?;
        Some(Self {
            iso_datetime: iso.to_string(),
            display_text: display_text.trim().to_string(),
        })
    }

    /// The parsed instant in UTC.
    pub fn parsed(&self) -> Option<DateTime<Utc>> {
        parse_iso_datetime(&self.iso_datetime)
    }
}

fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Basic-format offsets such as `+0000`.
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    // Local date-times carry no offset and are read as UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    pub alt: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timestamp_requires_iso() {
        let ts = Timestamp::new("2024-06-15T12:00:00.000Z", " Jun 15 ").unwrap();
        assert_eq!(ts.display_text, "Jun 15");
        assert_eq!(
            ts.parsed().unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
        );
        assert!(Timestamp::new("yesterday", "yesterday").is_none());
        assert!(Timestamp::new("2024-13-40", "").is_none());
    }

    #[test]
    fn test_timestamp_accepts_other_iso_forms() {
        let noon = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        for iso in [
            "2024-06-15T12:00:00+0000",
            "2024-06-15T14:00:00+02:00",
            "2024-06-15T12:00:00",
            "2024-06-15T12:00:00.250",
            "2024-06-15T12:00",
        ] {
            let ts = Timestamp::new(iso, "").unwrap_or_else(|| panic!("rejected {}", iso));
            let parsed = ts.parsed().unwrap();
            assert_eq!(parsed.timestamp(), noon.timestamp(), "{}", iso);
            assert_eq!(ts.iso_datetime, iso);
        }

        let ts = Timestamp::new("2024-06-15", "Jun 15").unwrap();
        assert_eq!(
            ts.parsed().unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
        );
        assert!(Timestamp::new("", "").is_none());
    }

    #[test]
    fn test_engagement_absent_fields_are_not_serialized() {
        let counts = EngagementCounts {
            likes: Some(0),
            ..Default::default()
        };
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json, serde_json::json!({ "likes": 0 }));
        assert!(!counts.is_empty());
        assert!(EngagementCounts::default().is_empty());
    }

    #[test]
    fn test_content_is_tagged_by_kind() {
        let content = NormalizedContent::Article(Article {
            title: "T".to_string(),
            author: None,
            blocks: vec![ContentBlock::Image {
                url: "https://x/y.png".to_string(),
                alt: "cat".to_string(),
            }],
            timestamp: None,
        });
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["kind"], "article");
        assert_eq!(json["blocks"][0]["type"], "image");
        assert_eq!(content.kind(), "article");

        let back: NormalizedContent = serde_json::from_value(json).unwrap();
        assert_eq!(back, content);
    }

    #[test]
    fn test_block_text_accessor() {
        let p = ContentBlock::Paragraph {
            text: "hi".to_string(),
            html: "hi".to_string(),
        };
        assert_eq!(p.text(), Some("hi"));
        let img = ContentBlock::Image {
            url: "u".to_string(),
            alt: String::new(),
        };
        assert_eq!(img.text(), None);
    }
}
