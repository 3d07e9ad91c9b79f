// ABOUTME: Tweet extractor: locates the post container and builds a normalized Tweet record.
// ABOUTME: Only the container and text are required; every other section degrades to an omitted field.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::content::{EngagementCounts, MediaItem, Timestamp, Tweet, TweetFlags, TweetText};
use crate::dom::PageNode;
use crate::error::{degrade, ExtractError};
use crate::extractors::author::{extract_author, AuthorSelectors};
use crate::extractors::fields::{parse_count_label, required_attr, resolve_media_url};
use crate::extractors::select::SelectorSet;

/// Engagement controls, one selector set per metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementSelectors {
    pub likes: SelectorSet,
    pub retweets: SelectorSet,
    pub replies: SelectorSet,
    pub bookmarks: SelectorSet,
}

impl Default for EngagementSelectors {
    fn default() -> Self {
        Self {
            likes: SelectorSet::new([
                r#"button[data-testid="like"]"#,
                r#"button[data-testid="unlike"]"#,
            ]),
            retweets: SelectorSet::new([
                r#"button[data-testid="retweet"]"#,
                r#"button[data-testid="unretweet"]"#,
            ]),
            replies: SelectorSet::single(r#"button[data-testid="reply"]"#),
            bookmarks: SelectorSet::new([
                r#"button[data-testid="bookmark"]"#,
                r#"button[data-testid="removeBookmark"]"#,
            ]),
        }
    }
}

/// Markers for thread, repost and quote context, searched inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagSelectors {
    pub thread: SelectorSet,
    pub retweet: SelectorSet,
    pub quote: SelectorSet,
}

impl Default for FlagSelectors {
    fn default() -> Self {
        Self {
            thread: SelectorSet::new([
                r#"[href*="/thread"]"#,
                r#"div[aria-label*="thread"]"#,
            ]),
            retweet: SelectorSet::single(r#"[data-testid="socialContext"]"#),
            quote: SelectorSet::single(r#"[data-testid="quoteTweet"]"#),
        }
    }
}

/// Selector table for the tweet layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweetSelectors {
    pub container: SelectorSet,
    pub text: SelectorSet,
    pub author: AuthorSelectors,
    pub engagement: EngagementSelectors,
    pub timestamp: SelectorSet,
    pub media: SelectorSet,
    pub flags: FlagSelectors,
}

impl Default for TweetSelectors {
    fn default() -> Self {
        Self {
            container: SelectorSet::new([
                r#"article[data-testid="tweet"]"#,
                r#"article[role="article"]"#,
                "article[aria-labelledby]",
            ]),
            text: SelectorSet::new([
                r#"div[data-testid="tweetText"]"#,
                "[lang] > span",
                r#"article div[dir="auto"]"#,
            ]),
            author: AuthorSelectors::default(),
            engagement: EngagementSelectors::default(),
            timestamp: SelectorSet::single("time[datetime]"),
            media: SelectorSet::single(r#"div[data-testid="tweetPhoto"] img"#),
            flags: FlagSelectors::default(),
        }
    }
}

impl TweetSelectors {
    /// Every selector in the table, for precompilation.
    pub fn all(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        out.extend(self.container.iter());
        out.extend(self.text.iter());
        out.extend(self.author.all());
        out.extend(self.engagement.likes.iter());
        out.extend(self.engagement.retweets.iter());
        out.extend(self.engagement.replies.iter());
        out.extend(self.engagement.bookmarks.iter());
        out.extend(self.timestamp.iter());
        out.extend(self.media.iter());
        out.extend(self.flags.thread.iter());
        out.extend(self.flags.retweet.iter());
        out.extend(self.flags.quote.iter());
        out
    }
}

/// Builds [`Tweet`] records from the tweet page layout.
#[derive(Debug, Clone, Default)]
pub struct TweetExtractor {
    selectors: TweetSelectors,
    base_url: Option<Url>,
}

impl TweetExtractor {
    pub fn new(selectors: TweetSelectors, base_url: Option<Url>) -> Self {
        Self {
            selectors,
            base_url,
        }
    }

    pub fn selectors(&self) -> &TweetSelectors {
        &self.selectors
    }

    /// Extracts the first tweet under `root`.
    pub fn extract<N: PageNode>(&self, root: &N) -> Result<Tweet, ExtractError> {
        let container = self
            .selectors
            .container
            .resolve(root)
            .ok_or_else(|| ExtractError::container_not_found("tweet.container"))?;

        let text = self.extract_text(&container)?;
        let base = self.base_url.as_ref();

        Ok(Tweet {
            text,
            author: degrade(extract_author(&container, &self.selectors.author, base)),
            engagement: self.extract_engagement(&container),
            timestamp: degrade(extract_timestamp(&container, &self.selectors.timestamp)),
            media: self.extract_media(&container),
            flags: self.extract_flags(&container),
        })
    }

    fn extract_flags<N: PageNode>(&self, container: &N) -> TweetFlags {
        let flags = &self.selectors.flags;
        TweetFlags {
            is_thread: flags.thread.resolve(container).is_some(),
            is_retweet: flags.retweet.resolve(container).is_some(),
            has_quote: flags.quote.resolve(container).is_some(),
        }
    }

    fn extract_text<N: PageNode>(&self, container: &N) -> Result<TweetText, ExtractError> {
        let node = self
            .selectors
            .text
            .resolve(container)
            .ok_or_else(|| ExtractError::text_not_found("tweet.text"))?;

        Ok(TweetText {
            text: node.text_content().trim().to_string(),
            html: node.inner_html(),
            language: node
                .attr("lang")
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        })
    }

    fn extract_engagement<N: PageNode>(&self, container: &N) -> EngagementCounts {
        let sel = &self.selectors.engagement;
        EngagementCounts {
            likes: degrade(extract_metric(container, &sel.likes, "engagement.likes")),
            retweets: degrade(extract_metric(container, &sel.retweets, "engagement.retweets")),
            replies: degrade(extract_metric(container, &sel.replies, "engagement.replies")),
            bookmarks: degrade(extract_metric(container, &sel.bookmarks, "engagement.bookmarks")),
        }
    }

    fn extract_media<N: PageNode>(&self, container: &N) -> Vec<MediaItem> {
        self.selectors
            .media
            .resolve_all(container)
            .iter()
            .filter_map(|img| degrade(media_item(img, self.base_url.as_ref())))
            .collect()
    }
}

/// Reads one metric from its control's accessible label.
fn extract_metric<N: PageNode>(
    container: &N,
    selectors: &SelectorSet,
    op: &str,
) -> Result<u64, ExtractError> {
    let control = selectors
        .resolve(container)
        .ok_or_else(|| ExtractError::section_missing(op))?;
    let label = required_attr(&control, "aria-label", op)?;
    parse_count_label(&label).ok_or_else(|| ExtractError::malformed_attribute(op, "aria-label", &label))
}

/// Reads the machine datetime and display label of a `time` element.
pub(crate) fn extract_timestamp<N: PageNode>(
    root: &N,
    selectors: &SelectorSet,
) -> Result<Timestamp, ExtractError> {
    let time = selectors
        .resolve(root)
        .ok_or_else(|| ExtractError::section_missing("timestamp"))?;
    let iso = required_attr(&time, "datetime", "timestamp")?;
    Timestamp::new(&iso, &time.text_content())
        .ok_or_else(|| ExtractError::malformed_attribute("timestamp", "datetime", &iso))
}

fn media_item<N: PageNode>(img: &N, base: Option<&Url>) -> Result<MediaItem, ExtractError> {
    let src = required_attr(img, "src", "tweet.media")?;
    let url = resolve_media_url(&src, base)
        .ok_or_else(|| ExtractError::malformed_attribute("tweet.media", "src", &src))?;
    Ok(MediaItem {
        url,
        alt: img.attr("alt").unwrap_or_default().trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Page;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    const TWEET_HTML: &str = r#"
        <html><body>
        <article data-testid="tweet" role="article">
            <div data-testid="Tweet-User-Avatar"><img src="https://pbs.twimg.com/a.jpg"></div>
            <div data-testid="User-Name">
                <div><a role="link" href="/jack"><span>jack</span></a></div>
                <div><a role="link" href="/jack">@jack</a></div>
            </div>
            <div data-testid="tweetText" lang="en"><span>just setting up my </span><a href="/hashtag/x">#x</a></div>
            <div data-testid="tweetPhoto"><img src="https://pbs.twimg.com/1.jpg" alt="first"></div>
            <div data-testid="tweetPhoto"><img src="https://pbs.twimg.com/2.jpg"></div>
            <a href="/jack/status/20"><time datetime="2006-03-21T20:50:14.000Z">Mar 21, 2006</time></a>
            <button data-testid="reply" aria-label="12 Replies. Reply"></button>
            <button data-testid="retweet" aria-label="1,234 reposts. Repost"></button>
            <button data-testid="like" aria-label="0 Likes. Like"></button>
        </article>
        </body></html>
    "#;

    fn extract(html: &str) -> Result<Tweet, ExtractError> {
        let page = Page::parse(html);
        TweetExtractor::default().extract(&page.root())
    }

    #[test]
    fn test_full_tweet() {
        let tweet = extract(TWEET_HTML).unwrap();
        assert_eq!(tweet.text.text, "just setting up my #x");
        assert!(tweet.text.html.contains("<a href=\"/hashtag/x\">#x</a>"));
        assert_eq!(tweet.text.language.as_deref(), Some("en"));

        let author = tweet.author.unwrap();
        assert_eq!(author.display_name, "jack");
        assert_eq!(author.handle, "@jack");

        let ts = tweet.timestamp.unwrap();
        assert_eq!(ts.iso_datetime, "2006-03-21T20:50:14.000Z");
        assert_eq!(ts.display_text, "Mar 21, 2006");

        assert_eq!(
            tweet.media,
            vec![
                MediaItem {
                    url: "https://pbs.twimg.com/1.jpg".to_string(),
                    alt: "first".to_string(),
                },
                MediaItem {
                    url: "https://pbs.twimg.com/2.jpg".to_string(),
                    alt: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_engagement_zero_versus_absent() {
        let tweet = extract(TWEET_HTML).unwrap();
        assert_eq!(tweet.engagement.likes, Some(0));
        assert_eq!(tweet.engagement.retweets, Some(1234));
        assert_eq!(tweet.engagement.replies, Some(12));
        assert_eq!(tweet.engagement.bookmarks, None);
    }

    #[test]
    fn test_missing_like_button_is_absent() {
        let html = r#"<article data-testid="tweet"><div data-testid="tweetText">hi</div></article>"#;
        let tweet = extract(html).unwrap();
        assert_eq!(tweet.engagement.likes, None);
        assert!(tweet.engagement.is_empty());
        assert!(tweet.author.is_none());
        assert!(tweet.timestamp.is_none());
        assert!(tweet.media.is_empty());
    }

    #[test]
    fn test_non_numeric_label_is_omitted() {
        let html = r#"<article data-testid="tweet"><div data-testid="tweetText">hi</div>
            <button data-testid="like" aria-label="Like"></button></article>"#;
        let tweet = extract(html).unwrap();
        assert_eq!(tweet.engagement.likes, None);
    }

    #[test]
    fn test_context_flags() {
        let tweet = extract(TWEET_HTML).unwrap();
        assert_eq!(tweet.flags, TweetFlags::default());

        let html = r#"<article data-testid="tweet">
            <span data-testid="socialContext">jack reposted</span>
            <div data-testid="tweetText">hi</div>
            <div data-testid="quoteTweet"><div>quoted</div></div>
            <a href="/jack/status/20/thread">Show this thread</a>
        </article>"#;
        let tweet = extract(html).unwrap();
        assert_eq!(
            tweet.flags,
            TweetFlags {
                is_thread: true,
                is_retweet: true,
                has_quote: true,
            }
        );
    }

    #[test]
    fn test_container_not_found() {
        let err = extract("<div>no tweet</div>").unwrap_err();
        assert_eq!(err.code, ErrorCode::ContainerNotFound);
        assert_eq!(err.reason(), "container-not-found");
    }

    #[test]
    fn test_text_not_found() {
        let err = extract(r#"<article data-testid="tweet"><p>x</p></article>"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::TextNotFound);
    }

    #[test]
    fn test_container_fallback_selector() {
        let html = r#"<article role="article"><div data-testid="tweetText">fallback</div></article>"#;
        assert_eq!(extract(html).unwrap().text.text, "fallback");
    }

    #[test]
    fn test_invalid_datetime_omits_timestamp() {
        let html = r#"<article data-testid="tweet"><div data-testid="tweetText">hi</div>
            <time datetime="soon">soon</time></article>"#;
        assert!(extract(html).unwrap().timestamp.is_none());
    }

    #[test]
    fn test_media_without_src_is_skipped() {
        let html = r#"<article data-testid="tweet"><div data-testid="tweetText">hi</div>
            <div data-testid="tweetPhoto"><img alt="broken"></div>
            <div data-testid="tweetPhoto"><img src="https://pbs.twimg.com/ok.jpg"></div></article>"#;
        let tweet = extract(html).unwrap();
        assert_eq!(tweet.media.len(), 1);
        assert_eq!(tweet.media[0].url, "https://pbs.twimg.com/ok.jpg");
    }
}
