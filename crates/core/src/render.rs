// ABOUTME: Content renderer: turns NormalizedContent into reading-view HTML, Markdown or plain text.
// ABOUTME: Text is escaped on interpolation and copied page markup is sanitized with an allow-list.

//! Rendering.
//!
//! The HTML fragment uses the `readx-*` class vocabulary. Article blocks map
//! one to one onto elements in extraction order:
//!
//! | block       | element                                   |
//! |-------------|-------------------------------------------|
//! | `Paragraph` | `<p class="readx-paragraph">`             |
//! | `Heading`   | `<h2 class="readx-heading">`              |
//! | `Quote`     | `<blockquote class="readx-quote">`        |
//! | `ListItem`  | `<li class="readx-list-item">`            |
//! | `Image`     | `<figure class="readx-image"><img><figcaption></figure>` |
//! | `Unknown`   | `<div class="readx-unknown">`             |
//!
//! List items are emitted bare, without a shared `<ul>` wrapper.

use std::fmt::Write;

use scraper::Html;
use url::Url;

use crate::content::{
    Article, Author, ContentBlock, EngagementCounts, NormalizedContent, Timestamp, Tweet, TweetFlags,
};
use crate::dom::normalize_whitespace;
use crate::formats::{escape_html, format_count, html_to_markdown, sanitize_html};
use crate::settings::ReaderSettings;

const UNKNOWN_USER: &str = "Unknown user";
const PAGE_TITLE_FALLBACK: &str = "ReadX";

/// Renders normalized content. Holds the base URL used to absolutize links in copied markup.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    base_url: Option<Url>,
}

impl Renderer {
    pub fn new(base_url: Option<Url>) -> Self {
        Self { base_url }
    }

    /// HTML fragment for the reading view.
    pub fn render(&self, content: &NormalizedContent) -> String {
        match content {
            NormalizedContent::Tweet(tweet) => self.render_tweet(tweet),
            NormalizedContent::Article(article) => self.render_article(article),
        }
    }

    /// Markdown rendition of [`Renderer::render`].
    pub fn render_markdown(&self, content: &NormalizedContent) -> String {
        html_to_markdown(&self.render(content))
    }

    /// Plain-text rendition built directly from the content model.
    pub fn render_text(&self, content: &NormalizedContent) -> String {
        match content {
            NormalizedContent::Tweet(tweet) => tweet_text(tweet),
            NormalizedContent::Article(article) => article_text(article),
        }
    }

    /// Complete reading-mode document with the settings stylesheet and theme applied.
    pub fn render_page(&self, content: &NormalizedContent, settings: &ReaderSettings) -> String {
        let title = match content {
            NormalizedContent::Article(a) => a.title.clone(),
            NormalizedContent::Tweet(t) => t
                .author
                .as_ref()
                .map(|a| a.display_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| PAGE_TITLE_FALLBACK.to_string()),
        };

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        let _ = writeln!(out, "<title>{}</title>", escape_html(&title));
        let _ = writeln!(
            out,
            "<style id=\"readx-dynamic-styles\">\n{}</style>",
            settings.to_css()
        );
        out.push_str("</head>\n<body>\n");
        let _ = writeln!(
            out,
            "<div id=\"readx-reading-mode\" class=\"readx-container\" data-theme=\"{}\">",
            settings.theme
        );
        out.push_str("<main class=\"readx-content\">\n");
        out.push_str(&self.render(content));
        out.push_str("\n</main>\n</div>\n</body>\n</html>\n");
        out
    }

    fn render_tweet(&self, tweet: &Tweet) -> String {
        let mut out = String::from("<article class=\"readx-tweet\">\n");

        if tweet.flags.any() {
            out.push_str(&context_line(&tweet.flags));
        }
        out.push_str("<header class=\"readx-tweet-header\">\n");
        if let Some(url) = tweet.author.as_ref().and_then(|a| a.avatar_url.as_deref()) {
            let _ = writeln!(
                out,
                "<img src=\"{}\" alt=\"avatar\" class=\"readx-avatar\">",
                escape_html(url)
            );
        }
        out.push_str("<div class=\"readx-user-info\">\n");
        let name = tweet
            .author
            .as_ref()
            .map(|a| a.display_name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_USER);
        let verified = tweet.author.as_ref().is_some_and(|a| a.verified);
        let _ = writeln!(
            out,
            "<h1 class=\"readx-user-name\">{}{}</h1>",
            escape_html(name),
            if verified { verified_badge() } else { "" }
        );
        let handle = tweet.author.as_ref().map(|a| a.handle.as_str()).unwrap_or("");
        let _ = writeln!(out, "<p class=\"readx-user-handle\">{}</p>", escape_html(handle));
        if let Some(ts) = &tweet.timestamp {
            out.push_str(&time_element(ts));
            out.push('\n');
        }
        out.push_str("</div>\n</header>\n");

        let lang = tweet
            .text
            .language
            .as_deref()
            .map(|l| format!(" lang=\"{}\"", escape_html(l)))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "<div class=\"readx-tweet-text\"{}>{}</div>",
            lang,
            sanitize_html(&tweet.text.html, self.base_url.as_ref())
        );

        if !tweet.media.is_empty() {
            out.push_str("<div class=\"readx-media\">\n");
            for m in &tweet.media {
                let _ = writeln!(
                    out,
                    "<img src=\"{}\" alt=\"{}\" class=\"readx-media-image\">",
                    escape_html(&m.url),
                    escape_html(&m.alt)
                );
            }
            out.push_str("</div>\n");
        }

        let stats = engagement_stats(&tweet.engagement);
        if !stats.is_empty() {
            out.push_str("<footer class=\"readx-engagement\">\n<div class=\"readx-stats\">");
            for (icon, count) in stats {
                let _ = write!(
                    out,
                    "<span class=\"readx-stat\">{} {}</span>",
                    icon,
                    format_count(count)
                );
            }
            out.push_str("</div>\n</footer>\n");
        }

        out.push_str("</article>");
        out
    }

    fn render_article(&self, article: &Article) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(article.blocks.len() + 3);
        parts.push(format!(
            "<h1 class=\"readx-article-title\">{}</h1>",
            escape_html(&article.title)
        ));
        if let Some(author) = &article.author {
            parts.push(article_author(author));
        }
        if let Some(ts) = &article.timestamp {
            parts.push(time_element(ts));
        }
        parts.extend(article.blocks.iter().map(|b| self.render_block(b)));
        parts.join("\n")
    }

    /// Renders one article block.
    pub fn render_block(&self, block: &ContentBlock) -> String {
        match block {
            ContentBlock::Paragraph { text, .. } => {
                format!("<p class=\"readx-paragraph\">{}</p>", escape_html(text))
            }
            ContentBlock::Heading { text, .. } => {
                format!("<h2 class=\"readx-heading\">{}</h2>", escape_html(text))
            }
            ContentBlock::Quote { text, .. } => {
                format!("<blockquote class=\"readx-quote\">{}</blockquote>", escape_html(text))
            }
            ContentBlock::ListItem { text, .. } => {
                format!("<li class=\"readx-list-item\">{}</li>", escape_html(text))
            }
            ContentBlock::Image { url, alt } => {
                let caption = if alt.is_empty() {
                    String::new()
                } else {
                    format!("<figcaption>{}</figcaption>", escape_html(alt))
                };
                format!(
                    "<figure class=\"readx-image\"><img src=\"{}\" alt=\"{}\">{}</figure>",
                    escape_html(url),
                    escape_html(alt),
                    caption
                )
            }
            ContentBlock::Unknown { raw_html } => format!(
                "<div class=\"readx-unknown\">{}</div>",
                sanitize_html(raw_html, self.base_url.as_ref())
            ),
        }
    }
}

/// Renders with no base URL. See [`Renderer::render`].
pub fn render(content: &NormalizedContent) -> String {
    Renderer::default().render(content)
}

/// See [`Renderer::render_markdown`].
pub fn render_markdown(content: &NormalizedContent) -> String {
    Renderer::default().render_markdown(content)
}

/// See [`Renderer::render_text`].
pub fn render_text(content: &NormalizedContent) -> String {
    Renderer::default().render_text(content)
}

/// See [`Renderer::render_page`].
pub fn render_page(content: &NormalizedContent, settings: &ReaderSettings) -> String {
    Renderer::default().render_page(content, settings)
}

fn context_line(flags: &TweetFlags) -> String {
    let mut labels = Vec::new();
    if flags.is_retweet {
        labels.push("🔁 Repost");
    }
    if flags.is_thread {
        labels.push("🧵 Thread");
    }
    if flags.has_quote {
        labels.push("💬 Quote");
    }
    let spans: Vec<String> = labels
        .iter()
        .map(|l| format!("<span class=\"readx-context-flag\">{}</span>", l))
        .collect();
    format!("<div class=\"readx-tweet-context\">{}</div>\n", spans.join(""))
}

fn verified_badge() -> &'static str {
    "<span class=\"readx-verified-badge\" title=\"Verified\">✓</span>"
}

fn time_element(ts: &Timestamp) -> String {
    let label = if ts.display_text.is_empty() {
        &ts.iso_datetime
    } else {
        &ts.display_text
    };
    format!(
        "<time datetime=\"{}\" class=\"readx-timestamp\">{}</time>",
        escape_html(&ts.iso_datetime),
        escape_html(label)
    )
}

fn article_author(author: &Author) -> String {
    let mut out = String::from("<div class=\"readx-article-author\">");
    let name = if author.display_name.is_empty() {
        UNKNOWN_USER
    } else {
        &author.display_name
    };
    let _ = write!(out, "<span class=\"readx-author-name\">{}</span>", escape_html(name));
    if author.verified {
        out.push_str(verified_badge());
    }
    if !author.handle.is_empty() {
        let _ = write!(
            out,
            "<span class=\"readx-author-handle\">{}</span>",
            escape_html(&author.handle)
        );
    }
    out.push_str("</div>");
    out
}

/// Present, non-zero metrics in display order.
fn engagement_stats(e: &EngagementCounts) -> Vec<(&'static str, u64)> {
    [
        ("❤️", e.likes),
        ("🔄", e.retweets),
        ("💬", e.replies),
        ("🔖", e.bookmarks),
    ]
    .into_iter()
    .filter_map(|(icon, count)| count.filter(|&n| n > 0).map(|n| (icon, n)))
    .collect()
}

fn byline(author: Option<&Author>, timestamp: Option<&Timestamp>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(a) = author {
        match (a.display_name.is_empty(), a.handle.is_empty()) {
            (false, false) => parts.push(format!("{} ({})", a.display_name, a.handle)),
            (false, true) => parts.push(a.display_name.clone()),
            (true, false) => parts.push(a.handle.clone()),
            (true, true) => {}
        }
    }
    if let Some(ts) = timestamp {
        let label = if ts.display_text.is_empty() {
            &ts.iso_datetime
        } else {
            &ts.display_text
        };
        parts.push(label.clone());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}

fn tweet_text(tweet: &Tweet) -> String {
    let mut sections: Vec<String> = Vec::new();
    sections.push(
        byline(tweet.author.as_ref(), tweet.timestamp.as_ref())
            .unwrap_or_else(|| UNKNOWN_USER.to_string()),
    );
    sections.push(tweet.text.text.clone());
    if !tweet.media.is_empty() {
        let media: Vec<String> = tweet.media.iter().map(|m| image_line(&m.url, &m.alt)).collect();
        sections.push(media.join("\n"));
    }
    let e = &tweet.engagement;
    let stats: Vec<String> = [
        (e.likes, "likes"),
        (e.retweets, "reposts"),
        (e.replies, "replies"),
        (e.bookmarks, "bookmarks"),
    ]
    .into_iter()
    .filter_map(|(count, label)| {
        count
            .filter(|&n| n > 0)
            .map(|n| format!("{} {}", format_count(n), label))
    })
    .collect();
    if !stats.is_empty() {
        sections.push(stats.join(" · "));
    }
    sections.join("\n\n")
}

fn article_text(article: &Article) -> String {
    let mut sections: Vec<String> = vec![article.title.clone()];
    if let Some(line) = byline(article.author.as_ref(), article.timestamp.as_ref()) {
        sections.push(line);
    }
    for block in &article.blocks {
        let text = match block {
            ContentBlock::Paragraph { text, .. } | ContentBlock::Heading { text, .. } => {
                text.clone()
            }
            ContentBlock::Quote { text, .. } => format!("> {}", text),
            ContentBlock::ListItem { text, .. } => format!("- {}", text),
            ContentBlock::Image { url, alt } => image_line(url, alt),
            ContentBlock::Unknown { raw_html } => fragment_text(raw_html),
        };
        if !text.is_empty() {
            sections.push(text);
        }
    }
    sections.join("\n\n")
}

fn image_line(url: &str, alt: &str) -> String {
    if alt.is_empty() {
        format!("[image] {}", url)
    } else {
        format!("[image: {}] {}", alt, url)
    }
}

fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    normalize_whitespace(&text)
}
