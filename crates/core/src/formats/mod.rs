// ABOUTME: Output-format helpers: HTML escaping, allow-list sanitization and Markdown conversion.
// ABOUTME: Everything that reaches the reading view passes through escape_html or sanitize_html.

//! Output format helpers.
//!
//! Plain text from the page is escaped before interpolation. Markup copied
//! from the page (tweet text, unknown article blocks) is run through an
//! ammonia allow-list instead.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static BR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Output formats supported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Markdown,
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => OutputFormat::Markdown,
            "text" | "txt" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            _ => OutputFormat::Html,
        }
    }
}

/// Escapes text for use in HTML text nodes and double- or single-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sanitize page markup with an allow-list suited to inline post content.
///
/// Allowed elements: p, br, strong, b, em, i, u, span, div, a, img, ul, ol,
/// li, blockquote, code, pre.
/// Allowed attrs:
/// - links: href
/// - images: src, alt, title, width, height
/// - lang and dir on span/div/p
///
/// Relative link and image URLs are rewritten against `base` when given.
pub fn sanitize_html(html: &str, base: Option<&Url>) -> String {
    let allowed_tags: HashSet<&str> = [
        "p", "br", "strong", "b", "em", "i", "u", "span", "div", "a", "img", "ul", "ol", "li",
        "blockquote", "code", "pre",
    ]
    .into_iter()
    .collect();

    let mut builder = ammonia::Builder::new();
    builder.tags(allowed_tags);
    builder.add_tag_attributes("a", &["href"]);
    builder.add_tag_attributes("img", &["src", "alt", "title", "width", "height"]);
    for tag in ["span", "div", "p"] {
        builder.add_tag_attributes(tag, &["lang", "dir"]);
    }
    builder.url_schemes(["http", "https", "mailto"].into_iter().collect());
    if let Some(base) = base {
        builder.url_relative(ammonia::UrlRelative::RewriteWithBase(base.clone()));
    }

    builder.clean(html).to_string()
}

/// Replace `<br>` variants with newlines before conversion.
fn preprocess_br_tags(html: &str) -> String {
    BR_TAG.replace_all(html, "\n").to_string()
}

/// Collapse more than 2 consecutive blank lines to exactly 2.
fn collapse_blank_lines_to_two(text: &str) -> String {
    BLANK_LINES.replace_all(text, "\n\n").to_string()
}

/// Convert rendered HTML to Markdown using htmd.
///
/// Skips script and style tags. On conversion error, returns the input unchanged.
pub fn html_to_markdown(html: &str) -> String {
    let preprocessed = preprocess_br_tags(html);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "noscript"])
        .build();

    let md = converter
        .convert(&preprocessed)
        .unwrap_or_else(|_| preprocessed.clone());

    collapse_blank_lines_to_two(md.trim())
}

/// Formats a count with comma thousands separators, e.g. `1234567` → `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_encodes_markup_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#39;y&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn sanitize_strips_scripts_and_handlers() {
        let html = r#"<span onclick="evil()">hi</span><script>alert(1)</script>"#;
        let clean = sanitize_html(html, None);
        assert!(!clean.contains("script"), "got: {}", clean);
        assert!(!clean.contains("onclick"), "got: {}", clean);
        assert!(clean.contains("hi"));
    }

    #[test]
    fn sanitize_rewrites_relative_links_with_base() {
        let base = Url::parse("https://x.com/").unwrap();
        let clean = sanitize_html(r#"<a href="/hashtag/rust">#rust</a>"#, Some(&base));
        assert!(
            clean.contains(r#"href="https://x.com/hashtag/rust""#),
            "got: {}",
            clean
        );
    }

    #[test]
    fn sanitize_drops_javascript_urls() {
        let clean = sanitize_html(r#"<a href="javascript:alert(1)">x</a>"#, None);
        assert!(!clean.contains("javascript"), "got: {}", clean);
    }

    #[test]
    fn html_to_markdown_converts_headings_and_links() {
        let md = html_to_markdown(
            r#"<h2>Title</h2><p>Visit <a href="https://example.com">Example</a></p>"#,
        );
        assert!(md.contains("## Title"), "got: {}", md);
        assert!(md.contains("[Example](https://example.com)"), "got: {}", md);
    }

    #[test]
    fn html_to_markdown_collapses_excessive_blank_lines() {
        let md = html_to_markdown("<p>Para 1</p>\n\n\n\n\n<p>Para 2</p>");
        assert!(!md.contains("\n\n\n"), "got: {:?}", md);
    }

    #[test]
    fn preprocess_br_handles_variants() {
        assert_eq!(preprocess_br_tags("<br>"), "\n");
        assert_eq!(preprocess_br_tags("<br/>"), "\n");
        assert_eq!(preprocess_br_tags("<BR />"), "\n");
    }

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!(OutputFormat::from("md"), OutputFormat::Markdown);
        assert_eq!(OutputFormat::from("TXT"), OutputFormat::Text);
        assert_eq!(OutputFormat::from("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("anything"), OutputFormat::Html);
    }
}
