// ABOUTME: Content-block classifier for rich-text article blocks.
// ABOUTME: One ordered rule table maps class-name markers and element shape to a closed BlockType.

//! Block classification.
//!
//! Upstream class names are compound and markers may co-occur on the same
//! node, so classification is a fixed-priority rule table: the first rule
//! that matches wins. Changing how a block is recognised means editing
//! [`CLASS_RULES`], not the extractors.
//!
//! Priority:
//! 1. `longform-unstyled` → paragraph
//! 2. `longform-header` → heading
//! 3. `longform-blockquote` → quote
//! 4. `longform-list-item`, `longform-unordered-list-item`,
//!    `longform-ordered-list-item` → list item
//! 5. a `section` element with an `img` descendant → image
//! 6. anything else → unknown

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

use crate::dom::PageNode;

/// Semantic type of one content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    Heading,
    Quote,
    ListItem,
    Image,
    Unknown,
}

/// Class-marker rules in priority order. Markers are matched as substrings of
/// the class attribute.
pub const CLASS_RULES: &[(BlockType, &[&str])] = &[
    (BlockType::Paragraph, &["longform-unstyled"]),
    (BlockType::Heading, &["longform-header"]),
    (BlockType::Quote, &["longform-blockquote"]),
    (
        BlockType::ListItem,
        &[
            "longform-list-item",
            "longform-unordered-list-item",
            "longform-ordered-list-item",
        ],
    ),
];

/// Selector for the inline text runs that hold rich-text segments.
pub const TEXT_RUN_SELECTOR: &str = r#"span[data-text="true"]"#;

/// Automaton over every marker; pattern ids map back to rule priority.
static MARKERS: Lazy<(AhoCorasick, Vec<usize>)> = Lazy::new(|| {
    let mut patterns = Vec::new();
    let mut priorities = Vec::new();
    for (priority, (_, markers)) in CLASS_RULES.iter().enumerate() {
        for marker in markers.iter() {
            patterns.push(*marker);
            priorities.push(priority);
        }
    }
    let automaton = AhoCorasick::new(patterns).expect("class markers are valid patterns");
    (automaton, priorities)
});

/// Highest-priority class rule matched by a class attribute.
pub fn classify_class(class_attr: &str) -> Option<BlockType> {
    let (automaton, priorities) = &*MARKERS;
    automaton
        .find_overlapping_iter(class_attr)
        .map(|m| priorities[m.pattern().as_usize()])
        .min()
        .map(|priority| CLASS_RULES[priority].0)
}

/// Classifies a content-block node.
pub fn classify<N: PageNode>(node: &N) -> BlockType {
    if let Some(block_type) = classify_class(&node.class_attr()) {
        return block_type;
    }
    if node.tag_name() == "section" && node.contains("img") {
        return BlockType::Image;
    }
    BlockType::Unknown
}

/// Extracts a block's text.
///
/// Concatenates every descendant text run so inline segmentation is kept
/// exactly; falls back to the trimmed text content when there are no runs.
pub fn block_text<N: PageNode>(node: &N) -> String {
    let runs = node.find_all(TEXT_RUN_SELECTOR);
    if runs.is_empty() {
        return node.text_content().trim().to_string();
    }
    runs.iter().map(PageNode::text_content).collect()
}
