//! Inline text scans: wiki links, tags, and todo checkboxes.

use regex::Regex;
use std::sync::LazyLock;

/// Wiki link pattern. Captures: 1: link text, exactly as spelled.
/// Format: [[link text]]
pub static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").unwrap());

/// Inline tag pattern. Captures: 2: tag name, `/`-separated for hierarchy.
/// Requires a word start so heading markers and fragments do not match.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)#([A-Za-z0-9][A-Za-z0-9_/-]*)").unwrap());

/// Todo checkbox at the start of a list item's raw text.
/// Captures: 1: completion mark, 2: description.
static TODO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+\[( |x|X)\]\s+(.*)$").unwrap());

/// A wiki link occurrence in element text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLinkRef {
    /// The text inside `[[…]]`, byte-for-byte.
    pub original_text: String,
    /// Byte offset of the opening `[[` within the scanned text.
    pub position: usize,
}

/// All wiki links in `text`, in order of appearance.
pub fn wiki_links(text: &str) -> Vec<WikiLinkRef> {
    WIKILINK_RE
        .captures_iter(text)
        .map(|caps| WikiLinkRef {
            original_text: caps[1].to_string(),
            position: caps.get(0).map_or(0, |m| m.start()),
        })
        .collect()
}

/// `text` with every wiki link removed, for use as a residual literal.
pub fn strip_wiki_links(text: &str) -> String {
    WIKILINK_RE.replace_all(text, "").trim().to_string()
}

/// All inline tags in `text`, without the leading `#`.
pub fn tags(text: &str) -> Vec<String> {
    TAG_RE
        .captures_iter(text)
        .map(|caps| caps[2].to_string())
        .collect()
}

/// A parsed todo checkbox line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoLine {
    pub is_completed: bool,
    pub description: String,
}

/// Interpret a list item's raw text as a todo checkbox, if it is one.
pub fn parse_todo(raw_text: &str) -> Option<TodoLine> {
    let caps = TODO_RE.captures(raw_text)?;
    Some(TodoLine {
        is_completed: caps[1].eq_ignore_ascii_case("x"),
        description: caps[2].trim_end().to_string(),
    })
}
