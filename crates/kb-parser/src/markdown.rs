//! Markdown → element tree extraction.

use crate::document::{Element, ParsedDocument};
use crate::frontmatter::{self, ParseError};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

/// List marker with optional indentation. Raw text runs from the marker to
/// the end of the line.
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)([-*+]\s.*)$").unwrap());

/// Fenced code delimiter; toggles the in-code state of the line scan.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(```|~~~)").unwrap());

/// Parse one Markdown file into the document model.
///
/// Frontmatter is split off and parsed first; the remaining body is walked
/// for headings, paragraphs, and code blocks, while list items are taken from
/// a raw line scan so their leading whitespace and physical line numbers
/// survive exactly as on disk.
pub fn parse_document(source_path: &str, text: &str) -> Result<ParsedDocument, ParseError> {
    let split = frontmatter::split(text)?;
    let elements = extract_elements(&split.body, split.body_start_line);
    Ok(ParsedDocument {
        source_path: source_path.to_string(),
        frontmatter: split.frontmatter,
        content: split.body,
        elements,
    })
}

fn extract_elements(body: &str, body_start_line: usize) -> Vec<Element> {
    let mut elements = block_elements(body, body_start_line);
    elements.extend(list_items(body, body_start_line));
    elements.sort_by_key(element_line);
    elements
}

fn element_line(element: &Element) -> usize {
    match element {
        Element::Heading { line, .. }
        | Element::Paragraph { line, .. }
        | Element::ListItem { line, .. }
        | Element::CodeBlock { line, .. } => *line,
    }
}

/// Headings, top-level paragraphs, and code blocks via pulldown-cmark.
///
/// Paragraphs inside list items are skipped; the raw line scan already
/// covers list content.
fn block_elements(body: &str, body_start_line: usize) -> Vec<Element> {
    let line_starts = line_start_offsets(body);
    let to_line = |offset: usize| -> usize {
        let idx = line_starts.partition_point(|&start| start <= offset);
        body_start_line + idx.saturating_sub(1)
    };

    let mut elements = Vec::new();
    let mut list_depth = 0usize;
    let mut capture: Option<(usize, String)> = None;
    let mut heading_level: Option<u8> = None;

    for (event, range) in Parser::new(body).into_offset_iter() {
        match event {
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
            Event::Start(Tag::Heading { level, .. }) => {
                heading_level = Some(heading_level_to_u8(level));
                capture = Some((to_line(range.start), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let (Some(level), Some((line, text))) = (heading_level.take(), capture.take()) {
                    elements.push(Element::Heading {
                        level,
                        text: text.trim().to_string(),
                        line,
                    });
                }
            }
            Event::Start(Tag::Paragraph) if list_depth == 0 => {
                capture = Some((to_line(range.start), String::new()));
            }
            Event::End(TagEnd::Paragraph) if list_depth == 0 => {
                if let Some((line, text)) = capture.take() {
                    elements.push(Element::Paragraph {
                        text: text.trim().to_string(),
                        line,
                    });
                }
            }
            Event::Start(Tag::CodeBlock(kind)) if list_depth == 0 => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let lang = info.split_whitespace().next().unwrap_or_default();
                        if lang.is_empty() {
                            None
                        } else {
                            Some(lang.to_string())
                        }
                    }
                    CodeBlockKind::Indented => None,
                };
                elements.push(Element::CodeBlock {
                    language,
                    line: to_line(range.start),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buffer)) = capture.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, buffer)) = capture.as_mut() {
                    buffer.push(' ');
                }
            }
            _ => {}
        }
    }
    elements
}

/// Raw line scan for list items, skipping fenced code regions.
fn list_items(body: &str, body_start_line: usize) -> Vec<Element> {
    let mut items = Vec::new();
    let mut in_code = false;
    for (idx, line) in body.lines().enumerate() {
        if FENCE_RE.is_match(line) {
            in_code = !in_code;
            continue;
        }
        if in_code {
            continue;
        }
        if let Some(caps) = LIST_ITEM_RE.captures(line) {
            items.push(Element::ListItem {
                leading_ws: caps[1].to_string(),
                raw_text: caps[2].trim_end().to_string(),
                line: body_start_line + idx,
            });
        }
    }
    items
}

fn line_start_offsets(body: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (idx, byte) in body.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(idx + 1);
        }
    }
    starts
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
