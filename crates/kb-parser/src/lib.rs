//! Markdown parsing for kb-graph.
//!
//! Turns raw Markdown text into a [`document::ParsedDocument`]: YAML
//! frontmatter, plain body text, and a flat element tree (headings,
//! paragraphs, list items, code blocks) with 1-based line numbers that match
//! the file as on disk.

pub mod document;
pub mod frontmatter;
pub mod markdown;
pub mod ner;
pub mod scan;
