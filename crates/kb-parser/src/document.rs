//! Parsed document model consumed by the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A frontmatter value after YAML parsing.
///
/// Dates arrive as strings; nested mappings are not part of the recognized
/// surface and are flattened to their YAML string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FmValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<FmValue>),
}

impl FmValue {
    /// The scalar as a display string, when this is a scalar.
    pub fn as_scalar_str(&self) -> Option<String> {
        match self {
            FmValue::Str(s) => Some(s.clone()),
            FmValue::Int(n) => Some(n.to_string()),
            FmValue::Float(f) => Some(f.to_string()),
            FmValue::Bool(b) => Some(b.to_string()),
            FmValue::List(_) => None,
        }
    }
}

/// One element of a document's body.
///
/// Line numbers are 1-based and count from the top of the file, frontmatter
/// included, so they match what an editor shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Heading {
        level: u8,
        text: String,
        line: usize,
    },
    Paragraph {
        text: String,
        line: usize,
    },
    ListItem {
        /// Whitespace before the list marker, preserved verbatim.
        leading_ws: String,
        /// Line content from the marker onward.
        raw_text: String,
        line: usize,
    },
    CodeBlock {
        language: Option<String>,
        line: usize,
    },
}

/// A fully parsed Markdown document, ready for extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Relative path as received, byte-for-byte.
    pub source_path: String,
    pub frontmatter: BTreeMap<String, FmValue>,
    /// Body text with frontmatter removed; used for word counting and NER.
    pub content: String,
    pub elements: Vec<Element>,
}

impl ParsedDocument {
    /// Whitespace-token word count over the body.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}
