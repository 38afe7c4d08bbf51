//! Named-entity recognition input types.
//!
//! The processor does not ship an NER engine; spans come from an external
//! pass over the document's plain text and enter the pipeline through these
//! types.

use serde::{Deserialize, Serialize};

/// Recognized NER labels, after mapping source tag sets onto the entity
/// kinds the knowledge base models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NerLabel {
    Person,
    Organization,
    Location,
    /// Dates are literals only; they never become entities.
    Date,
    Project,
}

impl NerLabel {
    /// Map a source label onto a recognized one. Unknown labels yield `None`
    /// and are ignored.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "PERSON" => Some(NerLabel::Person),
            "ORG" | "ORGANIZATION" => Some(NerLabel::Organization),
            "LOC" | "GPE" => Some(NerLabel::Location),
            "DATE" => Some(NerLabel::Date),
            "PROJECT" => Some(NerLabel::Project),
            _ => None,
        }
    }
}

/// One NER hit, with character offsets into the document's plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerSpan {
    pub label: NerLabel,
    pub text: String,
    pub start_char: usize,
    pub end_char: usize,
}
