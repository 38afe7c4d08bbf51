//! Frontmatter property classification.
//!
//! Decides, per field, whether a value is a literal property of the document
//! or a reference to one or more entities. The field-name sets are closed and
//! explicit; extending them means editing the lists.

use crate::resolver::LinkContext;
use chrono::{DateTime, NaiveDate, Utc};
use kb_core::model::{LiteralProperty, LiteralValue};
use kb_parser::document::FmValue;
use kb_parser::scan;

/// Fields whose values are entity references even without `[[…]]` markup.
const KNOWN_ENTITY_FIELDS: [&str; 17] = [
    "author",
    "authors",
    "attendees",
    "participants",
    "assignee",
    "assignees",
    "reviewer",
    "reviewers",
    "team",
    "members",
    "project",
    "projects",
    "organization",
    "company",
    "client",
    "customer",
    "tags",
];

/// Fields that are always literals, even when their text matches an entity
/// name or carries wiki-link markup.
const RESERVED_LITERAL_FIELDS: [&str; 7] = [
    "created",
    "modified",
    "word_count",
    "version",
    "status",
    "type",
    "language",
];

/// The classification of one frontmatter field: wiki-link texts to resolve
/// (with the inferred context) plus literal properties to attach.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub targets: Vec<String>,
    pub context: LinkContext,
    pub literals: Vec<LiteralProperty>,
}

/// Classify one frontmatter field.
pub fn classify_field(name: &str, value: &FmValue) -> Classification {
    let lower = name.to_lowercase();
    let predicate = predicate_name(name);

    if RESERVED_LITERAL_FIELDS.contains(&lower.as_str()) {
        return Classification {
            literals: literal_values(&predicate, value),
            ..Classification::default()
        };
    }

    if KNOWN_ENTITY_FIELDS.contains(&lower.as_str()) {
        let mut targets = Vec::new();
        for element in scalar_elements(value) {
            // `[[…]]` markup is honored when present; otherwise the whole
            // scalar is the link text.
            let links = scan::wiki_links(&element);
            if links.is_empty() {
                if !element.trim().is_empty() {
                    targets.push(element.trim().to_string());
                }
            } else {
                targets.extend(links.into_iter().map(|l| l.original_text));
            }
        }
        return Classification {
            targets,
            context: LinkContext::from_field(&lower),
            ..Classification::default()
        };
    }

    // Embedded wiki links in an otherwise free-form value.
    if let FmValue::Str(s) = value
        && s.contains("[[")
        && s.contains("]]")
    {
        let targets: Vec<String> = scan::wiki_links(s)
            .into_iter()
            .map(|l| l.original_text)
            .collect();
        let residual = scan::strip_wiki_links(s);
        let literals = if residual.is_empty() {
            Vec::new()
        } else {
            vec![LiteralProperty {
                predicate,
                value: LiteralValue::Str(residual),
            }]
        };
        return Classification {
            targets,
            context: LinkContext::None,
            literals,
        };
    }

    Classification {
        literals: literal_values(&predicate, value),
        ..Classification::default()
    }
}

fn scalar_elements(value: &FmValue) -> Vec<String> {
    match value {
        FmValue::List(items) => items.iter().filter_map(FmValue::as_scalar_str).collect(),
        scalar => scalar.as_scalar_str().into_iter().collect(),
    }
}

fn literal_values(predicate: &str, value: &FmValue) -> Vec<LiteralProperty> {
    match value {
        FmValue::List(items) => items
            .iter()
            .filter(|item| !matches!(item, FmValue::List(_)))
            .map(|item| LiteralProperty {
                predicate: predicate.to_string(),
                value: scalar_literal(item),
            })
            .collect(),
        scalar => vec![LiteralProperty {
            predicate: predicate.to_string(),
            value: scalar_literal(scalar),
        }],
    }
}

fn scalar_literal(value: &FmValue) -> LiteralValue {
    match value {
        FmValue::Str(s) => parse_date(s).map_or_else(|| LiteralValue::Str(s.clone()), LiteralValue::DateTime),
        FmValue::Int(n) => LiteralValue::Int(*n),
        FmValue::Float(f) => LiteralValue::Float(*f),
        FmValue::Bool(b) => LiteralValue::Bool(*b),
        FmValue::List(_) => LiteralValue::Str(String::new()),
    }
}

/// Recognize full RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as
/// UTC midnight). Anything else stays a string.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Field name → `kb:` predicate: split on spaces/underscores, lowercase the
/// leading letter, join segments with their first letter capitalized.
fn predicate_name(field: &str) -> String {
    let mut segments = field.split(|c: char| c == ' ' || c == '_').filter(|s| !s.is_empty());
    let mut out = String::with_capacity(field.len());
    if let Some(first) = segments.next() {
        let mut chars = first.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_lowercase());
            out.push_str(chars.as_str());
        }
    }
    for segment in segments {
        let mut chars = segment.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
