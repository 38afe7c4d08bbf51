//! Deterministic entity identifiers.
//!
//! Every recipe is a pure function of its inputs: same arguments produce the
//! same IRI byte-for-byte across runs, platforms, and process restarts. IRIs
//! have the shape `/{Kind}/{slug path}`; the concrete URI under a base like
//! `http://example.org/kb/` is the emitter's concern.

use crate::error::KbError;
use crate::slug::normalize;
use sha2::{Digest, Sha256};

/// Hard ceiling on IRI length in bytes.
pub const MAX_IRI_BYTES: usize = 256;

/// Extensions recognized (and stripped) when deriving document identifiers.
pub const DOCUMENT_EXTENSIONS: [&str; 3] = [".md", ".markdown", ".txt"];

/// Identity derived from a document's source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentIdentity {
    pub id: String,
    /// The source path byte-for-byte as received.
    pub original_path: String,
    /// The source path with a recognized extension removed, otherwise as-spelled.
    pub path_without_extension: String,
}

/// First 10 lowercase hex characters of the SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..10].to_string()
}

/// Remove a single recognized extension (case-insensitive) from a path.
pub fn strip_document_extension(path: &str) -> &str {
    let lower = path.to_lowercase();
    for ext in DOCUMENT_EXTENSIONS {
        if lower.ends_with(ext) && path.len() > ext.len() {
            return &path[..path.len() - ext.len()];
        }
    }
    path
}

/// Derive a Document identity from its source path.
///
/// The original path is preserved byte-for-byte; only the id is normalized.
pub fn document_id(original_path: &str) -> Result<DocumentIdentity, KbError> {
    if original_path.is_empty() {
        return Err(KbError::InvalidInput("document path is empty".into()));
    }
    let without_ext = strip_document_extension(original_path);
    let segments: Vec<String> = without_ext
        .split('/')
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return Err(KbError::InvalidInput(format!(
            "document path {original_path:?} normalizes to nothing"
        )));
    }
    Ok(DocumentIdentity {
        id: clamp(format!("/Document/{}", segments.join("/"))),
        original_path: original_path.to_string(),
        path_without_extension: without_ext.to_string(),
    })
}

/// Honorific prefixes stripped from person names.
const PERSON_TITLES: [&str; 8] = ["dr.", "dr", "prof.", "prof", "mr.", "mrs.", "ms.", "mx."];

/// Trailing name suffixes stripped from person names (after an optional comma).
const PERSON_SUFFIXES: [&str; 7] = ["phd", "md", "jr", "sr", "ii", "iii", "iv"];

fn strip_person_decorations(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    while let Some(first) = tokens.first() {
        if PERSON_TITLES.contains(&first.to_lowercase().as_str()) {
            tokens.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = tokens.last() {
        let bare = last.to_lowercase();
        let bare = bare.trim_start_matches(',').trim_end_matches('.');
        if PERSON_SUFFIXES.contains(&bare) {
            tokens.pop();
        } else {
            break;
        }
    }
    tokens.join(" ").trim_end_matches(',').to_string()
}

/// `/Person/{slug}` after honorific and suffix stripping.
pub fn person_id(name: &str) -> Result<String, KbError> {
    let slug = normalize(&strip_person_decorations(name));
    if slug.is_empty() {
        return Err(KbError::InvalidInput(format!(
            "person name {name:?} normalizes to nothing"
        )));
    }
    Ok(clamp(format!("/Person/{slug}")))
}

/// Company suffixes trimmed from organization names when preceded by whitespace.
const COMPANY_SUFFIXES: [&str; 10] = [
    "inc", "inc.", "llc", "ltd", "ltd.", "co", "co.", "corp", "corp.", "company",
];

fn strip_company_suffix(name: &str) -> &str {
    let trimmed = name.trim_end();
    if let Some(idx) = trimmed.rfind(char::is_whitespace) {
        let (head, tail) = trimmed.split_at(idx);
        if COMPANY_SUFFIXES.contains(&tail.trim_start().to_lowercase().as_str()) {
            return head.trim_end();
        }
    }
    trimmed
}

/// `/Organization/{slug}` after company-suffix trimming.
pub fn organization_id(name: &str) -> Result<String, KbError> {
    let slug = normalize(strip_company_suffix(name));
    if slug.is_empty() {
        return Err(KbError::InvalidInput(format!(
            "organization name {name:?} normalizes to nothing"
        )));
    }
    Ok(clamp(format!("/Organization/{slug}")))
}

/// `/Location/{parent-slug}/{slug}` when a parent is known, else `/Location/{slug}`.
pub fn location_id(name: &str, parent: Option<&str>) -> Result<String, KbError> {
    let slug = normalize(name);
    if slug.is_empty() {
        return Err(KbError::InvalidInput(format!(
            "location name {name:?} normalizes to nothing"
        )));
    }
    let id = match parent.map(normalize).filter(|p| !p.is_empty()) {
        Some(parent_slug) => format!("/Location/{parent_slug}/{slug}"),
        None => format!("/Location/{slug}"),
    };
    Ok(clamp(id))
}

/// `/Project/{slug}`.
pub fn project_id(name: &str) -> Result<String, KbError> {
    let slug = normalize(name);
    if slug.is_empty() {
        return Err(KbError::InvalidInput(format!(
            "project name {name:?} normalizes to nothing"
        )));
    }
    Ok(clamp(format!("/Project/{slug}")))
}

/// `/Tag/{slug path}`. A single leading `#` is dropped; `/` separates
/// hierarchy levels and survives into the id.
pub fn tag_id(name: &str) -> Result<String, KbError> {
    let trimmed = name.strip_prefix('#').unwrap_or(name);
    let segments: Vec<String> = trimmed
        .split('/')
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return Err(KbError::InvalidInput(format!(
            "tag {name:?} normalizes to nothing"
        )));
    }
    Ok(clamp(format!("/Tag/{}", segments.join("/"))))
}

/// `{document_id}/TodoItem/{line}-{10-hex hash of the description}`.
///
/// Stable under re-processing iff (document path, line, description) are
/// unchanged.
pub fn todo_id(document_id: &str, line: usize, description: &str) -> String {
    let prefix_len = document_id.len() + "/TodoItem/".len();
    clamp_with_prefix(
        format!(
            "{document_id}/TodoItem/{line}-{}",
            content_hash(description)
        ),
        prefix_len,
    )
}

/// `{document_id}/Section/{slugified heading path}`.
///
/// `heading_path` is the chain of headings from the document root down to the
/// section itself.
pub fn section_id(document_id: &str, heading_path: &[String]) -> Result<String, KbError> {
    let segments: Vec<String> = heading_path
        .iter()
        .map(|h| normalize(h))
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return Err(KbError::InvalidInput("section heading path normalizes to nothing".into()));
    }
    let prefix_len = document_id.len() + "/Section/".len();
    Ok(clamp_with_prefix(
        format!("{document_id}/Section/{}", segments.join("/")),
        prefix_len,
    ))
}

/// `/PlaceholderDocument/{slug of the link text}`.
pub fn placeholder_id(link_text: &str) -> Result<String, KbError> {
    let slug = normalize(link_text);
    if slug.is_empty() {
        return Err(KbError::InvalidInput(format!(
            "link text {link_text:?} normalizes to nothing"
        )));
    }
    Ok(clamp(format!("/PlaceholderDocument/{slug}")))
}

/// Clamp a flat `/{Kind}/{slug path}` id to [`MAX_IRI_BYTES`]. The fixed
/// prefix runs through the slash after the kind.
fn clamp(id: String) -> String {
    let prefix_len = id[1..].find('/').map_or(id.len(), |i| i + 2);
    clamp_with_prefix(id, prefix_len)
}

/// Clamp an IRI whose first `prefix_len` bytes are a fixed prefix that must
/// survive intact: the kind marker for flat ids, `{document_id}/Section/` or
/// `{document_id}/TodoItem/` for document-scoped ids.
///
/// Segments after the prefix are truncated proportionally and a 10-hex hash
/// of the untruncated id is appended so distinct inputs stay distinct. When
/// the prefix alone approaches the ceiling (a document id is clamped to the
/// full 256 bytes on its own) the result can exceed it; the document prefix
/// and kind marker are never cut.
fn clamp_with_prefix(id: String, prefix_len: usize) -> String {
    if id.len() <= MAX_IRI_BYTES {
        return id;
    }
    let hash = content_hash(&id);
    let (prefix, tail) = id.split_at(prefix_len);
    let tail_segments: Vec<&str> = tail.split('/').collect();
    let separators = tail_segments.len().saturating_sub(1);
    let budget = MAX_IRI_BYTES
        .saturating_sub(prefix.len() + separators + hash.len() + 1)
        .max(tail_segments.len());
    let tail_total: usize = tail_segments.iter().map(|s| s.len()).sum();
    let truncated: Vec<String> = tail_segments
        .iter()
        .map(|seg| {
            let share = (seg.len() * budget / tail_total.max(1)).max(1);
            truncate_at_boundary(seg, share).to_string()
        })
        .collect();
    format!("{prefix}{}-{hash}", truncated.join("/"))
}

/// Byte-truncate without splitting a UTF-8 character. Slugs are ASCII by
/// construction, so this almost always cuts at exactly `max` bytes.
fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut cut = max;
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    &s[..cut]
}
