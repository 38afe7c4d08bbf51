//! Wiki link resolution.
//!
//! Resolution order: explicit typed prefix, document registry, context hint,
//! placeholder. The document registry is read-only here; the entity and
//! placeholder registries may gain entries as a side effect.

use kb_core::error::KbError;
use kb_core::model::{EntityExtras, GlobalKind, LinkKind, ResolvedLink};
use kb_core::registry::{DocumentRegistry, EntityRegistry, PlaceholderRegistry};

/// Where a link was found, when the surrounding structure implies a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkContext {
    #[default]
    None,
    Person,
    Organization,
    Location,
    Project,
    Tag,
}

impl LinkContext {
    /// Derive a context hint from a frontmatter field name.
    pub fn from_field(field: &str) -> Self {
        match field.to_lowercase().as_str() {
            "author" | "authors" | "attendees" | "participants" | "assignee" | "assignees"
            | "reviewer" | "reviewers" | "team" | "members" => LinkContext::Person,
            "organization" | "company" | "client" | "customer" => LinkContext::Organization,
            "project" | "projects" => LinkContext::Project,
            "location" => LinkContext::Location,
            "tags" => LinkContext::Tag,
            _ => LinkContext::None,
        }
    }

    fn kind(self) -> Option<GlobalKind> {
        match self {
            LinkContext::None => None,
            LinkContext::Person => Some(GlobalKind::Person),
            LinkContext::Organization => Some(GlobalKind::Organization),
            LinkContext::Location => Some(GlobalKind::Location),
            LinkContext::Project => Some(GlobalKind::Project),
            LinkContext::Tag => Some(GlobalKind::Tag),
        }
    }
}

/// An explicit kind prefix inside the link text, e.g. `person:Alex Cipher`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypedPrefix {
    Doc,
    Entity(GlobalKind),
}

/// Parse a `kind:` prefix. The colon must come before any `/` and the prefix
/// must be a recognized kind; anything else is plain link text.
fn parse_typed_prefix(text: &str) -> Option<(TypedPrefix, &str)> {
    let colon = text.find(':')?;
    if let Some(slash) = text.find('/')
        && slash < colon
    {
        return None;
    }
    let kind = match text[..colon].to_lowercase().as_str() {
        "doc" => TypedPrefix::Doc,
        "person" => TypedPrefix::Entity(GlobalKind::Person),
        "org" | "organization" => TypedPrefix::Entity(GlobalKind::Organization),
        "location" => TypedPrefix::Entity(GlobalKind::Location),
        "project" => TypedPrefix::Entity(GlobalKind::Project),
        "tag" => TypedPrefix::Entity(GlobalKind::Tag),
        _ => return None,
    };
    Some((kind, text[colon + 1..].trim_start()))
}

fn link_kind(kind: GlobalKind) -> LinkKind {
    match kind {
        GlobalKind::Person => LinkKind::Person,
        GlobalKind::Organization => LinkKind::Organization,
        GlobalKind::Location => LinkKind::Location,
        GlobalKind::Project => LinkKind::Project,
        GlobalKind::Tag => LinkKind::Tag,
    }
}

/// Resolve `link_text` to a document, a typed entity, or a placeholder.
///
/// `referencing_doc` is recorded on any placeholder this resolution creates
/// or reuses. Confidence is 1.0 for registry and typed-prefix hits, 0.8 for
/// context-inferred entities, 0.0 for placeholders.
pub fn resolve_wiki_link(
    link_text: &str,
    context: LinkContext,
    referencing_doc: &str,
    documents: &DocumentRegistry,
    entities: &mut EntityRegistry,
    placeholders: &mut PlaceholderRegistry,
) -> Result<ResolvedLink, KbError> {
    let resolved = |kind, target_id: String, confidence| ResolvedLink {
        original_text: link_text.to_string(),
        resolved_kind: kind,
        target_id,
        confidence,
    };

    match parse_typed_prefix(link_text) {
        Some((TypedPrefix::Doc, target)) => {
            if let Some(id) = documents.find_by_wiki_link(target) {
                return Ok(resolved(LinkKind::Document, id.to_string(), 1.0));
            }
        }
        Some((TypedPrefix::Entity(kind), target)) => {
            let (id, _) = entities.get_or_create(kind, target, EntityExtras::default())?;
            return Ok(resolved(link_kind(kind), id, 1.0));
        }
        None => {
            if let Some(id) = documents.find_by_wiki_link(link_text) {
                return Ok(resolved(LinkKind::Document, id.to_string(), 1.0));
            }
            if let Some(kind) = context.kind() {
                let (id, _) = entities.get_or_create(kind, link_text, EntityExtras::default())?;
                return Ok(resolved(link_kind(kind), id, 0.8));
            }
        }
    }

    let id = placeholders.get_or_create(link_text, referencing_doc)?;
    Ok(resolved(LinkKind::Placeholder, id, 0.0))
}
