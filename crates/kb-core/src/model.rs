//! Entity data model for the knowledge base graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The kinds of globally deduplicated entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalKind {
    Person,
    Organization,
    Location,
    Project,
    Tag,
}

impl GlobalKind {
    /// RDF class name for this kind.
    pub fn class_name(self) -> &'static str {
        match self {
            GlobalKind::Person => "Person",
            GlobalKind::Organization => "Organization",
            GlobalKind::Location => "Location",
            GlobalKind::Project => "Project",
            GlobalKind::Tag => "Tag",
        }
    }
}

/// A processed Markdown file. Exactly one per non-skipped input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Byte-for-byte the path the pipeline received.
    pub original_path: String,
    pub path_without_extension: String,
    pub title: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub word_count: usize,
    pub doc_type: Option<String>,
}

/// A globally deduplicated named entity (person, organization, location,
/// project, or tag).
///
/// `canonical_name` is the first observed surface form; every observed
/// surface form lands in `aliases`. Scalar properties are first-wins,
/// multi-valued properties are unioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalEntity {
    pub id: String,
    pub kind: GlobalKind,
    pub canonical_name: String,
    pub aliases: BTreeSet<String>,
    pub scalars: BTreeMap<String, String>,
    pub multi: BTreeMap<String, BTreeSet<String>>,
}

/// Extra properties supplied alongside a `get_or_create` observation.
#[derive(Debug, Clone, Default)]
pub struct EntityExtras {
    /// Parent location, for `Location` entities observed with one.
    pub location_parent: Option<String>,
    pub scalars: BTreeMap<String, String>,
    pub multi: BTreeMap<String, BTreeSet<String>>,
}

/// A checklist item inside a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub description: String,
    pub is_completed: bool,
    /// 1-based line where the `-` marker begins.
    pub line_number: usize,
    pub content_hash: String,
}

/// A heading-bounded region of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub heading: String,
    pub level: u8,
    /// Id of the enclosing section, when nested.
    pub parent: Option<String>,
}

/// A wiki target that resolved to neither a registered document nor a typed
/// entity. Preserves the reference for later fix-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderDocument {
    pub id: String,
    pub original_link_text: String,
    pub referenced_by: BTreeSet<String>,
}

/// What a wiki link resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Document,
    Person,
    Organization,
    Location,
    Project,
    Tag,
    Placeholder,
}

/// A resolved wiki link.
///
/// Confidence is 1.0 for registry or typed-prefix hits, 0.8 for
/// context-inferred resolutions, and 0.0 for placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub original_text: String,
    pub resolved_kind: LinkKind,
    pub target_id: String,
    pub confidence: f32,
}

/// A literal value attachable to a document as an RDF property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
}

/// A document property classified as a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralProperty {
    /// Local predicate name under the `kb:` namespace.
    pub predicate: String,
    pub value: LiteralValue,
}

/// Everything extracted from a single document.
#[derive(Debug, Clone, Default)]
pub struct DocumentEntities {
    pub sections: Vec<Section>,
    pub todos: Vec<TodoItem>,
    /// Literal properties from frontmatter classification.
    pub literals: Vec<LiteralProperty>,
    /// Referenced global entity and placeholder ids, with mention counts.
    pub references: BTreeMap<String, usize>,
}

impl DocumentEntities {
    /// Record one mention of a referenced entity.
    pub fn add_reference(&mut self, id: impl Into<String>) {
        *self.references.entry(id.into()).or_insert(0) += 1;
    }
}

/// Tagged union over every node kind the emitter knows how to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KbEntity {
    Document(Document),
    Global(GlobalEntity),
    TodoItem(TodoItem),
    Section(Section),
    Placeholder(PlaceholderDocument),
}

impl KbEntity {
    pub fn id(&self) -> &str {
        match self {
            KbEntity::Document(d) => &d.id,
            KbEntity::Global(g) => &g.id,
            KbEntity::TodoItem(t) => &t.id,
            KbEntity::Section(s) => &s.id,
            KbEntity::Placeholder(p) => &p.id,
        }
    }
}
