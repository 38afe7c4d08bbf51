//! Run-scoped registries: document paths, deduplicated global entities, and
//! wiki placeholders.
//!
//! All three are constructor-injected into the components that need them and
//! discarded when the run ends. Under the parallel phase they sit behind
//! mutexes owned by the pipeline; nothing here is globally shared.

use crate::error::KbError;
use crate::id::{self, DocumentIdentity};
use crate::model::{EntityExtras, GlobalEntity, GlobalKind, PlaceholderDocument};
use crate::slug::normalize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Maps original paths ⇄ document ids and resolves wiki link text against
/// them.
///
/// Keys are stored exactly as received (case- and whitespace-preserving).
/// Lookup text is never slug-normalized: `"Daily Notes/X.md"` and
/// `"daily-notes/x.md"` are distinct documents even when their normalized
/// ids collide.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    by_original_path: HashMap<String, String>,
    by_stem: HashMap<String, String>,
    // Lowercased-key shadows for the case-insensitive fallback pass.
    // First registration wins on collision.
    by_original_path_ci: HashMap<String, String>,
    by_stem_ci: HashMap<String, String>,
    extensions: Vec<String>,
}

impl DocumentRegistry {
    /// New registry with the extension probe order used for wiki-link lookup.
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions.to_vec(),
            ..Self::default()
        }
    }

    /// Insert a document under both its original path and its
    /// extension-stripped path.
    ///
    /// Fails with `DuplicatePath` when either key is already registered to a
    /// different id. Re-registering the same identity is a no-op.
    pub fn register(&mut self, identity: &DocumentIdentity) -> Result<(), KbError> {
        for (key, map) in [
            (&identity.original_path, &self.by_original_path),
            (&identity.path_without_extension, &self.by_stem),
        ] {
            if let Some(existing) = map.get(key)
                && existing != &identity.id
            {
                return Err(KbError::DuplicatePath {
                    path: key.clone(),
                    existing: existing.clone(),
                    incoming: identity.id.clone(),
                });
            }
        }
        self.by_original_path
            .insert(identity.original_path.clone(), identity.id.clone());
        self.by_stem
            .insert(identity.path_without_extension.clone(), identity.id.clone());
        self.by_original_path_ci
            .entry(identity.original_path.to_lowercase())
            .or_insert_with(|| identity.id.clone());
        self.by_stem_ci
            .entry(identity.path_without_extension.to_lowercase())
            .or_insert_with(|| identity.id.clone());
        Ok(())
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.by_original_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_original_path.is_empty()
    }

    /// Resolve wiki link text to a document id.
    ///
    /// Probes, in order: the text as a complete original path, the text plus
    /// each configured extension, then the text as a path-without-extension.
    /// The whole chain runs case-sensitively first; the case-insensitive
    /// fallback only runs when that yields nothing. Stops at the first match.
    pub fn find_by_wiki_link(&self, link_text: &str) -> Option<&str> {
        if let Some(id) = self.probe(link_text, &self.by_original_path, &self.by_stem, false) {
            return Some(id);
        }
        self.probe(
            &link_text.to_lowercase(),
            &self.by_original_path_ci,
            &self.by_stem_ci,
            true,
        )
    }

    fn probe<'a>(
        &'a self,
        text: &str,
        paths: &'a HashMap<String, String>,
        stems: &'a HashMap<String, String>,
        lowercase_ext: bool,
    ) -> Option<&'a str> {
        if let Some(id) = paths.get(text) {
            return Some(id);
        }
        for ext in &self.extensions {
            let candidate = if lowercase_ext {
                format!("{text}{}", ext.to_lowercase())
            } else {
                format!("{text}{ext}")
            };
            if let Some(id) = paths.get(&candidate) {
                return Some(id);
            }
        }
        stems.get(text).map(String::as_str)
    }
}

/// Deduplicates named entities across documents.
///
/// Merges are commutative and associative (aliases via set union, scalars via
/// first-observed), so the final entity set is independent of document order;
/// only the choice of `canonical_name` follows observation order.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<String, GlobalEntity>,
    /// (kind, alias slug) → entity id.
    aliases: HashMap<(GlobalKind, String), String>,
    collisions: usize,
    warn_on_collision: bool,
}

impl EntityRegistry {
    pub fn new(warn_on_collision: bool) -> Self {
        Self {
            warn_on_collision,
            ..Self::default()
        }
    }

    /// Look up or insert the entity this observation denotes.
    ///
    /// Returns the entity id and whether it was created by this call.
    pub fn get_or_create(
        &mut self,
        kind: GlobalKind,
        name: &str,
        extras: EntityExtras,
    ) -> Result<(String, bool), KbError> {
        let canonical = match kind {
            GlobalKind::Person => id::person_id(name)?,
            GlobalKind::Organization => id::organization_id(name)?,
            GlobalKind::Location => id::location_id(name, extras.location_parent.as_deref())?,
            GlobalKind::Project => id::project_id(name)?,
            GlobalKind::Tag => id::tag_id(name)?,
        };

        let alias_slug = normalize(name);

        // A previously recorded alias may point somewhere other than the
        // canonical recipe output; honor it.
        let target = match self.aliases.get(&(kind, alias_slug.clone())) {
            Some(stored) if stored != &canonical => stored.clone(),
            _ => canonical,
        };

        let created = match self.entities.get_mut(&target) {
            Some(entity) => {
                Self::merge(
                    entity,
                    name,
                    extras,
                    &mut self.collisions,
                    self.warn_on_collision,
                );
                false
            }
            None => {
                let mut aliases = std::collections::BTreeSet::new();
                aliases.insert(name.to_string());
                self.entities.insert(
                    target.clone(),
                    GlobalEntity {
                        id: target.clone(),
                        kind,
                        canonical_name: name.to_string(),
                        aliases,
                        scalars: extras.scalars,
                        multi: extras.multi,
                    },
                );
                true
            }
        };

        self.aliases
            .entry((kind, alias_slug))
            .or_insert_with(|| target.clone());

        Ok((target, created))
    }

    fn merge(
        entity: &mut GlobalEntity,
        name: &str,
        extras: EntityExtras,
        collisions: &mut usize,
        warn_on_collision: bool,
    ) {
        entity.aliases.insert(name.to_string());
        for (key, value) in extras.scalars {
            match entity.scalars.get(&key) {
                Some(existing) if existing != &value => {
                    *collisions += 1;
                    if warn_on_collision {
                        warn!(
                            entity = %entity.id,
                            property = %key,
                            kept = %existing,
                            dropped = %value,
                            "conflicting scalar property on entity merge"
                        );
                    }
                }
                Some(_) => {}
                None => {
                    entity.scalars.insert(key, value);
                }
            }
        }
        for (key, values) in extras.multi {
            entity.multi.entry(key).or_default().extend(values);
        }
    }

    /// Iterate all registered entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &GlobalEntity> {
        self.entities.values()
    }

    /// Distinct entity counts per kind, keyed by RDF class name.
    pub fn counts_by_kind(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entity in self.entities.values() {
            *counts
                .entry(entity.kind.class_name().to_string())
                .or_insert(0) += 1;
        }
        counts
    }

    /// Scalar-property conflicts observed during merges.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Placeholder documents for wiki links that resolved to nothing.
#[derive(Debug, Default)]
pub struct PlaceholderRegistry {
    by_id: BTreeMap<String, PlaceholderDocument>,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the placeholder for `link_text`, recording that
    /// `referencing_doc` points at it. The first observed surface form of the
    /// link text sticks.
    pub fn get_or_create(
        &mut self,
        link_text: &str,
        referencing_doc: &str,
    ) -> Result<String, KbError> {
        let id = id::placeholder_id(link_text)?;
        let placeholder = self
            .by_id
            .entry(id.clone())
            .or_insert_with(|| PlaceholderDocument {
                id: id.clone(),
                original_link_text: link_text.to_string(),
                referenced_by: std::collections::BTreeSet::new(),
            });
        placeholder.referenced_by.insert(referencing_doc.to_string());
        Ok(id)
    }

    /// Iterate placeholders in id order.
    pub fn iter(&self) -> impl Iterator<Item = &PlaceholderDocument> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
