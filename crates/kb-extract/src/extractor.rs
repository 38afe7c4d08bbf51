//! Element-tree extraction: sections, todos, inline wiki links, tags, and
//! NER-derived mentions.

use crate::resolver::{LinkContext, resolve_wiki_link};
use kb_core::error::KbError;
use kb_core::id;
use kb_core::model::{DocumentEntities, EntityExtras, GlobalKind, Section, TodoItem};
use kb_core::registry::{DocumentRegistry, EntityRegistry, PlaceholderRegistry};
use kb_parser::document::{Element, ParsedDocument};
use kb_parser::ner::{NerLabel, NerSpan};
use kb_parser::scan;
use tracing::debug;

/// Walk a parsed document's elements and NER spans, filling `out` with
/// contained entities (sections, todos) and referenced entity ids.
///
/// Returns the non-fatal diagnostics collected along the way; a malformed
/// element or an unresolvable link skips that element only.
pub fn extract(
    document: &ParsedDocument,
    doc_id: &str,
    ner_spans: &[NerSpan],
    documents: &DocumentRegistry,
    entities: &mut EntityRegistry,
    placeholders: &mut PlaceholderRegistry,
    out: &mut DocumentEntities,
) -> Vec<KbError> {
    let mut diagnostics = Vec::new();
    // Stack of (level, heading) from the document root to the current section.
    let mut heading_stack: Vec<(u8, String)> = Vec::new();
    let mut section_ids: Vec<String> = Vec::new();

    for element in &document.elements {
        match element {
            Element::Heading { level, text, line } => {
                if !(1..=6).contains(level) {
                    diagnostics.push(KbError::MalformedElement(format!(
                        "heading level {level} at line {line} is outside 1-6"
                    )));
                    continue;
                }
                while heading_stack.last().is_some_and(|(l, _)| l >= level) {
                    heading_stack.pop();
                    section_ids.pop();
                }
                heading_stack.push((*level, text.clone()));
                let path: Vec<String> =
                    heading_stack.iter().map(|(_, h)| h.clone()).collect();
                match id::section_id(doc_id, &path) {
                    Ok(section_id) => {
                        out.sections.push(Section {
                            id: section_id.clone(),
                            heading: text.clone(),
                            level: *level,
                            parent: section_ids.last().cloned(),
                        });
                        section_ids.push(section_id);
                    }
                    Err(err) => {
                        // Heading with no sluggable text; keep the stack
                        // aligned so children still nest correctly.
                        heading_stack.pop();
                        diagnostics.push(err);
                        continue;
                    }
                }
                resolve_inline(
                    text, doc_id, documents, entities, placeholders, out, &mut diagnostics,
                );
            }
            Element::Paragraph { text, .. } => {
                resolve_inline(
                    text, doc_id, documents, entities, placeholders, out, &mut diagnostics,
                );
                collect_tags(text, entities, out, &mut diagnostics);
            }
            Element::ListItem { raw_text, line, .. } => {
                if let Some(todo) = scan::parse_todo(raw_text) {
                    let todo_id = id::todo_id(doc_id, *line, &todo.description);
                    out.todos.push(TodoItem {
                        id: todo_id,
                        content_hash: id::content_hash(&todo.description),
                        description: todo.description,
                        is_completed: todo.is_completed,
                        line_number: *line,
                    });
                }
                resolve_inline(
                    raw_text, doc_id, documents, entities, placeholders, out, &mut diagnostics,
                );
                collect_tags(raw_text, entities, out, &mut diagnostics);
            }
            Element::CodeBlock { .. } => {}
        }
    }

    for span in ner_spans {
        let kind = match span.label {
            NerLabel::Person => GlobalKind::Person,
            NerLabel::Organization => GlobalKind::Organization,
            NerLabel::Location => GlobalKind::Location,
            NerLabel::Project => GlobalKind::Project,
            // Dates are literals only, never entities.
            NerLabel::Date => continue,
        };
        match entities.get_or_create(kind, &span.text, EntityExtras::default()) {
            Ok((entity_id, _)) => out.add_reference(entity_id),
            Err(err) => {
                debug!(text = %span.text, "skipping unusable NER span: {err}");
                diagnostics.push(err);
            }
        }
    }

    diagnostics
}

fn resolve_inline(
    text: &str,
    doc_id: &str,
    documents: &DocumentRegistry,
    entities: &mut EntityRegistry,
    placeholders: &mut PlaceholderRegistry,
    out: &mut DocumentEntities,
    diagnostics: &mut Vec<KbError>,
) {
    for link in scan::wiki_links(text) {
        match resolve_wiki_link(
            &link.original_text,
            LinkContext::None,
            doc_id,
            documents,
            entities,
            placeholders,
        ) {
            Ok(resolved) => out.add_reference(resolved.target_id),
            Err(err) => {
                debug!(link = %link.original_text, "skipping unresolvable wiki link: {err}");
                diagnostics.push(err);
            }
        }
    }
}

fn collect_tags(
    text: &str,
    entities: &mut EntityRegistry,
    out: &mut DocumentEntities,
    diagnostics: &mut Vec<KbError>,
) {
    for tag in scan::tags(text) {
        match entities.get_or_create(GlobalKind::Tag, &tag, EntityExtras::default()) {
            Ok((tag_id, _)) => out.add_reference(tag_id),
            Err(err) => diagnostics.push(err),
        }
    }
}
