//! Mapping from knowledge base entities to RDF triples.

use crate::model::{Graph, Literal, NamedNode, Triple};
use crate::vocab::{KbVocab, xsd};
use chrono::{DateTime, SecondsFormat, Utc};
use kb_core::error::KbError;
use kb_core::model::{
    Document, DocumentEntities, GlobalEntity, LiteralValue, PlaceholderDocument,
};

/// Renders entities and document nodes into triples under a base URI.
#[derive(Debug, Clone)]
pub struct RdfEmitter {
    vocab: KbVocab,
}

impl RdfEmitter {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            vocab: KbVocab::new(base_uri),
        }
    }

    pub fn vocab(&self) -> &KbVocab {
        &self.vocab
    }

    /// Emit a document node, its literal properties, its contained entities,
    /// and a bidirectional mention pair for every referenced entity.
    pub fn emit_document(
        &self,
        document: &Document,
        entities: &DocumentEntities,
        graph: &mut Graph,
    ) -> Result<(), KbError> {
        let subject = self.vocab.entity(&document.id);
        self.type_and_label(&subject, "Document", &document.title, graph);
        graph.insert(Triple::new(
            subject.clone(),
            self.vocab.predicate("originalPath"),
            Literal::plain(&document.original_path),
        ));
        if let Some(created) = document.created {
            graph.insert(Triple::new(
                subject.clone(),
                self.vocab.predicate("created"),
                datetime_literal(created),
            ));
        }
        if let Some(modified) = document.modified {
            graph.insert(Triple::new(
                subject.clone(),
                self.vocab.predicate("modified"),
                datetime_literal(modified),
            ));
        }
        graph.insert(Triple::new(
            subject.clone(),
            self.vocab.predicate("wordCount"),
            Literal::typed(document.word_count.to_string(), xsd::INTEGER),
        ));

        for property in &entities.literals {
            let object = self.literal_term(&property.value)?;
            graph.insert(Triple::new(
                subject.clone(),
                self.vocab.predicate(&property.predicate),
                object,
            ));
        }

        for section in &entities.sections {
            let node = self.vocab.entity(&section.id);
            self.type_and_label(&node, "Section", &section.heading, graph);
            graph.insert(Triple::new(
                node.clone(),
                self.vocab.predicate("heading"),
                Literal::plain(&section.heading),
            ));
            graph.insert(Triple::new(
                node.clone(),
                self.vocab.predicate("headingLevel"),
                Literal::typed(section.level.to_string(), xsd::INTEGER),
            ));
            self.mention_pair(&subject, &node, graph);
        }

        for todo in &entities.todos {
            let node = self.vocab.entity(&todo.id);
            self.type_and_label(&node, "TodoItem", &todo.description, graph);
            graph.insert(Triple::new(
                node.clone(),
                self.vocab.predicate("description"),
                Literal::plain(&todo.description),
            ));
            graph.insert(Triple::new(
                node.clone(),
                self.vocab.predicate("isCompleted"),
                Literal::typed(todo.is_completed.to_string(), xsd::BOOLEAN),
            ));
            graph.insert(Triple::new(
                node.clone(),
                self.vocab.predicate("lineNumber"),
                Literal::typed(todo.line_number.to_string(), xsd::INTEGER),
            ));
            self.mention_pair(&subject, &node, graph);
        }

        for referenced_id in entities.references.keys() {
            let node = self.vocab.entity(referenced_id);
            self.mention_pair(&subject, &node, graph);
        }

        Ok(())
    }

    /// Emit one global entity block: class, label, aliases, and properties.
    /// Called once per entity at run finalization.
    pub fn emit_global(&self, entity: &GlobalEntity, graph: &mut Graph) {
        let subject = self.vocab.entity(&entity.id);
        self.type_and_label(&subject, entity.kind.class_name(), &entity.canonical_name, graph);
        for alias in &entity.aliases {
            graph.insert(Triple::new(
                subject.clone(),
                self.vocab.predicate("alias"),
                Literal::plain(alias),
            ));
        }
        for (key, value) in &entity.scalars {
            graph.insert(Triple::new(
                subject.clone(),
                self.vocab.predicate(key),
                Literal::plain(value),
            ));
        }
        for (key, values) in &entity.multi {
            for value in values {
                graph.insert(Triple::new(
                    subject.clone(),
                    self.vocab.predicate(key),
                    Literal::plain(value),
                ));
            }
        }
    }

    /// Emit a placeholder document block.
    pub fn emit_placeholder(&self, placeholder: &PlaceholderDocument, graph: &mut Graph) {
        let subject = self.vocab.entity(&placeholder.id);
        self.type_and_label(
            &subject,
            "PlaceholderDocument",
            &placeholder.original_link_text,
            graph,
        );
    }

    fn type_and_label(&self, subject: &NamedNode, class: &str, label: &str, graph: &mut Graph) {
        graph.insert(Triple::new(
            subject.clone(),
            self.vocab.rdf_type(),
            self.vocab.class(class),
        ));
        graph.insert(Triple::new(
            subject.clone(),
            self.vocab.rdfs_label(),
            Literal::plain(label),
        ));
    }

    /// The `kb:hasEntity` / `kb:mentionedIn` pair, inserted atomically so the
    /// bidirectional invariant holds for every emitted graph.
    fn mention_pair(&self, document: &NamedNode, entity: &NamedNode, graph: &mut Graph) {
        graph.insert(Triple::new(
            document.clone(),
            self.vocab.predicate("hasEntity"),
            entity.clone(),
        ));
        graph.insert(Triple::new(
            entity.clone(),
            self.vocab.predicate("mentionedIn"),
            document.clone(),
        ));
    }

    fn literal_term(&self, value: &LiteralValue) -> Result<Literal, KbError> {
        Ok(match value {
            LiteralValue::Str(s) => Literal::plain(s),
            LiteralValue::Int(n) => Literal::typed(n.to_string(), xsd::INTEGER),
            LiteralValue::Float(f) => {
                if !f.is_finite() {
                    return Err(KbError::EmissionFailure(format!(
                        "non-finite number {f} has no literal form"
                    )));
                }
                Literal::typed(f.to_string(), xsd::DOUBLE)
            }
            LiteralValue::Bool(b) => Literal::typed(b.to_string(), xsd::BOOLEAN),
            LiteralValue::DateTime(dt) => datetime_literal(*dt),
        })
    }
}

fn datetime_literal(value: DateTime<Utc>) -> Literal {
    Literal::typed(
        value.to_rfc3339_opts(SecondsFormat::Secs, true),
        xsd::DATE_TIME,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_core::model::{LiteralProperty, Section, TodoItem};

    const BASE: &str = "http://example.org/kb/";

    fn make_document(id: &str, path: &str, title: &str) -> Document {
        Document {
            id: id.to_string(),
            original_path: path.to_string(),
            path_without_extension: path.trim_end_matches(".md").to_string(),
            title: title.to_string(),
            created: None,
            modified: None,
            word_count: 2,
            doc_type: None,
        }
    }

    #[test]
    fn test_document_block_has_type_label_path() {
        let emitter = RdfEmitter::new(BASE);
        let mut graph = Graph::new();
        let document = make_document("/Document/readme", "readme.md", "readme");
        emitter
            .emit_document(&document, &DocumentEntities::default(), &mut graph)
            .unwrap();

        let vocab = emitter.vocab();
        let subject = vocab.entity("/Document/readme");
        assert!(graph.contains(&Triple::new(
            subject.clone(),
            vocab.rdf_type(),
            vocab.class("Document"),
        )));
        assert!(graph.contains(&Triple::new(
            subject.clone(),
            vocab.rdfs_label(),
            Literal::plain("readme"),
        )));
        assert!(graph.contains(&Triple::new(
            subject,
            vocab.predicate("originalPath"),
            Literal::plain("readme.md"),
        )));
    }

    #[test]
    fn test_mention_pairs_are_bidirectional() {
        let emitter = RdfEmitter::new(BASE);
        let mut graph = Graph::new();
        let document = make_document("/Document/a", "a.md", "a");
        let mut entities = DocumentEntities::default();
        entities.add_reference("/Person/alex-cipher");
        emitter.emit_document(&document, &entities, &mut graph).unwrap();

        let vocab = emitter.vocab();
        let doc = vocab.entity("/Document/a");
        let person = vocab.entity("/Person/alex-cipher");
        assert!(graph.contains(&Triple::new(
            doc.clone(),
            vocab.predicate("hasEntity"),
            person.clone(),
        )));
        assert!(graph.contains(&Triple::new(
            person,
            vocab.predicate("mentionedIn"),
            doc,
        )));
    }

    #[test]
    fn test_todo_and_section_triples() {
        let emitter = RdfEmitter::new(BASE);
        let mut graph = Graph::new();
        let document = make_document("/Document/d", "d.md", "d");
        let entities = DocumentEntities {
            sections: vec![Section {
                id: "/Document/d/Section/plan".into(),
                heading: "Plan".into(),
                level: 1,
                parent: None,
            }],
            todos: vec![TodoItem {
                id: "/Document/d/TodoItem/3-0123456789".into(),
                description: "Journaling".into(),
                is_completed: true,
                line_number: 3,
                content_hash: "0123456789".into(),
            }],
            ..DocumentEntities::default()
        };
        emitter.emit_document(&document, &entities, &mut graph).unwrap();

        let vocab = emitter.vocab();
        let todo = vocab.entity("/Document/d/TodoItem/3-0123456789");
        assert!(graph.contains(&Triple::new(
            todo.clone(),
            vocab.predicate("isCompleted"),
            Literal::typed("true", xsd::BOOLEAN),
        )));
        assert!(graph.contains(&Triple::new(
            todo,
            vocab.predicate("lineNumber"),
            Literal::typed("3", xsd::INTEGER),
        )));
        let section = vocab.entity("/Document/d/Section/plan");
        assert!(graph.contains(&Triple::new(
            section,
            vocab.predicate("headingLevel"),
            Literal::typed("1", xsd::INTEGER),
        )));
    }

    #[test]
    fn test_literal_property_datatypes() {
        let emitter = RdfEmitter::new(BASE);
        let mut graph = Graph::new();
        let document = make_document("/Document/p", "p.md", "p");
        let entities = DocumentEntities {
            literals: vec![
                LiteralProperty {
                    predicate: "status".into(),
                    value: LiteralValue::Str("draft".into()),
                },
                LiteralProperty {
                    predicate: "version".into(),
                    value: LiteralValue::Int(2),
                },
            ],
            ..DocumentEntities::default()
        };
        emitter.emit_document(&document, &entities, &mut graph).unwrap();

        let vocab = emitter.vocab();
        let subject = vocab.entity("/Document/p");
        assert!(graph.contains(&Triple::new(
            subject.clone(),
            vocab.predicate("status"),
            Literal::plain("draft"),
        )));
        assert!(graph.contains(&Triple::new(
            subject,
            vocab.predicate("version"),
            Literal::typed("2", xsd::INTEGER),
        )));
    }

    #[test]
    fn test_non_finite_float_is_emission_failure() {
        let emitter = RdfEmitter::new(BASE);
        let mut graph = Graph::new();
        let document = make_document("/Document/f", "f.md", "f");
        let entities = DocumentEntities {
            literals: vec![LiteralProperty {
                predicate: "ratio".into(),
                value: LiteralValue::Float(f64::NAN),
            }],
            ..DocumentEntities::default()
        };
        let err = emitter.emit_document(&document, &entities, &mut graph).unwrap_err();
        assert!(matches!(err, KbError::EmissionFailure(_)));
    }

    #[test]
    fn test_global_entity_aliases() {
        let emitter = RdfEmitter::new(BASE);
        let mut graph = Graph::new();
        let mut aliases = std::collections::BTreeSet::new();
        aliases.insert("Alex Cipher".to_string());
        aliases.insert("alex cipher".to_string());
        let entity = GlobalEntity {
            id: "/Person/alex-cipher".into(),
            kind: kb_core::model::GlobalKind::Person,
            canonical_name: "Alex Cipher".into(),
            aliases,
            scalars: Default::default(),
            multi: Default::default(),
        };
        emitter.emit_global(&entity, &mut graph);

        let vocab = emitter.vocab();
        let subject = vocab.entity("/Person/alex-cipher");
        assert!(graph.contains(&Triple::new(
            subject.clone(),
            vocab.rdfs_label(),
            Literal::plain("Alex Cipher"),
        )));
        assert!(graph.contains(&Triple::new(
            subject.clone(),
            vocab.predicate("alias"),
            Literal::plain("alex cipher"),
        )));
        assert!(graph.contains(&Triple::new(
            subject,
            vocab.rdf_type(),
            vocab.class("Person"),
        )));
    }
}
