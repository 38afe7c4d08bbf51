//! Turtle serialization.
//!
//! Output is a pure function of the graph's triple set: triples are grouped
//! by subject in natural order, predicates written as prefixed names where
//! the local part allows it, and entity IRIs (whose local parts contain `/`)
//! written in full.

use crate::model::{Graph, Literal, NamedNode, Term};
use crate::vocab::{RDF_NS, RDFS_NS, XSD_NS};

/// Serialize `graph` to Turtle with `@prefix` declarations for the standard
/// namespaces and the `kb:` base.
pub fn write_turtle(graph: &Graph, base_uri: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("@prefix kb: <{base_uri}> .\n"));
    out.push_str(&format!("@prefix rdf: <{RDF_NS}> .\n"));
    out.push_str(&format!("@prefix rdfs: <{RDFS_NS}> .\n"));
    out.push_str(&format!("@prefix xsd: <{XSD_NS}> .\n"));

    let mut current_subject: Option<&NamedNode> = None;
    for triple in graph.iter() {
        if current_subject == Some(&triple.subject) {
            // Continue the previous subject block.
            let last_dot = out.rfind(" .\n").expect("open subject block");
            out.replace_range(last_dot..last_dot + 3, " ;\n");
            out.push_str("    ");
        } else {
            out.push('\n');
            out.push_str(&render_node(&triple.subject, base_uri));
            out.push(' ');
            current_subject = Some(&triple.subject);
            // First predicate goes on the subject line.
        }
        out.push_str(&render_node(&triple.predicate, base_uri));
        out.push(' ');
        out.push_str(&render_term(&triple.object, base_uri));
        out.push_str(" .\n");
    }
    out
}

fn render_term(term: &Term, base_uri: &str) -> String {
    match term {
        Term::Node(node) => render_node(node, base_uri),
        Term::Literal(literal) => render_literal(literal, base_uri),
    }
}

fn render_node(node: &NamedNode, base_uri: &str) -> String {
    let iri = node.value();
    for (prefix, ns) in [("kb", base_uri), ("rdf", RDF_NS), ("rdfs", RDFS_NS), ("xsd", XSD_NS)] {
        if let Some(local) = iri.strip_prefix(ns)
            && is_prefixable_local(local)
        {
            return format!("{prefix}:{local}");
        }
    }
    format!("<{iri}>")
}

/// Whether a local name is safe to write as a prefixed name. Entity IRIs
/// carry `/` in their local part and must stay fully written.
fn is_prefixable_local(local: &str) -> bool {
    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn render_literal(literal: &Literal, base_uri: &str) -> String {
    let quoted = format!("\"{}\"", escape(literal.value()));
    match literal.datatype() {
        Some(datatype) => format!("{quoted}^^{}", render_node(datatype, base_uri)),
        None => quoted,
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Triple;
    use crate::vocab::{KbVocab, xsd};

    const BASE: &str = "http://example.org/kb/";

    #[test]
    fn test_subject_grouping_and_prefixing() {
        let vocab = KbVocab::new(BASE);
        let mut graph = Graph::new();
        let doc = vocab.entity("/Document/readme");
        graph.insert(Triple::new(
            doc.clone(),
            vocab.rdf_type(),
            vocab.class("Document"),
        ));
        graph.insert(Triple::new(
            doc,
            vocab.rdfs_label(),
            Literal::plain("readme"),
        ));

        let turtle = write_turtle(&graph, BASE);
        assert!(turtle.contains("@prefix kb: <http://example.org/kb/> ."));
        // Entity IRI has a slash in its local part: written in full.
        assert!(turtle.contains("<http://example.org/kb/Document/readme> rdf:type kb:Document ;"));
        assert!(turtle.contains("    rdfs:label \"readme\" .\n"));
    }

    #[test]
    fn test_literal_escaping() {
        let vocab = KbVocab::new(BASE);
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            vocab.entity("/Document/a"),
            vocab.predicate("originalPath"),
            Literal::plain("quotes \"and\"\nnewline"),
        ));
        let turtle = write_turtle(&graph, BASE);
        assert!(turtle.contains(r#""quotes \"and\"\nnewline""#));
    }

    #[test]
    fn test_typed_literal() {
        let vocab = KbVocab::new(BASE);
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            vocab.entity("/Document/d/TodoItem/3-abc"),
            vocab.predicate("lineNumber"),
            Literal::typed("3", xsd::INTEGER),
        ));
        let turtle = write_turtle(&graph, BASE);
        assert!(turtle.contains("\"3\"^^xsd:integer"));
    }

    #[test]
    fn test_deterministic_output() {
        let vocab = KbVocab::new(BASE);
        let mut a = Graph::new();
        let mut b = Graph::new();
        let t1 = Triple::new(vocab.entity("/Person/x"), vocab.rdfs_label(), Literal::plain("X"));
        let t2 = Triple::new(
            vocab.entity("/Person/x"),
            vocab.rdf_type(),
            vocab.class("Person"),
        );
        a.insert(t1.clone());
        a.insert(t2.clone());
        b.insert(t2);
        b.insert(t1);
        assert_eq!(write_turtle(&a, BASE), write_turtle(&b, BASE));
    }
}
