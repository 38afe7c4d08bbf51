//! RDF term and triple types, per the RDF 1.1 data model.
//!
//! The emitted graph is a set: inserting the same triple twice is a no-op,
//! and iteration order is the triples' natural order, which keeps
//! serialization deterministic.

use std::collections::BTreeSet;
use std::fmt;

/// An IRI term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamedNode {
    iri: String,
}

impl NamedNode {
    pub fn new(iri: impl Into<String>) -> Self {
        Self { iri: iri.into() }
    }

    pub fn value(&self) -> &str {
        &self.iri
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.iri)
    }
}

/// A literal term: a lexical form with an optional datatype IRI.
/// A missing datatype means a plain (xsd:string) literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    value: String,
    datatype: Option<NamedNode>,
}

impl Literal {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(NamedNode::new(datatype)),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn datatype(&self) -> Option<&NamedNode> {
        self.datatype.as_ref()
    }
}

/// An object position term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Node(NamedNode),
    Literal(Literal),
}

impl From<NamedNode> for Term {
    fn from(node: NamedNode) -> Self {
        Term::Node(node)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

/// A subject–predicate–object triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: NamedNode,
    pub predicate: NamedNode,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: NamedNode, predicate: NamedNode, object: impl Into<Term>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }
}

/// A set of triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, triple: Triple) {
        self.triples.insert(triple);
    }

    /// Move every triple of `other` into this graph.
    pub fn union(&mut self, other: Graph) {
        self.triples.extend(other.triples);
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Triples in natural (subject, predicate, object) order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// All triples with the given subject IRI.
    pub fn subject_triples<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Triple> {
        self.triples.iter().filter(move |t| t.subject.value() == subject)
    }
}
