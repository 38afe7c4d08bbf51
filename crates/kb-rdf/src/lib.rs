//! RDF output layer for kb-graph.
//!
//! [`model`] holds the term and triple types (no blank nodes: every entity
//! has a named IRI), [`vocab`] the namespaces, [`turtle`] the serializer, and
//! [`emitter`] the mapping from knowledge base entities to triples.

pub mod emitter;
pub mod model;
pub mod turtle;
pub mod vocab;
