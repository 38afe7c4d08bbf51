//! Namespaces and IRI construction.

use crate::model::NamedNode;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

pub mod xsd {
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// The `kb:` namespace rooted at the configured base URI.
///
/// Entity IRIs are the base with the id's leading `/` removed, so the id's
/// `/`-separated path survives into the URI.
#[derive(Debug, Clone)]
pub struct KbVocab {
    base: String,
}

impl KbVocab {
    /// `base_uri` must end with `/`; the config layer validates this.
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base: base_uri.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// IRI for an entity id of the form `/{Kind}/{path}`.
    pub fn entity(&self, id: &str) -> NamedNode {
        NamedNode::new(format!("{}{}", self.base, id.trim_start_matches('/')))
    }

    /// IRI for a `kb:` class such as `Document` or `Person`.
    pub fn class(&self, name: &str) -> NamedNode {
        NamedNode::new(format!("{}{name}", self.base))
    }

    /// IRI for a `kb:` predicate such as `hasEntity`.
    pub fn predicate(&self, name: &str) -> NamedNode {
        NamedNode::new(format!("{}{name}", self.base))
    }

    pub fn rdf_type(&self) -> NamedNode {
        NamedNode::new(RDF_TYPE)
    }

    pub fn rdfs_label(&self) -> NamedNode {
        NamedNode::new(RDFS_LABEL)
    }
}
