//! References to external resources (lexicons, ontologies, knowledge bases).

use serde::{Deserialize, Serialize};

/// Pointer from an annotation to an entry of an external resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRef {
    /// Resource name (e.g. "WordNet-3.0", "dbpedia").
    pub resource: String,
    /// Code of the referred element inside the resource.
    pub reference: String,
    /// Confidence of the link.
    pub confidence: Option<f32>,
    /// Tool or process that produced the link.
    pub source: Option<String>,
    /// Nested reference refining this one.
    pub external_ref: Option<Box<ExternalRef>>,
}

impl ExternalRef {
    /// Create a reference without confidence or provenance.
    pub fn new(resource: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            reference: reference.into(),
            confidence: None,
            source: None,
            external_ref: None,
        }
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set the provenance.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a nested reference.
    pub fn with_nested(mut self, nested: ExternalRef) -> Self {
        self.external_ref = Some(Box::new(nested));
        self
    }
}
