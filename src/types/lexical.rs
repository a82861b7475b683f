//! Lexical-semantic layers: super-sense spans and document topics.

use serde::{Deserialize, Serialize};

use super::external_ref::ExternalRef;
use super::span::Span;
use super::term::TermId;

/// Super-sense tag over a run of terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SstSpan {
    id: String,
    span: Span<TermId>,
    /// Tag type.
    pub sst_type: Option<String>,
    /// Tag label (e.g. "noun.person").
    pub label: Option<String>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl SstSpan {
    pub(crate) fn new(id: String, span: Span<TermId>) -> Self {
        Self {
            id,
            span,
            sst_type: None,
            label: None,
            external_refs: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Tagged terms.
    pub fn span(&self) -> &Span<TermId> {
        &self.span
    }
}

/// Document topic with its probability.
///
/// Topic ids are not part of the serialized form; a loaded topic receives a
/// fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    id: String,
    /// Topic label.
    pub label: String,
    /// Probability of the topic.
    pub probability: Option<f32>,
}

impl Topic {
    pub(crate) fn new(id: String, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            probability: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }
}
