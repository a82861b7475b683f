//! Entity-like layers: named entities, features, coreference, linked entities
//! and the relations between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::external_ref::ExternalRef;
use super::span::Span;
use super::term::TermId;
use super::text::WfId;
use crate::error::{NafError, Result};

/// Named entity mention(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: String,
    references: Vec<Span<TermId>>,
    /// Entity type (e.g. "PER", "LOC").
    pub entity_type: Option<String>,
    /// Whether this is a named entity (serialized as `unnamed="yes"` when false).
    pub named: bool,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl Entity {
    pub(crate) fn new(id: String, references: Vec<Span<TermId>>) -> Self {
        Self {
            id,
            references,
            entity_type: None,
            named: true,
            external_refs: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reference spans; the first is the primary mention.
    pub fn references(&self) -> &[Span<TermId>] {
        &self.references
    }

    /// Primary mention.
    pub fn span(&self) -> Option<&Span<TermId>> {
        self.references.first()
    }

    /// Every term of every reference, in order.
    pub fn terms(&self) -> impl Iterator<Item = &TermId> {
        self.references.iter().flat_map(|s| s.targets())
    }
}

/// Whether a feature is a property or a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// `<property>` inside `<properties>`.
    Property,
    /// `<category>` inside `<categories>`.
    Category,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property => write!(f, "property"),
            Self::Category => write!(f, "category"),
        }
    }
}

/// Property or category annotated over terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    id: String,
    kind: FeatureKind,
    references: Vec<Span<TermId>>,
    /// Lemma of the feature.
    pub lemma: String,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl Feature {
    pub(crate) fn new(id: String, kind: FeatureKind, lemma: impl Into<String>, references: Vec<Span<TermId>>) -> Self {
        Self {
            id,
            kind,
            references,
            lemma: lemma.into(),
            external_refs: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Property or category.
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Reference spans.
    pub fn references(&self) -> &[Span<TermId>] {
        &self.references
    }

    /// Every term of every reference.
    pub fn terms(&self) -> impl Iterator<Item = &TermId> {
        self.references.iter().flat_map(|s| s.targets())
    }
}

/// Coreference chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coref {
    id: String,
    mentions: Vec<Span<TermId>>,
    /// Chain type.
    pub coref_type: Option<String>,
    /// Cluster label.
    pub cluster: Option<String>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl Coref {
    pub(crate) fn new(id: String, mentions: Vec<Span<TermId>>) -> Self {
        Self {
            id,
            mentions,
            coref_type: None,
            cluster: None,
            external_refs: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mention spans.
    pub fn mentions(&self) -> &[Span<TermId>] {
        &self.mentions
    }

    /// Every term of every mention.
    pub fn terms(&self) -> impl Iterator<Item = &TermId> {
        self.mentions.iter().flat_map(|s| s.targets())
    }
}

/// Entity linked to a knowledge base over word forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntity {
    id: String,
    span: Span<WfId>,
    /// Knowledge base name.
    pub resource: Option<String>,
    /// Knowledge base entry.
    pub reference: Option<String>,
    /// Linking confidence.
    pub confidence: Option<f64>,
    /// Whether the mention was spotted rather than linked.
    pub spotted: bool,
    types: Vec<(String, Vec<String>)>,
}

impl LinkedEntity {
    pub(crate) fn new(id: String, span: Span<WfId>) -> Self {
        Self {
            id,
            span,
            resource: None,
            reference: None,
            confidence: None,
            spotted: false,
            types: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Covered word forms.
    pub fn span(&self) -> &Span<WfId> {
        &self.span
    }

    /// Add a type label under `source`.
    pub fn add_type(&mut self, source: impl Into<String>, label: impl Into<String>) {
        let source = source.into();
        match self.types.iter_mut().find(|(s, _)| *s == source) {
            Some((_, labels)) => labels.push(label.into()),
            None => self.types.push((source, vec![label.into()])),
        }
    }

    /// Type labels grouped by source, in insertion order.
    pub fn types(&self) -> &[(String, Vec<String>)] {
        &self.types
    }
}

/// Annotation that can be the endpoint of a [`Relation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relational {
    /// An entity id.
    Entity(String),
    /// A property id.
    Property(String),
    /// A category id.
    Category(String),
}

impl Relational {
    /// Identifier of the referenced annotation.
    pub fn id(&self) -> &str {
        match self {
            Self::Entity(id) | Self::Property(id) | Self::Category(id) => id,
        }
    }

    /// Endpoint for a feature of the given kind.
    pub fn feature(kind: FeatureKind, id: impl Into<String>) -> Self {
        match kind {
            FeatureKind::Property => Self::Property(id.into()),
            FeatureKind::Category => Self::Category(id.into()),
        }
    }
}

impl fmt::Display for Relational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Directed relation between two relational annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    id: String,
    from: Relational,
    to: Relational,
    confidence: Option<f32>,
}

impl Relation {
    pub(crate) fn new(id: String, from: Relational, to: Relational) -> Self {
        Self {
            id,
            from,
            to,
            confidence: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source endpoint.
    pub fn from(&self) -> &Relational {
        &self.from
    }

    /// Target endpoint.
    pub fn to(&self) -> &Relational {
        &self.to
    }

    /// Confidence in [0, 1].
    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    /// Set the confidence; values outside [0, 1] are rejected.
    pub fn set_confidence(&mut self, confidence: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(NafError::InvalidValue {
                field: "relation confidence".to_string(),
                reason: format!("{} is outside [0, 1]", confidence),
            });
        }
        self.confidence = Some(confidence);
        Ok(())
    }
}
