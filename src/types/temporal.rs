//! Time expressions, temporal and causal links, and factuality.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::span::Span;
use super::term::TermId;
use super::text::WfId;

/// TimeML time expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timex3 {
    id: String,
    span: Option<Span<WfId>>,
    /// TIMEX3 type (DATE, TIME, DURATION, SET).
    pub timex_type: String,
    /// Id of the timex this duration begins at.
    pub begin_point: Option<String>,
    /// Id of the timex this duration ends at.
    pub end_point: Option<String>,
    /// Quantifier.
    pub quant: Option<String>,
    /// Frequency.
    pub freq: Option<String>,
    /// Function in document (e.g. CREATION_TIME).
    pub function_in_document: Option<String>,
    /// Whether the value comes from a temporal function.
    pub temporal_function: Option<bool>,
    /// Normalized value.
    pub value: Option<String>,
    /// Value computed from a function.
    pub value_from_function: Option<String>,
    /// Modifier.
    pub modifier: Option<String>,
    /// Anchor timex id.
    pub anchor_time_id: Option<String>,
    /// Free comment.
    pub comment: Option<String>,
}

impl Timex3 {
    pub(crate) fn new(id: String, timex_type: impl Into<String>, span: Option<Span<WfId>>) -> Self {
        Self {
            id,
            span,
            timex_type: timex_type.into(),
            begin_point: None,
            end_point: None,
            quant: None,
            freq: None,
            function_in_document: None,
            temporal_function: None,
            value: None,
            value_from_function: None,
            modifier: None,
            anchor_time_id: None,
            comment: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Covered word forms (document-level timexes have none).
    pub fn span(&self) -> Option<&Span<WfId>> {
        self.span.as_ref()
    }
}

/// Endpoint of a temporal link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TLinkReferable {
    /// A predicate id (serialized type `event`).
    Event(String),
    /// A time expression id (serialized type `timex`).
    Timex(String),
}

impl TLinkReferable {
    /// Referenced id.
    pub fn id(&self) -> &str {
        match self {
            Self::Event(id) | Self::Timex(id) => id,
        }
    }

    /// Serialized discriminant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Event(_) => "event",
            Self::Timex(_) => "timex",
        }
    }
}

impl fmt::Display for TLinkReferable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Temporal relation between events and time expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TLink {
    id: String,
    from: TLinkReferable,
    to: TLinkReferable,
    /// Relation type (BEFORE, AFTER, INCLUDES, ...).
    pub rel_type: String,
}

impl TLink {
    pub(crate) fn new(id: String, from: TLinkReferable, to: TLinkReferable, rel_type: impl Into<String>) -> Self {
        Self {
            id,
            from,
            to,
            rel_type: rel_type.into(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source endpoint.
    pub fn from(&self) -> &TLinkReferable {
        &self.from
    }

    /// Target endpoint.
    pub fn to(&self) -> &TLinkReferable {
        &self.to
    }
}

/// Causal relation between two predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CLink {
    id: String,
    from: String,
    to: String,
    /// Relation type.
    pub rel_type: Option<String>,
}

impl CLink {
    pub(crate) fn new(id: String, from: String, to: String) -> Self {
        Self {
            id,
            from,
            to,
            rel_type: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cause predicate id.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Effect predicate id.
    pub fn to(&self) -> &str {
        &self.to
    }
}

/// One factuality prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactualityPart {
    /// Predicted value (e.g. "CT+").
    pub prediction: String,
    /// Confidence of the prediction.
    pub confidence: Option<f64>,
}

/// Factuality of the event expressed by a term.
///
/// Identified by the term's first word form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factuality {
    wf: WfId,
    term: TermId,
    /// Predictions in insertion order.
    pub parts: Vec<FactualityPart>,
}

impl Factuality {
    pub(crate) fn new(wf: WfId, term: TermId) -> Self {
        Self {
            wf,
            term,
            parts: Vec::new(),
        }
    }

    /// Identifier (the first word form of the term).
    pub fn id(&self) -> &str {
        self.wf.as_str()
    }

    /// Word form the factuality is keyed by.
    pub fn wf(&self) -> &WfId {
        &self.wf
    }

    /// Annotated term.
    pub fn term(&self) -> &TermId {
        &self.term
    }

    /// Append a prediction.
    pub fn add_part(&mut self, prediction: impl Into<String>, confidence: Option<f64>) {
        self.parts.push(FactualityPart {
            prediction: prediction.into(),
            confidence,
        });
    }

    /// Most confident prediction; the earliest wins ties.
    pub fn max_part(&self) -> Option<&FactualityPart> {
        let score = |p: &FactualityPart| p.confidence.unwrap_or(f64::NEG_INFINITY);
        self.parts.iter().fold(None, |best: Option<&FactualityPart>, part| match best {
            Some(b) if score(b) >= score(part) => Some(b),
            _ => Some(part),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_part() {
        let mut f = Factuality::new(WfId::new("w2"), TermId::new("t2"));
        assert!(f.max_part().is_none());
        f.add_part("CT+", Some(0.4));
        f.add_part("PR+", Some(0.9));
        f.add_part("PS+", Some(0.9));
        f.add_part("U", None);
        assert_eq!(f.max_part().unwrap().prediction, "PR+");
        assert_eq!(f.id(), "w2");
    }

    #[test]
    fn test_tlink_referable_type_names() {
        assert_eq!(TLinkReferable::Event("pr1".into()).type_name(), "event");
        assert_eq!(TLinkReferable::Timex("tmx1".into()).type_name(), "timex");
        assert_eq!(TLinkReferable::Timex("tmx1".into()).id(), "tmx1");
    }
}
