//! Opinions: holder, target and expression spans over terms.

use serde::{Deserialize, Serialize};

use super::external_ref::ExternalRef;
use super::span::Span;
use super::term::TermId;

/// Who holds the opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionHolder {
    /// Holder type.
    pub holder_type: Option<String>,
    /// Holder terms.
    pub span: Span<TermId>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl OpinionHolder {
    /// Create a holder over `span`.
    pub fn new(span: Span<TermId>) -> Self {
        Self {
            holder_type: None,
            span,
            external_refs: Vec::new(),
        }
    }
}

/// What the opinion is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionTarget {
    /// Target type.
    pub target_type: Option<String>,
    /// Target terms.
    pub span: Span<TermId>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl OpinionTarget {
    /// Create a target over `span`.
    pub fn new(span: Span<TermId>) -> Self {
        Self {
            target_type: None,
            span,
            external_refs: Vec::new(),
        }
    }
}

/// The words expressing the opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionExpression {
    /// Polarity.
    pub polarity: Option<String>,
    /// Strength.
    pub strength: Option<String>,
    /// Subjectivity.
    pub subjectivity: Option<String>,
    /// Semantic type.
    pub sentiment_semantic_type: Option<String>,
    /// Product feature.
    pub sentiment_product_feature: Option<String>,
    /// Expression terms.
    pub span: Span<TermId>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl OpinionExpression {
    /// Create an expression over `span`.
    pub fn new(span: Span<TermId>) -> Self {
        Self {
            polarity: None,
            strength: None,
            subjectivity: None,
            sentiment_semantic_type: None,
            sentiment_product_feature: None,
            span,
            external_refs: Vec::new(),
        }
    }

    /// Set the polarity.
    pub fn with_polarity(mut self, polarity: impl Into<String>) -> Self {
        self.polarity = Some(polarity.into());
        self
    }
}

/// An opinion with optional holder, target and expression.
///
/// The parts are replaced through the document so that the term index follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    id: String,
    holder: Option<OpinionHolder>,
    target: Option<OpinionTarget>,
    expression: Option<OpinionExpression>,
    /// Opinion label.
    pub label: Option<String>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl Opinion {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            holder: None,
            target: None,
            expression: None,
            label: None,
            external_refs: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Holder, if any.
    pub fn holder(&self) -> Option<&OpinionHolder> {
        self.holder.as_ref()
    }

    /// Target, if any.
    pub fn target(&self) -> Option<&OpinionTarget> {
        self.target.as_ref()
    }

    /// Expression, if any.
    pub fn expression(&self) -> Option<&OpinionExpression> {
        self.expression.as_ref()
    }

    pub(crate) fn set_holder(&mut self, holder: Option<OpinionHolder>) {
        self.holder = holder;
    }

    pub(crate) fn set_target(&mut self, target: Option<OpinionTarget>) {
        self.target = target;
    }

    pub(crate) fn set_expression(&mut self, expression: Option<OpinionExpression>) {
        self.expression = expression;
    }

    /// Terms of holder, target and expression, in that order.
    pub fn terms(&self) -> impl Iterator<Item = &TermId> {
        let holder = self.holder.iter().flat_map(|h| h.span.targets());
        let target = self.target.iter().flat_map(|t| t.span.targets());
        let expression = self.expression.iter().flat_map(|e| e.span.targets());
        holder.chain(target).chain(expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_chain_all_parts() {
        let mut op = Opinion::new("o1".to_string());
        op.set_holder(Some(OpinionHolder::new(Span::from_targets(vec![TermId::new("t1")]))));
        op.set_expression(Some(
            OpinionExpression::new(Span::from_targets(vec![TermId::new("t2"), TermId::new("t3")]))
                .with_polarity("positive"),
        ));

        let terms: Vec<_> = op.terms().map(|t| t.as_str()).collect();
        assert_eq!(terms, vec!["t1", "t2", "t3"]);
        assert!(op.target().is_none());
        assert_eq!(op.expression().unwrap().polarity.as_deref(), Some("positive"));
    }
}
