//! Syntactic layers over terms: dependencies, chunks and markables.

use serde::{Deserialize, Serialize};

use super::external_ref::ExternalRef;
use super::span::Span;
use super::term::TermId;

/// Directed, labelled dependency edge between two terms.
///
/// Dependencies have no identifier; two edges are the same edge when all
/// fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dep {
    from: TermId,
    to: TermId,
    /// Relation label (e.g. "nsubj").
    pub rfunc: String,
    /// Declension case.
    pub case: Option<String>,
}

impl Dep {
    pub(crate) fn new(from: TermId, to: TermId, rfunc: impl Into<String>) -> Self {
        Self {
            from,
            to,
            rfunc: rfunc.into(),
            case: None,
        }
    }

    /// Governor.
    pub fn from(&self) -> &TermId {
        &self.from
    }

    /// Dependent.
    pub fn to(&self) -> &TermId {
        &self.to
    }

    /// Whether the edge touches `term`.
    pub fn touches(&self, term: &TermId) -> bool {
        &self.from == term || &self.to == term
    }
}

/// Phrase chunk over a run of terms.
///
/// The chunk head is the head of its span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    id: String,
    span: Span<TermId>,
    /// Phrase type (e.g. "NP").
    pub phrase: Option<String>,
    /// Declension case.
    pub case: Option<String>,
}

impl Chunk {
    pub(crate) fn new(id: String, span: Span<TermId>) -> Self {
        Self {
            id,
            span,
            phrase: None,
            case: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Covered terms.
    pub fn span(&self) -> &Span<TermId> {
        &self.span
    }

    /// Head term.
    pub fn head(&self) -> Option<&TermId> {
        self.span.head()
    }
}

/// Markable produced by an external annotation source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    id: String,
    span: Span<TermId>,
    /// Mark type.
    pub mark_type: Option<String>,
    /// Lemma.
    pub lemma: Option<String>,
    /// Part of speech.
    pub pos: Option<String>,
    /// Morphological features.
    pub morphofeat: Option<String>,
    /// Declension case.
    pub case: Option<String>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
}

impl Mark {
    pub(crate) fn new(id: String, span: Span<TermId>) -> Self {
        Self {
            id,
            span,
            mark_type: None,
            lemma: None,
            pos: None,
            morphofeat: None,
            case: None,
            external_refs: Vec::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Covered terms.
    pub fn span(&self) -> &Span<TermId> {
        &self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dep_touches_both_ends() {
        let dep = Dep::new(TermId::new("t2"), TermId::new("t1"), "nsubj");
        assert!(dep.touches(&TermId::new("t1")));
        assert!(dep.touches(&TermId::new("t2")));
        assert!(!dep.touches(&TermId::new("t3")));
    }

    #[test]
    fn test_chunk_head_comes_from_span() {
        let span = Span::with_head(vec![TermId::new("t1"), TermId::new("t2")], TermId::new("t2"));
        let chunk = Chunk::new("c1".to_string(), span);
        assert_eq!(chunk.head(), Some(&TermId::new("t2")));
    }
}
