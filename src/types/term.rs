//! Terms: words and multi-word units built over word forms.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::external_ref::ExternalRef;
use super::span::Span;
use super::text::{Wf, WfId};

/// Identifier of a term (or of a compound component).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(String);

impl TermId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing digits of the id, used in dependency comments (`t12` -> `12`).
    pub fn digits(&self) -> &str {
        let trimmed = self.0.trim_end_matches(|c: char| c.is_ascii_digit());
        &self.0[trimmed.len()..]
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TermId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TermId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for TermId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Sentiment annotation attached to a term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Lexicon the values come from.
    pub resource: Option<String>,
    /// Prior polarity.
    pub polarity: Option<String>,
    /// Polarity strength.
    pub strength: Option<String>,
    /// Subjectivity class.
    pub subjectivity: Option<String>,
    /// Semantic type of the sentiment.
    pub sentiment_semantic_type: Option<String>,
    /// Modifier (intensifier, weakener, ...).
    pub sentiment_modifier: Option<String>,
    /// Marker (negation, ...).
    pub sentiment_marker: Option<String>,
    /// Product feature the sentiment applies to.
    pub sentiment_product_feature: Option<String>,
}

/// A word or multi-word unit spanning one or more word forms.
///
/// Compounds own their components. A component is never listed among the
/// document's top-level terms; it is reachable through its compound and through
/// [`Document::term`](crate::Document::term).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    id: TermId,
    span: Span<WfId>,
    /// Open or closed class.
    pub term_type: Option<String>,
    /// Lemma.
    pub lemma: Option<String>,
    /// Part of speech.
    pub pos: Option<String>,
    /// Morphological features.
    pub morphofeat: Option<String>,
    /// Declension case.
    pub case: Option<String>,
    /// Sentiment annotation.
    pub sentiment: Option<Sentiment>,
    /// Super-sense tag.
    pub supersense: Option<String>,
    /// WordNet sense.
    pub wordnet: Option<String>,
    /// BBN named-entity tag.
    pub bbn: Option<String>,
    /// External references.
    pub external_refs: Vec<ExternalRef>,
    components: Vec<Term>,
    head_component: Option<TermId>,
    compound: Option<TermId>,
    is_component: bool,
}

impl Term {
    pub(crate) fn new(id: TermId, span: Span<WfId>, is_component: bool) -> Self {
        Self {
            id,
            span,
            term_type: None,
            lemma: None,
            pos: None,
            morphofeat: None,
            case: None,
            sentiment: None,
            supersense: None,
            wordnet: None,
            bbn: None,
            external_refs: Vec::new(),
            components: Vec::new(),
            head_component: None,
            compound: None,
            is_component,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &TermId {
        &self.id
    }

    /// Word forms covered by this term.
    pub fn span(&self) -> &Span<WfId> {
        &self.span
    }

    /// Word form ids, in span order.
    pub fn wfs(&self) -> &[WfId] {
        self.span.targets()
    }

    /// Components of a compound, in order.
    pub fn components(&self) -> &[Term] {
        &self.components
    }

    /// Mutable access to components (their spans stay fixed).
    pub fn components_mut(&mut self) -> &mut [Term] {
        &mut self.components
    }

    /// Head component of a compound.
    pub fn head_component(&self) -> Option<&TermId> {
        self.head_component.as_ref()
    }

    /// Compound this term belongs to, if it is a component.
    pub fn compound(&self) -> Option<&TermId> {
        self.compound.as_ref()
    }

    /// Whether this term is a component of a compound.
    pub fn is_component(&self) -> bool {
        self.is_component
    }

    pub(crate) fn add_component(&mut self, mut component: Term, is_head: bool) {
        component.is_component = true;
        component.compound = Some(self.id.clone());
        if is_head {
            self.head_component = Some(component.id.clone());
        }
        self.components.push(component);
    }

    pub(crate) fn set_head_component(&mut self, id: TermId) {
        self.head_component = Some(id);
    }

    /// Find a component by id.
    pub fn component(&self, id: &str) -> Option<&Term> {
        self.components.iter().find(|c| c.id.as_str() == id)
    }

    pub(crate) fn component_mut(&mut self, id: &str) -> Option<&mut Term> {
        self.components.iter_mut().find(|c| c.id.as_str() == id)
    }
}

/// Surface form of a run of word forms.
///
/// Forms are laid out by character offset: gaps become spaces and overlaps
/// overwrite. Without offsets the forms are joined by single spaces.
pub fn surface_form(wfs: &[&Wf]) -> String {
    if wfs.iter().any(|wf| wf.offset.is_none()) {
        return wfs.iter().map(|wf| wf.form.as_str()).collect::<Vec<_>>().join(" ");
    }
    let mut sorted: Vec<&Wf> = wfs.to_vec();
    sorted.sort_by_key(|wf| wf.offset);

    let mut out: Vec<char> = Vec::new();
    let mut start: Option<u32> = None;
    for wf in sorted {
        let offset = wf.offset.unwrap_or_default();
        let base = *start.get_or_insert(offset);
        let index = offset.saturating_sub(base) as usize;
        if index < out.len() {
            out.truncate(index);
        } else {
            out.resize(index, ' ');
        }
        out.extend(wf.form.chars());
    }
    out.into_iter().collect()
}

/// Rewrite dashes so a string can be embedded in an XML comment.
///
/// Leading or trailing dashes are padded with spaces; runs of dashes collapse.
pub fn dash_safe(text: &str) -> String {
    let mut value = text.to_string();
    loop {
        if value.starts_with('-') || value.ends_with('-') {
            value = value.replace('-', " - ");
        } else if value.contains("--") {
            value = value.replace("--", "-");
        } else {
            return value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wf(id: &str, form: &str, offset: Option<u32>) -> Wf {
        let mut wf = Wf::new(WfId::new(id), form, 1);
        wf.offset = offset;
        wf.length = Some(form.chars().count() as u32);
        wf
    }

    #[test]
    fn test_surface_form_pads_by_offset() {
        let a = wf("w1", "New", Some(0));
        let b = wf("w2", "York", Some(5));
        assert_eq!(surface_form(&[&b, &a]), "New  York");
    }

    #[test]
    fn test_surface_form_without_offsets() {
        let a = wf("w1", "New", None);
        let b = wf("w2", "York", None);
        assert_eq!(surface_form(&[&a, &b]), "New York");
    }

    #[test]
    fn test_dash_safe() {
        assert_eq!(dash_safe("well--known"), "well-known");
        assert_eq!(dash_safe("-x"), " - x");
        assert_eq!(dash_safe("plain"), "plain");
    }

    #[test]
    fn test_term_id_digits() {
        assert_eq!(TermId::new("t12").digits(), "12");
        assert_eq!(TermId::new("t.mw3").digits(), "3");
        assert_eq!(TermId::new("abc").digits(), "");
    }

    #[test]
    fn test_add_component_links_back() {
        let mut compound = Term::new(TermId::new("t.mw1"), Span::new(), false);
        let part = Term::new(TermId::new("t1"), Span::new(), false);
        compound.add_component(part, true);

        let c = compound.component("t1").unwrap();
        assert!(c.is_component());
        assert_eq!(c.compound(), Some(&TermId::new("t.mw1")));
        assert_eq!(compound.head_component(), Some(&TermId::new("t1")));
    }
}
