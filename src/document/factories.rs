//! Typed factories.
//!
//! Every id-bearing layer has a `load_*` variant that takes the id from the
//! caller (and raises the layer's generator past it) and a `new_*` variant that
//! draws a fresh id. Both validate every referenced annotation before anything
//! is inserted, and both hand back the stored annotation so optional attributes
//! can be filled in place.

use super::Document;
use crate::error::{NafError, Result};
use crate::types::{
    CLink, Chunk, Coref, Dep, Entity, Factuality, Feature, FeatureKind, LinkedEntity, Mark, Opinion,
    OpinionExpression, OpinionHolder, OpinionTarget, Predicate, Relation, Relational, Role, Span, SstSpan, TLink,
    TLinkReferable, Term, TermId, Timex3, Topic, Tree, TreeNode, Wf, WfId,
};

fn require_span<T: Clone + PartialEq>(element: &str, span: &Span<T>) -> Result<()> {
    if span.is_empty() {
        return Err(NafError::malformed(format!("{} needs a non-empty span", element)));
    }
    Ok(())
}

fn require_spans<T: Clone + PartialEq>(element: &str, spans: &[Span<T>]) -> Result<()> {
    if spans.is_empty() {
        return Err(NafError::malformed(format!("{} needs at least one span", element)));
    }
    spans.iter().try_for_each(|s| require_span(element, s))
}

impl Document {
    // ─── text ───────────────────────────────────────────────────────────────

    /// Add a word form with a known id.
    pub fn load_wf(&mut self, id: impl Into<String>, form: impl Into<String>, sent: u32) -> Result<&mut Wf> {
        self.insert_wf(Wf::new(WfId::new(id), form, sent))
    }

    /// Add a word form with a fresh id.
    pub fn new_wf(&mut self, form: impl Into<String>, sent: u32) -> Result<&mut Wf> {
        let id = self.ids.wfs.next()?;
        self.insert_wf(Wf::new(WfId::new(id), form, sent))
    }

    pub(crate) fn insert_wf(&mut self, wf: Wf) -> Result<&mut Wf> {
        self.ids.wfs.observe(wf.id().as_str());
        self.store.add_wf(wf)
    }

    /// Mutable word form (page, offset, length, xpath and form are editable).
    pub fn wf_mut(&mut self, id: &str) -> Option<&mut Wf> {
        self.store.text.get_mut(id)
    }

    /// Assign a paragraph to a word form and index its sentence under it.
    pub fn set_wf_para(&mut self, id: &str, para: u32) -> Result<()> {
        self.store.set_wf_para(id, para)
    }

    // ─── terms ──────────────────────────────────────────────────────────────

    /// Add a term with a known id.
    pub fn load_term(&mut self, id: impl Into<String>, span: Span<WfId>) -> Result<&mut Term> {
        let id = TermId::new(id);
        require_span(&format!("term {}", id), &span)?;
        self.insert_term(Term::new(id, span, false), None)
    }

    /// Add a term with a fresh id.
    pub fn new_term(&mut self, span: Span<WfId>) -> Result<&mut Term> {
        require_span("term", &span)?;
        let id = TermId::new(self.ids.terms.next()?);
        self.insert_term(Term::new(id, span, false), None)
    }

    pub(crate) fn insert_term(&mut self, term: Term, position: Option<usize>) -> Result<&mut Term> {
        let id = term.id().as_str();
        if id.starts_with(self.ids.mws.prefix()) {
            self.ids.mws.observe(id);
        } else {
            self.ids.terms.observe(id);
        }
        for component in term.components() {
            self.ids.observe_component_id(component.id().as_str(), term.id());
        }
        self.store.add_term(term, position)
    }

    /// Attach a component with a known id to `compound`.
    pub fn load_component(
        &mut self,
        compound: &TermId,
        id: impl Into<String>,
        span: Span<WfId>,
        is_head: bool,
    ) -> Result<&mut Term> {
        let id = TermId::new(id);
        require_span(&format!("component {}", id), &span)?;
        self.ids.observe_component_id(id.as_str(), compound);
        self.store.add_component(compound.as_str(), Term::new(id, span, true), is_head)
    }

    /// Attach a component with a fresh `<compound>.<n>` id.
    pub fn new_component(&mut self, compound: &TermId, span: Span<WfId>, is_head: bool) -> Result<&mut Term> {
        require_span("component", &span)?;
        let id = TermId::new(self.ids.next_component_id(compound)?);
        self.store.add_component(compound.as_str(), Term::new(id, span, true), is_head)
    }

    /// Mutable term or component.
    pub fn term_mut(&mut self, id: &str) -> Option<&mut Term> {
        self.store.term_mut(id)
    }

    // ─── markables ──────────────────────────────────────────────────────────

    /// Add a markable with a known id under `source`.
    pub fn load_mark(&mut self, source: &str, id: impl Into<String>, span: Span<TermId>) -> Result<&mut Mark> {
        let id = id.into();
        require_span(&format!("mark {}", id), &span)?;
        self.ids.marks.observe(&id);
        self.store.add_mark(source, Mark::new(id, span))
    }

    /// Add a markable with a fresh id under `source`.
    pub fn new_mark(&mut self, source: &str, span: Span<TermId>) -> Result<&mut Mark> {
        require_span("mark", &span)?;
        let id = self.ids.marks.next()?;
        self.store.add_mark(source, Mark::new(id, span))
    }

    /// Mutable markable.
    pub fn mark_mut(&mut self, source: &str, id: &str) -> Option<&mut Mark> {
        self.store.marks_mut(source)?.get_mut(id)
    }

    // ─── syntax ─────────────────────────────────────────────────────────────

    /// Add a dependency `from -rfunc-> to`.
    pub fn new_dep(&mut self, from: &TermId, to: &TermId, rfunc: impl Into<String>) -> Result<&mut Dep> {
        self.store.add_dep(Dep::new(from.clone(), to.clone(), rfunc))
    }

    /// Add a chunk with a known id; the span's head is the chunk head.
    pub fn load_chunk(&mut self, id: impl Into<String>, span: Span<TermId>) -> Result<&mut Chunk> {
        let id = id.into();
        require_span(&format!("chunk {}", id), &span)?;
        self.ids.chunks.observe(&id);
        self.store.add_chunk(Chunk::new(id, span))
    }

    /// Add a chunk with a fresh id.
    pub fn new_chunk(&mut self, span: Span<TermId>) -> Result<&mut Chunk> {
        require_span("chunk", &span)?;
        let id = self.ids.chunks.next()?;
        self.store.add_chunk(Chunk::new(id, span))
    }

    /// Mutable chunk.
    pub fn chunk_mut(&mut self, id: &str) -> Option<&mut Chunk> {
        self.store.chunks.get_mut(id)
    }

    // ─── entities, features, coreference ────────────────────────────────────

    /// Add an entity with a known id.
    pub fn load_entity(&mut self, id: impl Into<String>, references: Vec<Span<TermId>>) -> Result<&mut Entity> {
        let id = id.into();
        require_spans(&format!("entity {}", id), &references)?;
        self.ids.entities.observe(&id);
        self.store.add_entity(Entity::new(id, references))
    }

    /// Add an entity with a fresh id.
    pub fn new_entity(&mut self, references: Vec<Span<TermId>>) -> Result<&mut Entity> {
        require_spans("entity", &references)?;
        let id = self.ids.entities.next()?;
        self.store.add_entity(Entity::new(id, references))
    }

    /// Mutable entity.
    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.store.entities.get_mut(id)
    }

    /// Add a property or category with a known id.
    pub fn load_feature(
        &mut self,
        kind: FeatureKind,
        id: impl Into<String>,
        lemma: impl Into<String>,
        references: Vec<Span<TermId>>,
    ) -> Result<&mut Feature> {
        let id = id.into();
        require_spans(&format!("{} {}", kind, id), &references)?;
        match kind {
            FeatureKind::Property => self.ids.properties.observe(&id),
            FeatureKind::Category => self.ids.categories.observe(&id),
        }
        self.store.add_feature(Feature::new(id, kind, lemma, references))
    }

    /// Add a property or category with a fresh id.
    pub fn new_feature(
        &mut self,
        kind: FeatureKind,
        lemma: impl Into<String>,
        references: Vec<Span<TermId>>,
    ) -> Result<&mut Feature> {
        require_spans(&kind.to_string(), &references)?;
        let id = match kind {
            FeatureKind::Property => self.ids.properties.next()?,
            FeatureKind::Category => self.ids.categories.next()?,
        };
        self.store.add_feature(Feature::new(id, kind, lemma, references))
    }

    /// Add a property with a fresh id.
    pub fn new_property(&mut self, lemma: impl Into<String>, references: Vec<Span<TermId>>) -> Result<&mut Feature> {
        self.new_feature(FeatureKind::Property, lemma, references)
    }

    /// Add a category with a fresh id.
    pub fn new_category(&mut self, lemma: impl Into<String>, references: Vec<Span<TermId>>) -> Result<&mut Feature> {
        self.new_feature(FeatureKind::Category, lemma, references)
    }

    /// Mutable property or category.
    pub fn feature_mut(&mut self, kind: FeatureKind, id: &str) -> Option<&mut Feature> {
        self.store.features_mut(kind).get_mut(id)
    }

    /// Add a coreference chain with a known id.
    pub fn load_coref(&mut self, id: impl Into<String>, mentions: Vec<Span<TermId>>) -> Result<&mut Coref> {
        let id = id.into();
        require_spans(&format!("coref {}", id), &mentions)?;
        self.ids.corefs.observe(&id);
        self.store.add_coref(Coref::new(id, mentions))
    }

    /// Add a coreference chain with a fresh id.
    pub fn new_coref(&mut self, mentions: Vec<Span<TermId>>) -> Result<&mut Coref> {
        require_spans("coref", &mentions)?;
        let id = self.ids.corefs.next()?;
        self.store.add_coref(Coref::new(id, mentions))
    }

    /// Mutable coreference chain.
    pub fn coref_mut(&mut self, id: &str) -> Option<&mut Coref> {
        self.store.corefs.get_mut(id)
    }

    /// Add a linked entity with a known id.
    pub fn load_linked_entity(&mut self, id: impl Into<String>, span: Span<WfId>) -> Result<&mut LinkedEntity> {
        let id = id.into();
        require_span(&format!("linkedEntity {}", id), &span)?;
        self.ids.linked_entities.observe(&id);
        self.store.add_linked_entity(LinkedEntity::new(id, span))
    }

    /// Add a linked entity with a fresh id.
    pub fn new_linked_entity(&mut self, span: Span<WfId>) -> Result<&mut LinkedEntity> {
        require_span("linkedEntity", &span)?;
        let id = self.ids.linked_entities.next()?;
        self.store.add_linked_entity(LinkedEntity::new(id, span))
    }

    /// Add a relation with a known id.
    pub fn load_relation(&mut self, id: impl Into<String>, from: Relational, to: Relational) -> Result<&mut Relation> {
        let id = id.into();
        self.ids.relations.observe(&id);
        self.store.add_relation(Relation::new(id, from, to))
    }

    /// Add a relation with a fresh id.
    pub fn new_relation(&mut self, from: Relational, to: Relational) -> Result<&mut Relation> {
        let id = self.ids.relations.next()?;
        self.store.add_relation(Relation::new(id, from, to))
    }

    /// The entity, property or category registered under `id`.
    pub fn relational(&self, id: &str) -> Option<Relational> {
        if self.store.entities.contains(id) {
            Some(Relational::Entity(id.to_string()))
        } else if self.store.properties.contains(id) {
            Some(Relational::Property(id.to_string()))
        } else if self.store.categories.contains(id) {
            Some(Relational::Category(id.to_string()))
        } else {
            None
        }
    }

    // ─── opinions ───────────────────────────────────────────────────────────

    /// Add an empty opinion with a known id.
    pub fn load_opinion(&mut self, id: impl Into<String>) -> Result<&mut Opinion> {
        let id = id.into();
        self.ids.opinions.observe(&id);
        self.store.add_opinion(Opinion::new(id))
    }

    /// Add an empty opinion with a fresh id.
    pub fn new_opinion(&mut self) -> Result<&mut Opinion> {
        let id = self.ids.opinions.next()?;
        self.store.add_opinion(Opinion::new(id))
    }

    /// Mutable opinion; parts are changed through the `set_opinion_*` methods.
    pub fn opinion_mut(&mut self, id: &str) -> Option<&mut Opinion> {
        self.store.opinions.get_mut(id)
    }

    /// Replace the holder of an opinion.
    pub fn set_opinion_holder(&mut self, id: &str, holder: Option<OpinionHolder>) -> Result<()> {
        self.store.update_opinion(id, |o| o.set_holder(holder))
    }

    /// Replace the target of an opinion.
    pub fn set_opinion_target(&mut self, id: &str, target: Option<OpinionTarget>) -> Result<()> {
        self.store.update_opinion(id, |o| o.set_target(target))
    }

    /// Replace the expression of an opinion.
    pub fn set_opinion_expression(&mut self, id: &str, expression: Option<OpinionExpression>) -> Result<()> {
        self.store.update_opinion(id, |o| o.set_expression(expression))
    }

    // ─── srl ────────────────────────────────────────────────────────────────

    /// Add a predicate with a known id.
    pub fn load_predicate(&mut self, id: impl Into<String>, span: Span<TermId>) -> Result<&mut Predicate> {
        let id = id.into();
        require_span(&format!("predicate {}", id), &span)?;
        self.ids.predicates.observe(&id);
        self.store.add_predicate(Predicate::new(id, span))
    }

    /// Add a predicate with a fresh id.
    pub fn new_predicate(&mut self, span: Span<TermId>) -> Result<&mut Predicate> {
        require_span("predicate", &span)?;
        let id = self.ids.predicates.next()?;
        self.store.add_predicate(Predicate::new(id, span))
    }

    /// Mutable predicate.
    pub fn predicate_mut(&mut self, id: &str) -> Option<&mut Predicate> {
        self.store.predicates.get_mut(id)
    }

    /// Attach a role with a known id to `predicate`.
    pub fn load_role(
        &mut self,
        predicate: &str,
        id: impl Into<String>,
        sem_role: impl Into<String>,
        span: Span<TermId>,
    ) -> Result<&mut Role> {
        let id = id.into();
        self.ids.roles.observe(&id);
        self.push_role(predicate, Role::new(id, sem_role, span))
    }

    /// Attach a role with a fresh id to `predicate`.
    pub fn new_role(&mut self, predicate: &str, sem_role: impl Into<String>, span: Span<TermId>) -> Result<&mut Role> {
        let id = self.ids.roles.next()?;
        self.push_role(predicate, Role::new(id, sem_role, span))
    }

    fn push_role(&mut self, predicate: &str, role: Role) -> Result<&mut Role> {
        self.store.check_role_span(role.id(), role.span())?;
        let target = self
            .store
            .predicates
            .get_mut(predicate)
            .ok_or_else(|| NafError::unresolved(format!("role {}", role.id()), predicate))?;
        if target.role(role.id()).is_some() {
            return Err(NafError::malformed(format!("duplicate role id {}", role.id())));
        }
        Ok(target.push_role(role))
    }

    // ─── temporal ───────────────────────────────────────────────────────────

    /// Add a time expression with a known id.
    pub fn load_timex3(
        &mut self,
        id: impl Into<String>,
        timex_type: impl Into<String>,
        span: Option<Span<WfId>>,
    ) -> Result<&mut Timex3> {
        let id = id.into();
        if let Some(span) = &span {
            require_span(&format!("timex3 {}", id), span)?;
        }
        self.ids.timex3s.observe(&id);
        self.store.add_timex(Timex3::new(id, timex_type, span))
    }

    /// Add a time expression with a fresh id.
    pub fn new_timex3(&mut self, timex_type: impl Into<String>, span: Option<Span<WfId>>) -> Result<&mut Timex3> {
        if let Some(span) = &span {
            require_span("timex3", span)?;
        }
        let id = self.ids.timex3s.next()?;
        self.store.add_timex(Timex3::new(id, timex_type, span))
    }

    /// Mutable time expression.
    pub fn timex3_mut(&mut self, id: &str) -> Option<&mut Timex3> {
        self.store.timexes.get_mut(id)
    }

    /// Add the factuality of `term`, keyed by the term's first word form.
    pub fn new_factuality(&mut self, term: &TermId) -> Result<&mut Factuality> {
        let wf = self
            .store
            .term(term.as_str())
            .and_then(|t| t.span().first().cloned())
            .ok_or_else(|| NafError::unresolved("factuality", term.as_str()))?;
        self.load_factuality(wf, term)
    }

    /// Add a factuality keyed by `wf` and attached to `term`.
    pub fn load_factuality(&mut self, wf: WfId, term: &TermId) -> Result<&mut Factuality> {
        self.store.add_factuality(Factuality::new(wf, term.clone()))
    }

    /// Mutable factuality, by word form id.
    pub fn factuality_mut(&mut self, wf: &str) -> Option<&mut Factuality> {
        self.store.factualities.get_mut(wf)
    }

    /// Add a temporal link with a known id.
    pub fn load_tlink(
        &mut self,
        id: impl Into<String>,
        from: TLinkReferable,
        to: TLinkReferable,
        rel_type: impl Into<String>,
    ) -> Result<&mut TLink> {
        let id = id.into();
        self.ids.tlinks.observe(&id);
        self.store.add_tlink(TLink::new(id, from, to, rel_type))
    }

    /// Add a temporal link with a fresh id.
    pub fn new_tlink(&mut self, from: TLinkReferable, to: TLinkReferable, rel_type: impl Into<String>) -> Result<&mut TLink> {
        let id = self.ids.tlinks.next()?;
        self.store.add_tlink(TLink::new(id, from, to, rel_type))
    }

    /// Add a causal link between two predicates with a known id.
    pub fn load_clink(&mut self, id: impl Into<String>, from: &str, to: &str) -> Result<&mut CLink> {
        let id = id.into();
        self.ids.clinks.observe(&id);
        self.store.add_clink(CLink::new(id, from.to_string(), to.to_string()))
    }

    /// Add a causal link between two predicates with a fresh id.
    pub fn new_clink(&mut self, from: &str, to: &str) -> Result<&mut CLink> {
        let id = self.ids.clinks.next()?;
        self.store.add_clink(CLink::new(id, from.to_string(), to.to_string()))
    }

    // ─── lexical ────────────────────────────────────────────────────────────

    /// Add a super-sense span with a known id.
    pub fn load_sst(&mut self, id: impl Into<String>, span: Span<TermId>) -> Result<&mut SstSpan> {
        let id = id.into();
        require_span(&format!("sst {}", id), &span)?;
        self.ids.ssts.observe(&id);
        self.store.add_sst(SstSpan::new(id, span))
    }

    /// Add a super-sense span with a fresh id.
    pub fn new_sst(&mut self, span: Span<TermId>) -> Result<&mut SstSpan> {
        require_span("sst", &span)?;
        let id = self.ids.ssts.next()?;
        self.store.add_sst(SstSpan::new(id, span))
    }

    /// Add a topic with a known id.
    pub fn load_topic(&mut self, id: impl Into<String>, label: impl Into<String>) -> Result<&mut Topic> {
        let id = id.into();
        self.ids.topics.observe(&id);
        self.store.add_topic(Topic::new(id, label))
    }

    /// Add a topic with a fresh id.
    pub fn new_topic(&mut self, label: impl Into<String>) -> Result<&mut Topic> {
        let id = self.ids.topics.next()?;
        self.store.add_topic(Topic::new(id, label))
    }

    // ─── constituency ───────────────────────────────────────────────────────

    /// Build a terminal node with fresh ids.
    pub fn new_terminal(&mut self, span: Span<TermId>) -> Result<TreeNode> {
        require_span("terminal", &span)?;
        Ok(TreeNode::Terminal {
            id: self.ids.terminals.next()?,
            span,
            edge_id: None,
            head: false,
        })
    }

    /// Build a non-terminal node; children without an edge id get a fresh one.
    pub fn new_nonterminal(&mut self, label: impl Into<String>, mut children: Vec<TreeNode>) -> Result<TreeNode> {
        for child in &mut children {
            let slot = match child {
                TreeNode::NonTerminal { edge_id, .. } | TreeNode::Terminal { edge_id, .. } => edge_id,
            };
            if slot.is_none() {
                *slot = Some(self.ids.edges.next()?);
            }
        }
        Ok(TreeNode::NonTerminal {
            id: self.ids.nonterminals.next()?,
            label: label.into(),
            children,
            edge_id: None,
            head: false,
        })
    }

    /// Add a tree rooted at `root`; node and edge ids are observed.
    pub fn load_tree(&mut self, sentence: Option<u32>, root: TreeNode) -> Result<&mut Tree> {
        for node in root.walk() {
            match node {
                TreeNode::NonTerminal { id, .. } => self.ids.nonterminals.observe(id),
                TreeNode::Terminal { id, .. } => self.ids.terminals.observe(id),
            }
            if let Some(edge) = node.edge_id() {
                self.ids.edges.observe(edge);
            }
        }
        self.store.add_tree(Tree::new(sentence, root))
    }

    pub(crate) fn add_unknown_layer(&mut self, layer: crate::store::UnknownLayer) {
        self.store.add_unknown_layer(layer);
    }

    /// Store the raw bracket string of a sentence.
    pub fn add_constituency_string(&mut self, sentence: u32, tree: impl Into<String>) {
        self.store.add_constituency_string(sentence, tree);
    }

    /// Parse a bracket string and add its trees to `sentence`.
    ///
    /// The sentence's terms are aligned with the leaves. On failure nothing is
    /// added, the error is logged and returned; the rest of the document is
    /// unaffected.
    pub fn add_constituency_from_parentheses(&mut self, text: &str, sentence: u32) -> Result<usize> {
        let terms: Vec<(TermId, String)> = self
            .store
            .terms
            .by_sentence(sentence)
            .into_iter()
            .map(|t| (t.id().clone(), self.term_form(t.id())))
            .collect();
        let mut ids = self.ids.clone();
        let roots = match crate::constituency::parse(text, sentence, &terms, &mut ids) {
            Ok(roots) => roots,
            Err(err) => {
                tracing::warn!(sentence, error = %err, "Skipping constituency tree");
                return Err(err);
            }
        };
        let trees: Vec<Tree> = roots.into_iter().map(|root| Tree::new(Some(sentence), root)).collect();
        for tree in &trees {
            if let Err(err) = self.store.check_tree(tree) {
                tracing::warn!(sentence, error = %err, "Skipping constituency tree");
                return Err(err);
            }
        }
        self.ids = ids;
        let count = trees.len();
        for tree in trees {
            self.store.add_tree(tree)?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_terms(forms: &[&str]) -> Document {
        let mut doc = Document::new("en", "v3");
        for form in forms {
            let wf = doc.new_wf(*form, 1).unwrap().id().clone();
            doc.new_term(Span::from_targets(vec![wf])).unwrap();
        }
        doc
    }

    fn tspan(ids: &[&str]) -> Span<TermId> {
        Span::from_targets(ids.iter().map(|i| TermId::new(*i)).collect())
    }

    #[test]
    fn test_load_then_new_skips_observed_ids() {
        let mut doc = doc_with_terms(&["a"]);
        doc.load_entity("e7", vec![tspan(&["t1"])]).unwrap();
        let fresh = doc.new_entity(vec![tspan(&["t1"])]).unwrap().id().to_string();
        assert_eq!(fresh, "e8");
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let mut doc = doc_with_terms(&["a"]);
        let err = doc.new_chunk(tspan(&["t9"])).unwrap_err();
        assert!(matches!(err, NafError::UnresolvedReference { ref id, .. } if id == "t9"));
        assert!(doc.store().chunks().is_empty());
    }

    #[test]
    fn test_empty_span_is_malformed() {
        let mut doc = doc_with_terms(&["a"]);
        assert!(matches!(doc.new_entity(vec![Span::new()]), Err(NafError::MalformedInput(_))));
        assert!(matches!(doc.new_entity(Vec::new()), Err(NafError::MalformedInput(_))));
    }

    #[test]
    fn test_empty_predicate_and_timex_spans_fail_on_both_paths() {
        let mut doc = doc_with_terms(&["a"]);
        assert!(matches!(doc.load_predicate("pr1", Span::new()), Err(NafError::MalformedInput(_))));
        assert!(matches!(doc.new_predicate(Span::new()), Err(NafError::MalformedInput(_))));
        assert!(matches!(doc.load_timex3("tmx1", "DATE", Some(Span::new())), Err(NafError::MalformedInput(_))));
        assert!(matches!(doc.new_timex3("DATE", Some(Span::new())), Err(NafError::MalformedInput(_))));
        assert!(doc.store().predicates().is_empty());

        // A time expression without a span is still allowed.
        assert!(doc.new_timex3("DATE", None).is_ok());
        assert_eq!(doc.new_predicate(tspan(&["t1"])).unwrap().id(), "pr1");
    }

    #[test]
    fn test_largest_loaded_id_exhausts_generator() {
        let mut doc = Document::new("en", "v3");
        doc.load_wf("w18446744073709551615", "a", 1).unwrap();
        let err = doc.new_wf("b", 1).unwrap_err();
        assert!(matches!(err, NafError::InconsistentIdState { .. }));
        assert_eq!(doc.store().text().len(), 1);
    }

    #[test]
    fn test_roles_are_validated() {
        let mut doc = doc_with_terms(&["John", "sleeps"]);
        let pr = doc.new_predicate(tspan(&["t2"])).unwrap().id().to_string();
        doc.new_role(&pr, "A0", tspan(&["t1"])).unwrap();
        assert!(doc.new_role(&pr, "A1", tspan(&["t5"])).is_err());
        assert!(doc.new_role("pr9", "A1", tspan(&["t1"])).is_err());
        assert_eq!(doc.store().predicates().get(&pr).unwrap().roles().len(), 1);
    }

    #[test]
    fn test_opinion_parts_are_indexed() {
        let mut doc = doc_with_terms(&["I", "like", "it"]);
        let id = doc.new_opinion().unwrap().id().to_string();
        doc.set_opinion_holder(&id, Some(OpinionHolder::new(tspan(&["t1"])))).unwrap();
        doc.set_opinion_expression(&id, Some(OpinionExpression::new(tspan(&["t2"])))).unwrap();
        assert_eq!(doc.store().opinions().by_term("t2").len(), 1);
        assert!(doc.set_opinion_target(&id, Some(OpinionTarget::new(tspan(&["t8"])))).is_err());
        assert!(doc.store().opinions().get(&id).unwrap().target().is_none());
    }

    #[test]
    fn test_factuality_keyed_by_first_wf() {
        let mut doc = doc_with_terms(&["rain"]);
        let f = doc.new_factuality(&TermId::new("t1")).unwrap();
        f.add_part("CT+", Some(0.8));
        assert_eq!(doc.store().factualities().get("w1").unwrap().parts.len(), 1);
    }

    #[test]
    fn test_components_get_term_scoped_ids() {
        let mut doc = Document::new("en", "v3");
        let w1 = doc.new_wf("icebreaker", 1).unwrap().id().clone();
        let t1 = doc.new_term(Span::from_targets(vec![w1.clone()])).unwrap().id().clone();
        let c1 = doc.new_component(&t1, Span::from_targets(vec![w1.clone()]), true).unwrap().id().clone();
        let c2 = doc.new_component(&t1, Span::from_targets(vec![w1]), false).unwrap().id().clone();
        assert_eq!(c1.as_str(), "t1.1");
        assert_eq!(c2.as_str(), "t1.2");
        assert_eq!(doc.store().term("t1").unwrap().head_component(), Some(&c1));
        assert!(doc.store().term("t1.2").unwrap().is_component());
    }

    #[test]
    fn test_constituency_from_parentheses() {
        let mut doc = doc_with_terms(&["John", "sleeps"]);
        let added = doc
            .add_constituency_from_parentheses("(ROOT (S (NP (NNP John)) (VP (VBZ sleeps))))", 1)
            .unwrap();
        assert_eq!(added, 1);
        let tree = doc.store().trees().by_sentence(1)[0];
        assert_eq!(tree.terms().len(), 2);

        let err = doc.add_constituency_from_parentheses("(S (NN cat))", 1).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(doc.store().trees().len(), 1);
    }

    #[test]
    fn test_constituency_commits_no_tree_when_a_later_root_fails() {
        let mut doc = doc_with_terms(&["a", "b"]);
        let text = "(A (X a)) (B (Y b))";
        let terms = vec![(TermId::new("t1"), "a".to_string()), (TermId::new("t2"), "b".to_string())];
        let roots = crate::constituency::parse(text, 1, &terms, &mut doc.ids.clone()).unwrap();
        let taken = roots[1].id().to_string();
        doc.store.add_tree(Tree::new(Some(1), roots[1].clone())).unwrap();
        let counter = doc.ids.nonterminals.counter();

        let err = doc.add_constituency_from_parentheses(text, 1).unwrap_err();
        assert!(matches!(err, NafError::MalformedInput(_)));
        assert_eq!(doc.store().trees().len(), 1);
        assert!(doc.store().trees().contains(&taken));
        assert_eq!(doc.ids.nonterminals.counter(), counter);
    }
}
