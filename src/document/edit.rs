//! Structural edits: compounds, split/join and removal.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::Document;
use crate::error::{NafError, Result};
use crate::store::{AnnotationRef, Layer};
use crate::types::{
    Chunk, Coref, Dep, Entity, Feature, Opinion, Relation, Relational, Span, Term, TermId, Wf, WfId,
};

/// Old-id to new-id tables filled while copying between documents.
#[derive(Debug, Default)]
struct IdMap {
    wfs: HashMap<WfId, WfId>,
    terms: HashMap<TermId, TermId>,
    relationals: HashMap<String, Relational>,
}

impl IdMap {
    fn term(&self, id: &TermId) -> Result<TermId> {
        self.terms.get(id).cloned().ok_or_else(|| NafError::dangling(id.as_str()))
    }

    fn relational(&self, r: &Relational) -> Result<Relational> {
        self.relationals.get(r.id()).cloned().ok_or_else(|| NafError::dangling(r.id()))
    }

    fn spans(&self, spans: &[Span<TermId>]) -> Result<Vec<Span<TermId>>> {
        spans.iter().map(|s| s.remap(&self.terms)).collect()
    }
}

fn touches<'a>(kept: &HashSet<TermId>, mut terms: impl Iterator<Item = &'a TermId>) -> bool {
    terms.any(|t| kept.contains(t))
}

fn copy_term_attrs(dst: &mut Term, src: &Term) {
    dst.term_type = src.term_type.clone();
    dst.lemma = src.lemma.clone();
    dst.pos = src.pos.clone();
    dst.morphofeat = src.morphofeat.clone();
    dst.case = src.case.clone();
    dst.sentiment = src.sentiment.clone();
    dst.supersense = src.supersense.clone();
    dst.wordnet = src.wordnet.clone();
    dst.bbn = src.bbn.clone();
    dst.external_refs = src.external_refs.clone();
}

impl Document {
    // ─── compounds ──────────────────────────────────────────────────────────

    /// Merge adjacent top-level terms into a multi-word compound.
    ///
    /// The compound spans the word forms of every given term and takes the
    /// place of the first one; the terms become its components, the first being
    /// the head. Annotations pointing at the old terms keep resolving through
    /// the components.
    pub fn new_compound(&mut self, terms: &[TermId], lemma: impl Into<String>) -> Result<&mut Term> {
        let first = terms.first().ok_or_else(|| NafError::malformed("a compound needs at least one term"))?;
        for id in terms {
            match self.store.terms.get(id.as_str()) {
                None => return Err(NafError::unresolved("compound", id.as_str())),
                Some(t) if !t.components().is_empty() => {
                    return Err(NafError::malformed(format!("term {} is already a compound", id)));
                }
                Some(_) => {}
            }
        }
        // Slot of the first term once every given term has left the list.
        let position = self.store.terms.position(first.as_str()).map(|at| {
            let given: HashSet<&str> = terms.iter().map(TermId::as_str).collect();
            let before = given
                .into_iter()
                .filter_map(|t| self.store.terms.position(t))
                .filter(|p| *p < at)
                .count();
            at - before
        });
        let id = TermId::new(self.ids.mws.next()?);

        let mut span = Span::new();
        let mut parts = Vec::with_capacity(terms.len());
        for term_id in terms {
            if let Some(term) = self.store.take_term(term_id.as_str()) {
                span.add_targets(term.wfs().iter().cloned());
                parts.push(term);
            }
        }
        let mut compound = Term::new(id, span, false);
        compound.lemma = Some(lemma.into());
        for (i, part) in parts.into_iter().enumerate() {
            compound.add_component(part, i == 0);
        }
        tracing::debug!(compound = %compound.id(), parts = terms.len(), "Compound created");
        self.store.add_term(compound, position)
    }

    // ─── split and join ─────────────────────────────────────────────────────

    /// New document holding copies of `wfs` and of the annotations over them.
    ///
    /// Terms touching the word forms are copied together with the deps,
    /// chunks, entities, coreference chains, properties, categories and
    /// relations touching those terms; everything is re-keyed with fresh ids.
    /// Opinions, time expressions and predicates are not copied.
    pub fn split(&self, wfs: &[WfId]) -> Result<Document> {
        let wanted: HashSet<&WfId> = wfs.iter().collect();
        let mut out = Document::with_engine(self.lang.clone(), self.version.clone(), Arc::clone(&self.engine));
        out.header = self.header.clone();
        let mut map = IdMap::default();

        for wf in self.store.text.iter().filter(|w| wanted.contains(w.id())) {
            out.copy_wf(wf, &mut map)?;
        }
        for term in self.store.terms.iter().filter(|t| t.wfs().iter().any(|w| wanted.contains(w))) {
            out.copy_term(term, &mut map)?;
        }
        let kept: HashSet<TermId> = map.terms.keys().cloned().collect();

        for dep in self.store.deps.iter().filter(|d| kept.contains(d.from()) || kept.contains(d.to())) {
            out.copy_dep(dep, &map)?;
        }
        for chunk in self.store.chunks.iter().filter(|c| touches(&kept, c.span().targets().iter())) {
            out.copy_chunk(chunk, &map)?;
        }
        for entity in self.store.entities.iter().filter(|e| touches(&kept, e.terms())) {
            out.copy_entity(entity, &mut map)?;
        }
        for coref in self.store.corefs.iter().filter(|c| touches(&kept, c.terms())) {
            out.copy_coref(coref, &map)?;
        }
        for feature in self.store.properties.iter().chain(self.store.categories.iter()) {
            if touches(&kept, feature.terms()) {
                out.copy_feature(feature, &mut map)?;
            }
        }
        for relation in self.store.relations.iter() {
            if map.relationals.contains_key(relation.from().id()) && map.relationals.contains_key(relation.to().id()) {
                out.copy_relation(relation, &map)?;
            }
        }
        tracing::debug!(wfs = out.store.text.len(), terms = out.store.terms.len(), "Document split");
        Ok(out)
    }

    /// Append every annotation of `other` to this document.
    ///
    /// Linguistic processors missing here are added first. Word forms, terms,
    /// deps, chunks, entities, coreference chains, properties, categories,
    /// opinions and relations are copied with fresh ids. Time expressions and
    /// predicates are not copied. On error this document is left unchanged.
    pub fn join(&mut self, other: &Document) -> Result<()> {
        let mut merged = self.clone();
        for group in other.header.processor_groups() {
            for lp in &group.processors {
                if !merged.header.processor_exists(&group.layer, &lp.name, lp.version.as_deref()) {
                    merged.header.add_processor(&group.layer, lp.clone());
                }
            }
        }

        let mut map = IdMap::default();
        for wf in other.store.text.iter() {
            merged.copy_wf(wf, &mut map)?;
        }
        for term in other.store.terms.iter() {
            merged.copy_term(term, &mut map)?;
        }
        for dep in other.store.deps.iter() {
            merged.copy_dep(dep, &map)?;
        }
        for chunk in other.store.chunks.iter() {
            merged.copy_chunk(chunk, &map)?;
        }
        for entity in other.store.entities.iter() {
            merged.copy_entity(entity, &mut map)?;
        }
        for coref in other.store.corefs.iter() {
            merged.copy_coref(coref, &map)?;
        }
        for feature in other.store.properties.iter().chain(other.store.categories.iter()) {
            merged.copy_feature(feature, &mut map)?;
        }
        for opinion in other.store.opinions.iter() {
            merged.copy_opinion(opinion, &map)?;
        }
        for relation in other.store.relations.iter() {
            merged.copy_relation(relation, &map)?;
        }
        tracing::debug!(wfs = other.store.text.len(), terms = other.store.terms.len(), "Document joined");
        *self = merged;
        Ok(())
    }

    fn copy_wf(&mut self, wf: &Wf, map: &mut IdMap) -> Result<()> {
        let copy = self.new_wf(wf.form.clone(), wf.sent())?;
        copy.page = wf.page;
        copy.offset = wf.offset;
        copy.length = wf.length;
        copy.xpath = wf.xpath.clone();
        let id = copy.id().clone();
        if let Some(para) = wf.para() {
            self.set_wf_para(id.as_str(), para)?;
        }
        map.wfs.insert(wf.id().clone(), id);
        Ok(())
    }

    fn copy_term(&mut self, term: &Term, map: &mut IdMap) -> Result<()> {
        let copy = self.new_term(term.span().remap(&map.wfs)?)?;
        copy_term_attrs(copy, term);
        let id = copy.id().clone();
        map.terms.insert(term.id().clone(), id.clone());
        for component in term.components() {
            let is_head = term.head_component() == Some(component.id());
            let part = self.new_component(&id, component.span().remap(&map.wfs)?, is_head)?;
            copy_term_attrs(part, component);
            map.terms.insert(component.id().clone(), part.id().clone());
        }
        Ok(())
    }

    fn copy_dep(&mut self, dep: &Dep, map: &IdMap) -> Result<()> {
        let copy = self.new_dep(&map.term(dep.from())?, &map.term(dep.to())?, dep.rfunc.clone())?;
        copy.case = dep.case.clone();
        Ok(())
    }

    fn copy_chunk(&mut self, chunk: &Chunk, map: &IdMap) -> Result<()> {
        let copy = self.new_chunk(chunk.span().remap(&map.terms)?)?;
        copy.phrase = chunk.phrase.clone();
        copy.case = chunk.case.clone();
        Ok(())
    }

    fn copy_entity(&mut self, entity: &Entity, map: &mut IdMap) -> Result<()> {
        let copy = self.new_entity(map.spans(entity.references())?)?;
        copy.entity_type = entity.entity_type.clone();
        copy.named = entity.named;
        copy.external_refs = entity.external_refs.clone();
        let id = copy.id().to_string();
        map.relationals.insert(entity.id().to_string(), Relational::Entity(id));
        Ok(())
    }

    fn copy_coref(&mut self, coref: &Coref, map: &IdMap) -> Result<()> {
        let copy = self.new_coref(map.spans(coref.mentions())?)?;
        copy.coref_type = coref.coref_type.clone();
        copy.cluster = coref.cluster.clone();
        copy.external_refs = coref.external_refs.clone();
        Ok(())
    }

    fn copy_feature(&mut self, feature: &Feature, map: &mut IdMap) -> Result<()> {
        let copy = self.new_feature(feature.kind(), feature.lemma.clone(), map.spans(feature.references())?)?;
        copy.external_refs = feature.external_refs.clone();
        let id = copy.id().to_string();
        map.relationals.insert(feature.id().to_string(), Relational::feature(feature.kind(), id));
        Ok(())
    }

    fn copy_opinion(&mut self, opinion: &Opinion, map: &IdMap) -> Result<()> {
        let holder = match opinion.holder() {
            Some(h) => {
                let mut h = h.clone();
                h.span = h.span.remap(&map.terms)?;
                Some(h)
            }
            None => None,
        };
        let target = match opinion.target() {
            Some(t) => {
                let mut t = t.clone();
                t.span = t.span.remap(&map.terms)?;
                Some(t)
            }
            None => None,
        };
        let expression = match opinion.expression() {
            Some(e) => {
                let mut e = e.clone();
                e.span = e.span.remap(&map.terms)?;
                Some(e)
            }
            None => None,
        };
        let copy = self.new_opinion()?;
        copy.label = opinion.label.clone();
        copy.external_refs = opinion.external_refs.clone();
        let id = copy.id().to_string();
        self.store.update_opinion(&id, |o| {
            o.set_holder(holder);
            o.set_target(target);
            o.set_expression(expression);
        })
    }

    fn copy_relation(&mut self, relation: &Relation, map: &IdMap) -> Result<()> {
        let copy = self.new_relation(map.relational(relation.from())?, map.relational(relation.to())?)?;
        if let Some(confidence) = relation.confidence() {
            copy.set_confidence(confidence)?;
        }
        Ok(())
    }

    // ─── removal ────────────────────────────────────────────────────────────

    /// Drop a whole layer with its indices.
    pub fn remove_layer(&mut self, layer: Layer) {
        self.store.remove_layer(layer);
    }

    /// Remove one annotation; see [`AnnotationStore::remove`](crate::store::AnnotationStore::remove).
    pub fn remove_annotation(&mut self, annotation: &AnnotationRef) -> Result<bool> {
        self.store.remove(annotation)
    }

    /// Remove several annotations, stopping at the first unsupported one.
    ///
    /// Returns how many were actually removed.
    pub fn remove_annotations(&mut self, annotations: &[AnnotationRef]) -> Result<usize> {
        let mut removed = 0;
        for annotation in annotations {
            if self.store.remove(annotation)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
