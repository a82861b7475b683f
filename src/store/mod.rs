//! Annotation store: every layer of a document plus the indices between them.
//!
//! The store owns one [`IndexedLayer`] per layer. Insertion goes through the
//! typed `add_*` methods, which check that every referenced word form, term,
//! relational or predicate exists, compute the index keys and commit both in one
//! step. Read access to a whole layer is handed out as `&IndexedLayer<T>` so
//! callers can use the layer's own lookups (`by_term`, `by_sentence`, ...).

pub mod layer;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NafError, Result};
use crate::types::{
    CLink, Chunk, Coref, Dep, Entity, Factuality, Feature, FeatureKind, LinkedEntity, Mark, Opinion, Predicate,
    Relation, Relational, SstSpan, TLink, TLinkReferable, Term, TermId, Timex3, Topic, Tree, TreeNode, Wf, WfId,
};

pub use layer::{IndexKeys, IndexedLayer};

/// Whole-layer handle used by [`AnnotationStore::remove_layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Word forms.
    Text,
    /// Terms (and their components).
    Terms,
    /// Markables of every source.
    Marks,
    /// Dependencies.
    Deps,
    /// Chunks.
    Chunks,
    /// Named entities.
    Entities,
    /// Properties.
    Properties,
    /// Categories.
    Categories,
    /// Coreference chains.
    Coreferences,
    /// Opinions.
    Opinions,
    /// Relations.
    Relations,
    /// Predicates and roles.
    Srl,
    /// Constituency trees.
    Constituency,
    /// Raw bracket strings.
    ConstituencyStrings,
    /// Time expressions.
    TimeExpressions,
    /// Linked entities.
    LinkedEntities,
    /// Factualities.
    Factualities,
    /// Topics.
    Topics,
    /// Temporal links.
    TemporalRelations,
    /// Causal links.
    CausalRelations,
}

impl Layer {
    /// Every layer, in serialization order.
    pub const ALL: [Layer; 20] = [
        Layer::Text,
        Layer::Terms,
        Layer::Marks,
        Layer::Deps,
        Layer::Chunks,
        Layer::Entities,
        Layer::Coreferences,
        Layer::TimeExpressions,
        Layer::Factualities,
        Layer::LinkedEntities,
        Layer::Topics,
        Layer::Properties,
        Layer::Categories,
        Layer::Opinions,
        Layer::Relations,
        Layer::Srl,
        Layer::ConstituencyStrings,
        Layer::Constituency,
        Layer::TemporalRelations,
        Layer::CausalRelations,
    ];

    /// Name used in linguistic processor groups and layer selection.
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Terms => "terms",
            Self::Marks => "marks",
            Self::Deps => "deps",
            Self::Chunks => "chunks",
            Self::Entities => "entities",
            Self::Properties => "properties",
            Self::Categories => "categories",
            Self::Coreferences => "coreferences",
            Self::Opinions => "opinions",
            Self::Relations => "relations",
            Self::Srl => "srl",
            Self::Constituency => "constituency",
            Self::ConstituencyStrings => "constituencyStrings",
            Self::TimeExpressions => "timeExpressions",
            Self::LinkedEntities => "linkedEntities",
            Self::Factualities => "factualities",
            Self::Topics => "topics",
            Self::TemporalRelations => "temporalRelations",
            Self::CausalRelations => "causalRelations",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = NafError;

    fn from_str(s: &str) -> Result<Self> {
        Layer::ALL
            .iter()
            .copied()
            .find(|l| l.name() == s)
            .ok_or_else(|| NafError::InvalidValue {
                field: "layer".to_string(),
                reason: format!("unknown layer '{}'", s),
            })
    }
}

/// Handle naming a single annotation for removal.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationRef {
    /// A term (top-level or compound).
    Term(TermId),
    /// A markable of the given source.
    Mark {
        /// Mark source.
        source: String,
        /// Mark id.
        id: String,
    },
    /// A dependency, matched by value.
    Dep(Dep),
    /// A chunk.
    Chunk(String),
    /// An entity.
    Entity(String),
    /// A property or category.
    Feature(FeatureKind, String),
    /// A coreference chain.
    Coref(String),
    /// A time expression.
    Timex3(String),
    /// A factuality (keyed by word form id).
    Factuality(String),
    /// A linked entity.
    LinkedEntity(String),
    /// A super-sense span.
    Sst(String),
    /// A topic.
    Topic(String),
    /// An opinion.
    Opinion(String),
    /// A relation.
    Relation(String),
    /// A predicate with its roles.
    Predicate(String),
    /// A constituency tree, by root node id.
    Tree(String),
    /// A temporal link.
    TLink(String),
    /// A causal link.
    CLink(String),
    /// An unknown layer, by element name.
    Unknown(String),
}

impl AnnotationRef {
    /// Layer name used in error messages.
    pub fn layer_name(&self) -> &'static str {
        match self {
            Self::Term(_) => "terms",
            Self::Mark { .. } => "markables",
            Self::Dep(_) => "deps",
            Self::Chunk(_) => "chunks",
            Self::Entity(_) => "entities",
            Self::Feature(FeatureKind::Property, _) => "properties",
            Self::Feature(FeatureKind::Category, _) => "categories",
            Self::Coref(_) => "coreferences",
            Self::Timex3(_) => "timeExpressions",
            Self::Factuality(_) => "factualities",
            Self::LinkedEntity(_) => "linkedEntities",
            Self::Sst(_) => "SSTspans",
            Self::Topic(_) => "topics",
            Self::Opinion(_) => "opinions",
            Self::Relation(_) => "relations",
            Self::Predicate(_) => "srl",
            Self::Tree(_) => "constituency",
            Self::TLink(_) => "temporalRelations",
            Self::CLink(_) => "causalRelations",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// A section the codec did not recognise, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownLayer {
    /// Element name.
    pub name: String,
    /// Exact source text of the element.
    pub xml: String,
}

/// Multi-index container for every annotation layer of one document.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    pub(crate) text: IndexedLayer<Wf>,
    pub(crate) terms: IndexedLayer<Term>,
    component_owner: HashMap<TermId, TermId>,
    pub(crate) marks: Vec<(String, IndexedLayer<Mark>)>,
    pub(crate) deps: IndexedLayer<Dep>,
    pub(crate) chunks: IndexedLayer<Chunk>,
    pub(crate) entities: IndexedLayer<Entity>,
    pub(crate) properties: IndexedLayer<Feature>,
    pub(crate) categories: IndexedLayer<Feature>,
    pub(crate) corefs: IndexedLayer<Coref>,
    pub(crate) opinions: IndexedLayer<Opinion>,
    pub(crate) relations: IndexedLayer<Relation>,
    pub(crate) predicates: IndexedLayer<Predicate>,
    pub(crate) trees: IndexedLayer<Tree>,
    pub(crate) timexes: IndexedLayer<Timex3>,
    pub(crate) factualities: IndexedLayer<Factuality>,
    pub(crate) linked_entities: IndexedLayer<LinkedEntity>,
    pub(crate) ssts: IndexedLayer<SstSpan>,
    pub(crate) topics: IndexedLayer<Topic>,
    pub(crate) tlinks: IndexedLayer<TLink>,
    pub(crate) clinks: IndexedLayer<CLink>,
    constituency_strings: BTreeMap<u32, String>,
    paragraphs: BTreeMap<u32, Vec<u32>>,
    unknown: Vec<UnknownLayer>,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            text: IndexedLayer::new("text"),
            terms: IndexedLayer::new("terms"),
            component_owner: HashMap::new(),
            marks: Vec::new(),
            deps: IndexedLayer::new("deps"),
            chunks: IndexedLayer::new("chunks"),
            entities: IndexedLayer::new("entities"),
            properties: IndexedLayer::new("properties"),
            categories: IndexedLayer::new("categories"),
            corefs: IndexedLayer::new("coreferences"),
            opinions: IndexedLayer::new("opinions"),
            relations: IndexedLayer::new("relations"),
            predicates: IndexedLayer::new("srl"),
            trees: IndexedLayer::new("constituency"),
            timexes: IndexedLayer::new("timeExpressions"),
            factualities: IndexedLayer::new("factualities"),
            linked_entities: IndexedLayer::new("linkedEntities"),
            ssts: IndexedLayer::new("SSTspans"),
            topics: IndexedLayer::new("topics"),
            tlinks: IndexedLayer::new("temporalRelations"),
            clinks: IndexedLayer::new("causalRelations"),
            constituency_strings: BTreeMap::new(),
            paragraphs: BTreeMap::new(),
            unknown: Vec::new(),
        }
    }

    // ─── reference checks ───────────────────────────────────────────────────

    fn check_wfs<'a>(&self, element: &str, wfs: impl IntoIterator<Item = &'a WfId>) -> Result<()> {
        for wf in wfs {
            if !self.text.contains(wf.as_str()) {
                return Err(NafError::unresolved(element, wf.as_str()));
            }
        }
        Ok(())
    }

    fn check_terms<'a>(&self, element: &str, terms: impl IntoIterator<Item = &'a TermId>) -> Result<()> {
        for term in terms {
            if !self.has_term(term.as_str()) {
                return Err(NafError::unresolved(element, term.as_str()));
            }
        }
        Ok(())
    }

    /// Fail if `tree` could not be added: unknown terms or a taken root id.
    pub(crate) fn check_tree(&self, tree: &Tree) -> Result<()> {
        let root = tree.root().id();
        self.check_terms(&format!("tree {}", root), tree.terms().iter().copied())?;
        if self.trees.contains(root) {
            return Err(NafError::malformed(format!("duplicate trees id {}", root)));
        }
        Ok(())
    }

    fn check_relational(&self, element: &str, r: &Relational) -> Result<()> {
        let found = match r {
            Relational::Entity(id) => self.entities.contains(id),
            Relational::Property(id) => self.properties.contains(id),
            Relational::Category(id) => self.categories.contains(id),
        };
        if found {
            Ok(())
        } else {
            Err(NafError::unresolved(element, r.id()))
        }
    }

    fn check_referable(&self, element: &str, r: &TLinkReferable) -> Result<()> {
        let found = match r {
            TLinkReferable::Event(id) => self.predicates.contains(id),
            TLinkReferable::Timex(id) => self.timexes.contains(id),
        };
        if found {
            Ok(())
        } else {
            Err(NafError::unresolved(element, r.id()))
        }
    }

    fn first_sentence_of_terms<'a>(&self, mut terms: impl Iterator<Item = &'a TermId>) -> Option<u32> {
        terms.next().and_then(|t| self.term_sentence(t.as_str()))
    }

    // ─── text ───────────────────────────────────────────────────────────────

    /// Word form layer.
    pub fn text(&self) -> &IndexedLayer<Wf> {
        &self.text
    }

    /// Insert a word form, indexing it (and its paragraph) by sentence.
    pub fn add_wf(&mut self, wf: Wf) -> Result<&mut Wf> {
        let keys = IndexKeys::default().in_sentence(Some(wf.sent()));
        if let Some(para) = wf.para() {
            self.index_paragraph(wf.sent(), para);
        }
        let id = wf.id().to_string();
        self.text.push(wf, Some(id), keys)
    }

    /// Assign a paragraph to a word form.
    pub fn set_wf_para(&mut self, wf: &str, para: u32) -> Result<()> {
        let target = self.text.get_mut(wf).ok_or_else(|| NafError::unresolved("wf", wf))?;
        target.set_para(para);
        let sent = target.sent();
        self.index_paragraph(sent, para);
        Ok(())
    }

    fn index_paragraph(&mut self, sent: u32, para: u32) {
        if sent == 0 || para == 0 {
            return;
        }
        let sentences = self.paragraphs.entry(para).or_default();
        if !sentences.contains(&sent) {
            sentences.push(sent);
        }
    }

    /// Sentences registered under `para`, in first-seen order.
    pub fn paragraph_sentences(&self, para: u32) -> &[u32] {
        self.paragraphs.get(&para).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Paragraph numbers, ascending.
    pub fn paragraph_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.paragraphs.keys().copied()
    }

    /// Collect a sentence-indexed lookup over every sentence of `para`.
    pub fn by_paragraph<'a, T: 'a>(&'a self, para: u32, by_sentence: impl Fn(u32) -> Vec<&'a T>) -> Vec<&'a T> {
        self.paragraph_sentences(para).iter().flat_map(|s| by_sentence(*s)).collect()
    }

    // ─── terms ──────────────────────────────────────────────────────────────

    /// Top-level term layer.
    pub fn terms(&self) -> &IndexedLayer<Term> {
        &self.terms
    }

    /// Whether `id` names a top-level term or a component.
    pub fn has_term(&self, id: &str) -> bool {
        self.terms.contains(id) || self.component_owner.contains_key(id)
    }

    /// Term or component by id.
    pub fn term(&self, id: &str) -> Option<&Term> {
        if let Some(term) = self.terms.get(id) {
            return Some(term);
        }
        let owner = self.component_owner.get(id)?;
        self.terms.get(owner.as_str())?.component(id)
    }

    /// Mutable term or component by id.
    pub fn term_mut(&mut self, id: &str) -> Option<&mut Term> {
        if self.terms.contains(id) {
            return self.terms.get_mut(id);
        }
        let owner = self.component_owner.get(id)?.clone();
        self.terms.get_mut(owner.as_str())?.component_mut(id)
    }

    /// Sentence of a term: the sentence of its first word form.
    pub fn term_sentence(&self, id: &str) -> Option<u32> {
        let wf = self.term(id)?.span().first()?;
        self.text.get(wf.as_str()).map(Wf::sent)
    }

    /// Insert a term, at `position` or at the end.
    ///
    /// Components carried by the term are registered so they can be found by id.
    pub fn add_term(&mut self, term: Term, position: Option<usize>) -> Result<&mut Term> {
        let element = format!("term {}", term.id());
        self.check_wfs(&element, term.wfs())?;
        for component in term.components() {
            self.check_wfs(&element, component.wfs())?;
            if self.has_term(component.id().as_str()) {
                return Err(NafError::malformed(format!("duplicate terms id {}", component.id())));
            }
        }
        let sentence = if term.is_component() {
            None
        } else {
            term.wfs().first().and_then(|w| self.text.get(w.as_str())).map(Wf::sent)
        };
        let keys = IndexKeys::wfs(term.wfs().iter().cloned()).in_sentence(sentence);
        let id = term.id().clone();
        let components: Vec<TermId> = term.components().iter().map(|c| c.id().clone()).collect();
        if self.component_owner.contains_key(id.as_str()) {
            return Err(NafError::malformed(format!("duplicate terms id {}", id)));
        }
        let position = position.unwrap_or(self.terms.len());
        self.terms.insert_at(position, term, Some(id.to_string()), keys)?;
        for component in components {
            self.component_owner.insert(component, id.clone());
        }
        self.terms.get_mut(id.as_str()).ok_or_else(|| NafError::unresolved("term", id.as_str()))
    }

    /// Detach a top-level term from the layer and every term index.
    pub fn take_term(&mut self, id: &str) -> Option<Term> {
        let term = self.terms.remove(id)?;
        for component in term.components() {
            self.component_owner.remove(component.id().as_str());
        }
        Some(term)
    }

    /// Attach `component` to the top-level term `compound`.
    pub fn add_component(&mut self, compound: &str, component: Term, is_head: bool) -> Result<&mut Term> {
        let id = component.id().clone();
        self.check_wfs(&format!("component {}", id), component.wfs())?;
        if self.has_term(id.as_str()) {
            return Err(NafError::malformed(format!("duplicate terms id {}", id)));
        }
        let owner = self
            .terms
            .get_mut(compound)
            .ok_or_else(|| NafError::unresolved(format!("component {}", id), compound))?;
        owner.add_component(component, is_head);
        self.component_owner.insert(id.clone(), TermId::new(compound));
        self.term_mut(id.as_str()).ok_or_else(|| NafError::unresolved("component", id.as_str()))
    }

    // ─── markables ──────────────────────────────────────────────────────────

    /// Mark sources, in first-use order.
    pub fn mark_sources(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().map(|(s, _)| s.as_str())
    }

    /// Marks of one source.
    pub fn marks(&self, source: &str) -> Option<&IndexedLayer<Mark>> {
        self.marks.iter().find(|(s, _)| s == source).map(|(_, l)| l)
    }

    pub(crate) fn marks_mut(&mut self, source: &str) -> Option<&mut IndexedLayer<Mark>> {
        self.marks.iter_mut().find(|(s, _)| s == source).map(|(_, l)| l)
    }

    /// Insert a markable under `source`.
    pub fn add_mark(&mut self, source: &str, mark: Mark) -> Result<&mut Mark> {
        self.check_terms(&format!("mark {}", mark.id()), mark.span().targets())?;
        let keys = IndexKeys::terms(mark.span().targets().iter().cloned())
            .in_sentence(self.first_sentence_of_terms(mark.span().targets().iter()));
        if self.marks(source).is_none() {
            self.marks.push((source.to_string(), IndexedLayer::new("markables")));
        }
        let id = mark.id().to_string();
        let layer = self.marks_mut(source).ok_or_else(|| NafError::unresolved("markables", source))?;
        layer.push(mark, Some(id), keys)
    }

    // ─── syntax ─────────────────────────────────────────────────────────────

    /// Dependency layer.
    pub fn deps(&self) -> &IndexedLayer<Dep> {
        &self.deps
    }

    /// Insert a dependency, indexed by both ends and by the sentence of `from`.
    pub fn add_dep(&mut self, dep: Dep) -> Result<&mut Dep> {
        self.check_terms("dep", [dep.from(), dep.to()])?;
        let mut keys = IndexKeys::terms([dep.from().clone(), dep.to().clone()]);
        keys.sentence = self.term_sentence(dep.from().as_str());
        self.deps.push(dep, None, keys)
    }

    /// Chunk layer.
    pub fn chunks(&self) -> &IndexedLayer<Chunk> {
        &self.chunks
    }

    /// Insert a chunk.
    pub fn add_chunk(&mut self, chunk: Chunk) -> Result<&mut Chunk> {
        self.check_terms(&format!("chunk {}", chunk.id()), chunk.span().targets())?;
        let keys = IndexKeys::terms(chunk.span().targets().iter().cloned())
            .in_sentence(self.first_sentence_of_terms(chunk.span().targets().iter()));
        let id = chunk.id().to_string();
        self.chunks.push(chunk, Some(id), keys)
    }

    // ─── entities and features ──────────────────────────────────────────────

    /// Entity layer.
    pub fn entities(&self) -> &IndexedLayer<Entity> {
        &self.entities
    }

    /// Insert an entity.
    pub fn add_entity(&mut self, entity: Entity) -> Result<&mut Entity> {
        self.check_terms(&format!("entity {}", entity.id()), entity.terms())?;
        let keys = IndexKeys::terms(entity.terms().cloned()).in_sentence(self.first_sentence_of_terms(entity.terms()));
        let id = entity.id().to_string();
        self.entities.push(entity, Some(id), keys)
    }

    /// Property or category layer.
    pub fn features(&self, kind: FeatureKind) -> &IndexedLayer<Feature> {
        match kind {
            FeatureKind::Property => &self.properties,
            FeatureKind::Category => &self.categories,
        }
    }

    pub(crate) fn features_mut(&mut self, kind: FeatureKind) -> &mut IndexedLayer<Feature> {
        match kind {
            FeatureKind::Property => &mut self.properties,
            FeatureKind::Category => &mut self.categories,
        }
    }

    /// Insert a property or category.
    pub fn add_feature(&mut self, feature: Feature) -> Result<&mut Feature> {
        self.check_terms(&format!("{} {}", feature.kind(), feature.id()), feature.terms())?;
        let keys = IndexKeys::terms(feature.terms().cloned());
        let id = feature.id().to_string();
        self.features_mut(feature.kind()).push(feature, Some(id), keys)
    }

    /// Coreference layer.
    pub fn corefs(&self) -> &IndexedLayer<Coref> {
        &self.corefs
    }

    /// Insert a coreference chain.
    pub fn add_coref(&mut self, coref: Coref) -> Result<&mut Coref> {
        self.check_terms(&format!("coref {}", coref.id()), coref.terms())?;
        let keys = IndexKeys::terms(coref.terms().cloned());
        let id = coref.id().to_string();
        self.corefs.push(coref, Some(id), keys)
    }

    /// Linked entity layer.
    pub fn linked_entities(&self) -> &IndexedLayer<LinkedEntity> {
        &self.linked_entities
    }

    /// Insert a linked entity.
    pub fn add_linked_entity(&mut self, entity: LinkedEntity) -> Result<&mut LinkedEntity> {
        self.check_wfs(&format!("linkedEntity {}", entity.id()), entity.span().targets())?;
        let keys = IndexKeys::wfs(entity.span().targets().iter().cloned());
        let id = entity.id().to_string();
        self.linked_entities.push(entity, Some(id), keys)
    }

    /// Relation layer.
    pub fn relations(&self) -> &IndexedLayer<Relation> {
        &self.relations
    }

    /// Insert a relation, indexed by both endpoint ids.
    pub fn add_relation(&mut self, relation: Relation) -> Result<&mut Relation> {
        let element = format!("relation {}", relation.id());
        self.check_relational(&element, relation.from())?;
        self.check_relational(&element, relation.to())?;
        let keys = IndexKeys {
            relational: vec![relation.from().id().to_string(), relation.to().id().to_string()],
            ..IndexKeys::default()
        };
        let id = relation.id().to_string();
        self.relations.push(relation, Some(id), keys)
    }

    // ─── opinions ───────────────────────────────────────────────────────────

    /// Opinion layer.
    pub fn opinions(&self) -> &IndexedLayer<Opinion> {
        &self.opinions
    }

    /// Insert an opinion, indexed by the terms of its parts.
    pub fn add_opinion(&mut self, opinion: Opinion) -> Result<&mut Opinion> {
        self.check_terms(&format!("opinion {}", opinion.id()), opinion.terms())?;
        let keys = IndexKeys::terms(opinion.terms().cloned());
        let id = opinion.id().to_string();
        self.opinions.push(opinion, Some(id), keys)
    }

    /// Change an opinion's parts and refresh its term index entries.
    pub fn update_opinion(&mut self, id: &str, update: impl FnOnce(&mut Opinion)) -> Result<()> {
        let mut draft = self.opinions.get(id).cloned().ok_or_else(|| NafError::unresolved("opinion", id))?;
        update(&mut draft);
        self.check_terms(&format!("opinion {}", id), draft.terms())?;
        let keys = IndexKeys::terms(draft.terms().cloned());
        if let Some(current) = self.opinions.get_mut(id) {
            *current = draft;
        }
        self.opinions.reindex(id, keys)
    }

    // ─── srl ────────────────────────────────────────────────────────────────

    /// Predicate layer.
    pub fn predicates(&self) -> &IndexedLayer<Predicate> {
        &self.predicates
    }

    /// Insert a predicate (with any roles it already carries).
    pub fn add_predicate(&mut self, predicate: Predicate) -> Result<&mut Predicate> {
        let element = format!("predicate {}", predicate.id());
        self.check_terms(&element, predicate.span().targets())?;
        for role in predicate.roles() {
            self.check_terms(&format!("role {}", role.id()), role.span().targets())?;
        }
        let keys = IndexKeys::terms(predicate.span().targets().iter().cloned())
            .in_sentence(self.first_sentence_of_terms(predicate.span().targets().iter()));
        let id = predicate.id().to_string();
        self.predicates.push(predicate, Some(id), keys)
    }

    /// Check role targets before attaching a role to a predicate.
    pub(crate) fn check_role_span(&self, role_id: &str, span: &crate::types::Span<TermId>) -> Result<()> {
        self.check_terms(&format!("role {}", role_id), span.targets())
    }

    // ─── temporal ───────────────────────────────────────────────────────────

    /// Time expression layer.
    pub fn timexes(&self) -> &IndexedLayer<Timex3> {
        &self.timexes
    }

    /// Insert a time expression, indexed by its word forms and their sentence.
    pub fn add_timex(&mut self, timex: Timex3) -> Result<&mut Timex3> {
        let wfs: Vec<WfId> = timex.span().map(|s| s.targets().to_vec()).unwrap_or_default();
        self.check_wfs(&format!("timex3 {}", timex.id()), &wfs)?;
        let sentence = wfs.first().and_then(|w| self.text.get(w.as_str())).map(Wf::sent);
        let keys = IndexKeys::wfs(wfs).in_sentence(sentence);
        let id = timex.id().to_string();
        self.timexes.push(timex, Some(id), keys)
    }

    /// Time expressions over any word form of `term`.
    pub fn timexes_by_term(&self, term: &str) -> Vec<&Timex3> {
        let Some(term) = self.term(term) else {
            return Vec::new();
        };
        let mut out: Vec<&Timex3> = Vec::new();
        for wf in term.wfs() {
            for timex in self.timexes.by_wf(wf.as_str()) {
                if !out.iter().any(|t| t.id() == timex.id()) {
                    out.push(timex);
                }
            }
        }
        out
    }

    /// Factuality layer.
    pub fn factualities(&self) -> &IndexedLayer<Factuality> {
        &self.factualities
    }

    /// Insert a factuality, keyed by its word form.
    pub fn add_factuality(&mut self, factuality: Factuality) -> Result<&mut Factuality> {
        self.check_wfs("factuality", [factuality.wf()])?;
        self.check_terms("factuality", [factuality.term()])?;
        let keys = IndexKeys::wfs([factuality.wf().clone()]);
        let id = factuality.id().to_string();
        self.factualities.push(factuality, Some(id), keys)
    }

    /// Temporal link layer.
    pub fn tlinks(&self) -> &IndexedLayer<TLink> {
        &self.tlinks
    }

    /// Insert a temporal link.
    pub fn add_tlink(&mut self, tlink: TLink) -> Result<&mut TLink> {
        let element = format!("tlink {}", tlink.id());
        self.check_referable(&element, tlink.from())?;
        self.check_referable(&element, tlink.to())?;
        let id = tlink.id().to_string();
        self.tlinks.push(tlink, Some(id), IndexKeys::default())
    }

    /// Causal link layer.
    pub fn clinks(&self) -> &IndexedLayer<CLink> {
        &self.clinks
    }

    /// Insert a causal link.
    pub fn add_clink(&mut self, clink: CLink) -> Result<&mut CLink> {
        let element = format!("clink {}", clink.id());
        for end in [clink.from(), clink.to()] {
            if !self.predicates.contains(end) {
                return Err(NafError::unresolved(element.as_str(), end));
            }
        }
        let id = clink.id().to_string();
        self.clinks.push(clink, Some(id), IndexKeys::default())
    }

    // ─── lexical ────────────────────────────────────────────────────────────

    /// Super-sense span layer.
    pub fn ssts(&self) -> &IndexedLayer<SstSpan> {
        &self.ssts
    }

    /// Insert a super-sense span.
    pub fn add_sst(&mut self, sst: SstSpan) -> Result<&mut SstSpan> {
        self.check_terms(&format!("sst {}", sst.id()), sst.span().targets())?;
        let keys = IndexKeys::terms(sst.span().targets().iter().cloned());
        let id = sst.id().to_string();
        self.ssts.push(sst, Some(id), keys)
    }

    /// Topic layer.
    pub fn topics(&self) -> &IndexedLayer<Topic> {
        &self.topics
    }

    /// Insert a topic.
    pub fn add_topic(&mut self, topic: Topic) -> Result<&mut Topic> {
        let id = topic.id().to_string();
        self.topics.push(topic, Some(id), IndexKeys::default())
    }

    // ─── constituency ───────────────────────────────────────────────────────

    /// Tree layer.
    pub fn trees(&self) -> &IndexedLayer<Tree> {
        &self.trees
    }

    /// Insert a tree, indexed by its sentence (or that of its first terminal).
    pub fn add_tree(&mut self, tree: Tree) -> Result<&mut Tree> {
        self.check_tree(&tree)?;
        let sentence = tree.sentence().or_else(|| {
            tree.nodes().into_iter().find_map(|n| match n {
                TreeNode::Terminal { span, .. } => self.first_sentence_of_terms(span.targets().iter()),
                TreeNode::NonTerminal { .. } => None,
            })
        });
        let keys = IndexKeys::default().in_sentence(sentence);
        let id = tree.root().id().to_string();
        self.trees.push(tree, Some(id), keys)
    }

    /// Raw bracket strings by sentence.
    pub fn constituency_strings(&self) -> &BTreeMap<u32, String> {
        &self.constituency_strings
    }

    /// Store the bracket string of a sentence, replacing any previous one.
    pub fn add_constituency_string(&mut self, sentence: u32, tree: impl Into<String>) {
        self.constituency_strings.insert(sentence, tree.into());
    }

    // ─── unknown ────────────────────────────────────────────────────────────

    /// Sections kept verbatim, in load order.
    pub fn unknown_layers(&self) -> &[UnknownLayer] {
        &self.unknown
    }

    /// Keep an unrecognised section.
    pub fn add_unknown_layer(&mut self, layer: UnknownLayer) {
        self.unknown.push(layer);
    }

    // ─── removal ────────────────────────────────────────────────────────────

    /// Remove one annotation together with all of its index entries.
    ///
    /// Returns whether something was removed. Layers without removal semantics
    /// fail with [`NafError::UnsupportedRemoval`] and are left untouched.
    pub fn remove(&mut self, annotation: &AnnotationRef) -> Result<bool> {
        let removed = match annotation {
            AnnotationRef::Term(id) => self.take_term(id.as_str()).is_some(),
            AnnotationRef::Dep(dep) => self.deps.remove_where(|d| d == dep).is_some(),
            AnnotationRef::Entity(id) => self.entities.remove(id).is_some(),
            AnnotationRef::Timex3(id) => self.timexes.remove(id).is_some(),
            AnnotationRef::Factuality(id) => self.factualities.remove(id).is_some(),
            AnnotationRef::LinkedEntity(id) => self.linked_entities.remove(id).is_some(),
            AnnotationRef::Sst(id) => self.ssts.remove(id).is_some(),
            AnnotationRef::Opinion(id) => self.opinions.remove(id).is_some(),
            AnnotationRef::Predicate(id) => self.predicates.remove(id).is_some(),
            AnnotationRef::Mark { .. }
            | AnnotationRef::Chunk(_)
            | AnnotationRef::Feature(..)
            | AnnotationRef::Coref(_)
            | AnnotationRef::Topic(_)
            | AnnotationRef::Relation(_)
            | AnnotationRef::Tree(_)
            | AnnotationRef::TLink(_)
            | AnnotationRef::CLink(_)
            | AnnotationRef::Unknown(_) => {
                tracing::warn!(layer = annotation.layer_name(), "Removal is not supported for this layer");
                return Err(NafError::unsupported_removal(annotation.layer_name()));
            }
        };
        Ok(removed)
    }

    /// Drop a whole layer and its indices.
    pub fn remove_layer(&mut self, layer: Layer) {
        match layer {
            Layer::Text => {
                self.text.clear();
                self.paragraphs.clear();
            }
            Layer::Terms => {
                self.terms.clear();
                self.component_owner.clear();
            }
            Layer::Marks => self.marks.clear(),
            Layer::Deps => self.deps.clear(),
            Layer::Chunks => self.chunks.clear(),
            Layer::Entities => self.entities.clear(),
            Layer::Properties => self.properties.clear(),
            Layer::Categories => self.categories.clear(),
            Layer::Coreferences => self.corefs.clear(),
            Layer::Opinions => self.opinions.clear(),
            Layer::Relations => self.relations.clear(),
            Layer::Srl => self.predicates.clear(),
            Layer::Constituency => self.trees.clear(),
            Layer::ConstituencyStrings => self.constituency_strings.clear(),
            Layer::TimeExpressions => self.timexes.clear(),
            Layer::LinkedEntities => self.linked_entities.clear(),
            Layer::Factualities => self.factualities.clear(),
            Layer::Topics => self.topics.clear(),
            Layer::TemporalRelations => self.tlinks.clear(),
            Layer::CausalRelations => self.clinks.clear(),
        }
        tracing::debug!(layer = %layer, "Layer removed");
    }

    /// Per-layer annotation counts.
    pub fn counts(&self) -> LayerCounts {
        LayerCounts {
            wfs: self.text.len(),
            terms: self.terms.len(),
            marks: self.marks.iter().map(|(_, l)| l.len()).sum(),
            deps: self.deps.len(),
            chunks: self.chunks.len(),
            entities: self.entities.len(),
            properties: self.properties.len(),
            categories: self.categories.len(),
            corefs: self.corefs.len(),
            opinions: self.opinions.len(),
            relations: self.relations.len(),
            predicates: self.predicates.len(),
            trees: self.trees.len(),
            timexes: self.timexes.len(),
            factualities: self.factualities.len(),
            linked_entities: self.linked_entities.len(),
            ssts: self.ssts.len(),
            topics: self.topics.len(),
            tlinks: self.tlinks.len(),
            clinks: self.clinks.len(),
            unknown: self.unknown.len(),
        }
    }
}

/// Number of annotations per layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct LayerCounts {
    pub wfs: usize,
    pub terms: usize,
    pub marks: usize,
    pub deps: usize,
    pub chunks: usize,
    pub entities: usize,
    pub properties: usize,
    pub categories: usize,
    pub corefs: usize,
    pub opinions: usize,
    pub relations: usize,
    pub predicates: usize,
    pub trees: usize,
    pub timexes: usize,
    pub factualities: usize,
    pub linked_entities: usize,
    pub ssts: usize,
    pub topics: usize,
    pub tlinks: usize,
    pub clinks: usize,
    pub unknown: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    fn store_with_sentence() -> AnnotationStore {
        let mut store = AnnotationStore::new();
        for (i, form) in ["John", "loves", "Mary"].iter().enumerate() {
            let id = format!("w{}", i + 1);
            store.add_wf(Wf::new(WfId::new(id.as_str()), *form, 1)).unwrap();
            let term = Term::new(TermId::new(format!("t{}", i + 1)), Span::from_targets(vec![WfId::new(id)]), false);
            store.add_term(term, None).unwrap();
        }
        store
    }

    fn tspan(ids: &[&str]) -> Span<TermId> {
        Span::from_targets(ids.iter().map(|t| TermId::new(*t)).collect())
    }

    #[test]
    fn test_term_indexed_by_wf_and_sentence() {
        let store = store_with_sentence();
        assert_eq!(store.terms().by_wf("w2")[0].id().as_str(), "t2");
        assert_eq!(store.terms().by_sentence(1).len(), 3);
        assert_eq!(store.term_sentence("t3"), Some(1));
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let mut store = store_with_sentence();
        let err = store.add_entity(Entity::new("e1".into(), vec![tspan(&["t9"])])).unwrap_err();
        assert!(matches!(err, NafError::UnresolvedReference { ref id, .. } if id == "t9"));
        assert!(store.entities().is_empty());
    }

    #[test]
    fn test_dep_indexed_by_both_ends() {
        let mut store = store_with_sentence();
        store.add_dep(Dep::new(TermId::new("t2"), TermId::new("t1"), "nsubj")).unwrap();
        assert_eq!(store.deps().by_term("t1").len(), 1);
        assert_eq!(store.deps().by_term("t2").len(), 1);
        assert_eq!(store.deps().by_sentence(1).len(), 1);
    }

    #[test]
    fn test_unsupported_removal_leaves_store_unchanged() {
        let mut store = store_with_sentence();
        store.add_chunk(Chunk::new("c1".into(), tspan(&["t1"]))).unwrap();
        let err = store.remove(&AnnotationRef::Chunk("c1".into())).unwrap_err();
        assert!(matches!(err, NafError::UnsupportedRemoval { .. }));
        assert_eq!(store.chunks().len(), 1);
        assert_eq!(store.chunks().by_term("t1").len(), 1);
    }

    #[test]
    fn test_remove_entity_retracts_indices() {
        let mut store = store_with_sentence();
        store.add_entity(Entity::new("e1".into(), vec![tspan(&["t1"]), tspan(&["t3"])])).unwrap();
        assert!(store.remove(&AnnotationRef::Entity("e1".into())).unwrap());
        assert!(store.entities().by_term("t3").is_empty());
        assert!(store.entities().by_sentence(1).is_empty());
        assert!(!store.remove(&AnnotationRef::Entity("e1".into())).unwrap());
    }

    #[test]
    fn test_paragraph_index_ignores_zero() {
        let mut store = store_with_sentence();
        store.add_wf(Wf::new(WfId::new("w4"), "Then", 2)).unwrap();
        store.set_wf_para("w1", 1).unwrap();
        store.set_wf_para("w4", 1).unwrap();
        store.set_wf_para("w2", 0).unwrap();
        assert_eq!(store.paragraph_sentences(1), &[1, 2]);
        let wfs = store.by_paragraph(1, |s| store.text().by_sentence(s));
        assert_eq!(wfs.len(), 4);
        assert!(store.paragraph_sentences(0).is_empty());
    }

    #[test]
    fn test_relation_indexed_by_endpoints() {
        let mut store = store_with_sentence();
        store.add_entity(Entity::new("e1".into(), vec![tspan(&["t1"])])).unwrap();
        store
            .add_feature(Feature::new("p1".into(), FeatureKind::Property, "love", vec![tspan(&["t2"])]))
            .unwrap();
        let rel = Relation::new("r1".into(), Relational::Entity("e1".into()), Relational::Property("p1".into()));
        store.add_relation(rel).unwrap();
        assert_eq!(store.relations().by_ref("p1").len(), 1);

        let bad = Relation::new("r2".into(), Relational::Entity("e1".into()), Relational::Category("p1".into()));
        assert!(store.add_relation(bad).is_err());
    }

    #[test]
    fn test_update_opinion_reindexes() {
        use crate::types::{OpinionExpression, OpinionHolder};
        let mut store = store_with_sentence();
        store.add_opinion(Opinion::new("o1".into())).unwrap();
        store
            .update_opinion("o1", |o| o.set_holder(Some(OpinionHolder::new(tspan(&["t1"])))))
            .unwrap();
        assert_eq!(store.opinions().by_term("t1").len(), 1);
        store
            .update_opinion("o1", |o| {
                o.set_holder(None);
                o.set_expression(Some(OpinionExpression::new(tspan(&["t2"]))));
            })
            .unwrap();
        assert!(store.opinions().by_term("t1").is_empty());
        assert_eq!(store.opinions().by_term("t2").len(), 1);
    }

    #[test]
    fn test_layer_names_parse() {
        assert_eq!("timeExpressions".parse::<Layer>().unwrap(), Layer::TimeExpressions);
        assert!("nonsense".parse::<Layer>().is_err());
    }
}
