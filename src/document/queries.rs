//! Per-layer getters and dependency-graph queries.

use super::Document;
use crate::dep_path::{self, Walk};
use crate::error::Result;
use crate::types::{
    CLink, Chunk, Coref, Dep, Entity, Factuality, Feature, FeatureKind, LinkedEntity, Mark, Opinion, Predicate,
    Relation, SstSpan, TLink, Term, TermId, Timex3, Topic, Tree, Wf,
};

/// `all`, `by id` lookups for id-keyed layers.
macro_rules! id_queries {
    ($($field:ident: $ty:ty => $all:ident, $get:ident;)*) => {
        impl Document {
            $(
                #[doc = concat!("Every `", stringify!($ty), "`, in document order.")]
                pub fn $all(&self) -> impl Iterator<Item = &$ty> + '_ {
                    self.store.$field.iter()
                }

                #[doc = concat!("`", stringify!($ty), "` by id.")]
                pub fn $get(&self, id: &str) -> Option<&$ty> {
                    self.store.$field.get(id)
                }
            )*
        }
    };
}

/// Sentence and paragraph lookups for sentence-indexed layers.
macro_rules! sentence_queries {
    ($($field:ident: $ty:ty => $by_sentence:ident, $by_paragraph:ident;)*) => {
        impl Document {
            $(
                #[doc = concat!("`", stringify!($ty), "`s of one sentence.")]
                pub fn $by_sentence(&self, sentence: u32) -> Vec<&$ty> {
                    self.store.$field.by_sentence(sentence)
                }

                #[doc = concat!("`", stringify!($ty), "`s of every sentence of one paragraph.")]
                pub fn $by_paragraph(&self, para: u32) -> Vec<&$ty> {
                    self.store.by_paragraph(para, |s| self.store.$field.by_sentence(s))
                }
            )*
        }
    };
}

/// Reverse lookups for term-indexed layers.
macro_rules! term_queries {
    ($($field:ident: $ty:ty => $by_term:ident;)*) => {
        impl Document {
            $(
                #[doc = concat!("`", stringify!($ty), "`s referring to `term`.")]
                pub fn $by_term(&self, term: &TermId) -> Vec<&$ty> {
                    self.store.$field.by_term(term.as_str())
                }
            )*
        }
    };
}

id_queries! {
    text: Wf => wfs, wf;
    chunks: Chunk => chunks, chunk;
    entities: Entity => entities, entity;
    corefs: Coref => corefs, coref;
    opinions: Opinion => opinions, opinion;
    relations: Relation => relations, relation;
    predicates: Predicate => predicates, predicate;
    trees: Tree => trees, tree;
    timexes: Timex3 => timex3s, timex3;
    factualities: Factuality => factualities, factuality;
    linked_entities: LinkedEntity => linked_entities, linked_entity;
    ssts: SstSpan => ssts, sst;
    topics: Topic => topics, topic;
    tlinks: TLink => tlinks, tlink;
    clinks: CLink => clinks, clink;
}

sentence_queries! {
    text: Wf => wfs_by_sentence, wfs_by_paragraph;
    terms: Term => terms_by_sentence, terms_by_paragraph;
    deps: Dep => deps_by_sentence, deps_by_paragraph;
    chunks: Chunk => chunks_by_sentence, chunks_by_paragraph;
    entities: Entity => entities_by_sentence, entities_by_paragraph;
    predicates: Predicate => predicates_by_sentence, predicates_by_paragraph;
    trees: Tree => trees_by_sentence, trees_by_paragraph;
    timexes: Timex3 => timex3s_by_sentence, timex3s_by_paragraph;
}

term_queries! {
    deps: Dep => deps_by_term;
    chunks: Chunk => chunks_by_term;
    entities: Entity => entities_by_term;
    corefs: Coref => corefs_by_term;
    opinions: Opinion => opinions_by_term;
    predicates: Predicate => predicates_by_term;
    ssts: SstSpan => ssts_by_term;
}

impl Document {
    // ─── text and terms ─────────────────────────────────────────────────────

    /// Top-level terms, in document order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.store.terms.iter()
    }

    /// Term or component by id.
    pub fn term(&self, id: &str) -> Option<&Term> {
        self.store.term(id)
    }

    /// Top-level terms covering `wf`.
    pub fn terms_by_wf(&self, wf: &str) -> Vec<&Term> {
        self.store.terms.by_wf(wf)
    }

    /// Dependencies, in insertion order.
    pub fn deps(&self) -> impl Iterator<Item = &Dep> + '_ {
        self.store.deps.iter()
    }

    // ─── markables and features ─────────────────────────────────────────────

    /// Marks of `source`, in insertion order.
    pub fn marks(&self, source: &str) -> Vec<&Mark> {
        self.store.marks(source).map(|l| l.iter().collect()).unwrap_or_default()
    }

    /// Mark by source and id.
    pub fn mark(&self, source: &str, id: &str) -> Option<&Mark> {
        self.store.marks(source)?.get(id)
    }

    /// Marks of `source` referring to `term`.
    pub fn marks_by_term(&self, source: &str, term: &TermId) -> Vec<&Mark> {
        self.store.marks(source).map(|l| l.by_term(term.as_str())).unwrap_or_default()
    }

    /// Marks of `source` in one sentence.
    pub fn marks_by_sentence(&self, source: &str, sentence: u32) -> Vec<&Mark> {
        self.store.marks(source).map(|l| l.by_sentence(sentence)).unwrap_or_default()
    }

    /// Properties, in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.store.properties.iter()
    }

    /// Categories, in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.store.categories.iter()
    }

    /// Property or category by id.
    pub fn feature(&self, kind: FeatureKind, id: &str) -> Option<&Feature> {
        self.store.features(kind).get(id)
    }

    /// Properties or categories referring to `term`.
    pub fn features_by_term(&self, kind: FeatureKind, term: &TermId) -> Vec<&Feature> {
        self.store.features(kind).by_term(term.as_str())
    }

    /// Relations with `id` (an entity, property or category) as an endpoint.
    pub fn relations_by_relational(&self, id: &str) -> Vec<&Relation> {
        self.store.relations.by_ref(id)
    }

    // ─── word-form indexed layers ───────────────────────────────────────────

    /// Linked entities over `wf`.
    pub fn linked_entities_by_wf(&self, wf: &str) -> Vec<&LinkedEntity> {
        self.store.linked_entities.by_wf(wf)
    }

    /// Time expressions over any word form of `term`.
    pub fn timex3s_by_term(&self, term: &TermId) -> Vec<&Timex3> {
        self.store.timexes_by_term(term.as_str())
    }

    /// Factualities attached to `term`.
    pub fn factualities_by_term(&self, term: &TermId) -> Vec<&Factuality> {
        let Some(term) = self.store.term(term.as_str()) else {
            return Vec::new();
        };
        term.wfs().iter().flat_map(|w| self.store.factualities.by_wf(w.as_str())).collect()
    }

    /// Trees with a terminal over `term`.
    pub fn trees_by_term(&self, term: &TermId) -> Vec<&Tree> {
        let Some(sentence) = self.store.term_sentence(term.as_str()) else {
            return Vec::new();
        };
        self.store
            .trees
            .by_sentence(sentence)
            .into_iter()
            .filter(|t| t.terms().contains(&term))
            .collect()
    }

    /// Raw bracket string of a sentence.
    pub fn constituency_string(&self, sentence: u32) -> Option<&str> {
        self.store.constituency_strings().get(&sentence).map(String::as_str)
    }

    // ─── dependency graph ───────────────────────────────────────────────────

    /// The edge governing `term`.
    pub fn dep_to_term(&self, term: &TermId) -> Option<&Dep> {
        dep_path::dep_to_term(&self.store.deps, term)
    }

    /// Edges governed by `term`.
    pub fn deps_from_term(&self, term: &TermId) -> Vec<&Dep> {
        dep_path::deps_from_term(&self.store.deps, term)
    }

    /// Edges linking `from` and `to` through their lowest common governor.
    pub fn dep_path(&self, from: &TermId, to: &TermId) -> Option<Vec<&Dep>> {
        dep_path::dep_path(&self.store.deps, from, to)
    }

    /// Whether `path`, walked from `from`, matches the label pattern.
    pub fn match_dep_path(&self, from: &TermId, path: &[&Dep], pattern: &str) -> Result<bool> {
        self.engine.matches(from, path, pattern)
    }

    /// The single term of `terms` whose governor lies outside the set.
    pub fn terms_head(&self, terms: &[TermId]) -> Option<TermId> {
        dep_path::terms_head(&self.store.deps, terms)
    }

    /// `terms` plus every term they govern, transitively.
    ///
    /// With a pattern, only terms whose path from the start term matches are
    /// kept.
    pub fn terms_by_dep_ancestors(&self, terms: &[TermId], pattern: Option<&str>) -> Result<Vec<TermId>> {
        self.walk_deps(terms, Walk::Down, pattern)
    }

    /// `terms` plus every governor above them, transitively.
    pub fn terms_by_dep_descendants(&self, terms: &[TermId], pattern: Option<&str>) -> Result<Vec<TermId>> {
        self.walk_deps(terms, Walk::Up, pattern)
    }

    fn walk_deps(&self, terms: &[TermId], walk: Walk, pattern: Option<&str>) -> Result<Vec<TermId>> {
        match pattern {
            None => Ok(dep_path::reachable(&self.store.deps, terms, walk)),
            Some(pattern) => dep_path::reachable_matching(&self.engine, &self.store.deps, terms, walk, pattern),
        }
    }
}
