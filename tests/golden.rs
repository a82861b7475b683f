//! Golden tests for the document kernel.
//!
//! These tests verify lossless encoding and the documented end-to-end scenarios.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Arc;

use naf_kernel::{
    document_hash, AnnotationRef, CodecConfig, Dep, DepPathEngine, Document, ExternalRef, Feature,
    FeatureKind, FileDesc, LinguisticProcessor, NafError, OpinionExpression, OpinionHolder, OpinionTarget, Public,
    Relational, Sentiment, Span, TLinkReferable, TermId, WfId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn t(id: &str) -> TermId {
    TermId::new(id)
}

fn tspan(ids: &[&str]) -> Span<TermId> {
    Span::from_targets(ids.iter().map(|id| t(id)).collect())
}

fn wspan(ids: &[&str]) -> Span<WfId> {
    Span::from_targets(ids.iter().map(|id| WfId::new(*id)).collect())
}

/// Word forms and terms for `sentences`, with offsets into a single raw text.
fn with_sentences(engine: Arc<DepPathEngine>, sentences: &[&[&str]]) -> Document {
    let mut doc = Document::with_engine("en", "v3", engine);
    let mut raw = String::new();
    for (i, sentence) in sentences.iter().enumerate() {
        for form in sentence.iter() {
            if !raw.is_empty() {
                raw.push(' ');
            }
            let offset = raw.len() as u32;
            raw.push_str(form);
            let wf = doc.new_wf(*form, i as u32 + 1).unwrap();
            wf.offset = Some(offset);
            wf.length = Some(form.len() as u32);
            let id = wf.id().clone();
            doc.set_wf_para(id.as_str(), 1).unwrap();
            doc.new_term(Span::from_targets(vec![id])).unwrap().lemma = Some(form.to_lowercase());
        }
    }
    doc.set_raw(raw);
    doc
}

fn john_loves_mary() -> Document {
    let mut doc = with_sentences(Arc::new(DepPathEngine::new()), &[&["John", "loves", "Mary"]]);
    doc.new_dep(&t("t2"), &t("t1"), "nsubj").unwrap();
    doc.new_dep(&t("t2"), &t("t3"), "dobj").unwrap();
    doc
}

/// A document with at least one annotation in every layer.
fn full_document() -> Document {
    let mut doc = with_sentences(
        DepPathEngine::shared(),
        &[&["John", "loves", "New", "York"], &["He", "moved", "there", "in", "2001"]],
    );
    doc.header.file_desc = Some(FileDesc {
        author: Some("Reporter".into()),
        title: Some("Moving".into()),
        pages: Some(1),
        ..FileDesc::default()
    });
    doc.header.public = Some(Public {
        public_id: Some("doc-1".into()),
        uri: Some("http://example.org/doc-1".into()),
    });
    doc.header
        .add_processor("terms", LinguisticProcessor::new("tagger").with_version("1.2"))
        .stamp_now();

    // terms
    {
        let term = doc.term_mut("t1").unwrap();
        term.pos = Some("NNP".into());
        term.sentiment = Some(Sentiment {
            polarity: Some("neutral".into()),
            ..Sentiment::default()
        });
        term.external_refs
            .push(ExternalRef::new("wn", "john-n").with_confidence(0.5).with_nested(ExternalRef::new("sumo", "Human")));
    }
    let ny = doc.new_compound(&[t("t3"), t("t4")], "new_york").unwrap().id().clone();

    doc.new_mark("coref", tspan(&["t5"])).unwrap().lemma = Some("he".into());
    doc.new_dep(&t("t2"), &t("t1"), "nsubj").unwrap();
    doc.new_dep(&t("t2"), &ny, "dobj").unwrap();
    doc.new_dep(&t("t6"), &t("t5"), "nsubj").unwrap().case = Some("nom".into());
    doc.new_chunk(Span::with_head(vec![t("t1")], t("t1"))).unwrap().phrase = Some("NP".into());

    let john = doc.new_entity(vec![tspan(&["t1"])]).unwrap();
    john.entity_type = Some("PER".into());
    let john = john.id().to_string();
    doc.new_entity(vec![Span::from_targets(vec![ny.clone()])]).unwrap().named = false;
    doc.new_coref(vec![tspan(&["t1"]), tspan(&["t5"])]).unwrap().cluster = Some("c1".into());

    let tmx = doc.new_timex3("DATE", Some(wspan(&["w9"]))).unwrap();
    tmx.value = Some("2001".into());
    tmx.temporal_function = Some(false);
    let tmx = tmx.id().to_string();
    doc.new_factuality(&t("t6")).unwrap().add_part("CT+", Some(0.9));

    let linked = doc.new_linked_entity(wspan(&["w3", "w4"])).unwrap();
    linked.reference = Some("dbpedia:New_York_City".into());
    linked.confidence = Some(0.75);
    linked.spotted = true;
    linked.add_type("DBpedia", "City");

    doc.new_sst(tspan(&["t2"])).unwrap().label = Some("verb.emotion".into());
    doc.new_topic("migration").unwrap().probability = Some(0.4);

    let prop = doc.new_property("location", vec![Span::from_targets(vec![ny.clone()])]).unwrap().id().to_string();
    doc.new_category("travel", vec![tspan(&["t6"])]).unwrap();

    let op = doc.new_opinion().unwrap().id().to_string();
    doc.set_opinion_holder(&op, Some(OpinionHolder::new(tspan(&["t1"])))).unwrap();
    doc.set_opinion_target(&op, Some(OpinionTarget::new(Span::from_targets(vec![ny.clone()])))).unwrap();
    doc.set_opinion_expression(&op, Some(OpinionExpression::new(tspan(&["t2"])).with_polarity("positive")))
        .unwrap();

    doc.new_relation(Relational::Entity(john), Relational::Property(prop))
        .unwrap()
        .set_confidence(0.6)
        .unwrap();

    let loves = doc.new_predicate(tspan(&["t2"])).unwrap().id().to_string();
    doc.new_role(&loves, "A0", tspan(&["t1"])).unwrap().flags.push("core".into());
    let moved = doc.new_predicate(tspan(&["t6"])).unwrap();
    moved.uri = Some("pb:move.01".into());
    let moved = moved.id().to_string();

    doc.add_constituency_string(2, "(S (NP He) (VP moved there in 2001))");
    doc.add_constituency_from_parentheses("(ROOT (S (NP (PRP He)) (VP (VBD moved) (ADVP there) (PP (IN in) (CD 2001)))))", 2)
        .unwrap();

    doc.new_tlink(TLinkReferable::Event(moved.clone()), TLinkReferable::Timex(tmx), "IS_INCLUDED").unwrap();
    doc.new_clink(&loves, &moved).unwrap().rel_type = Some("CAUSE".into());
    doc
}

macro_rules! assert_layers_eq {
    ($a:expr, $b:expr, $($layer:ident),+ $(,)?) => {
        $(
            assert_eq!(
                $a.$layer().collect::<Vec<_>>(),
                $b.$layer().collect::<Vec<_>>(),
                "layer {} differs after round-trip",
                stringify!($layer)
            );
        )+
    };
}

/// `x` is listed under term `t` exactly when `t` is one of `x`'s terms.
fn check_term_index<'a, T: PartialEq + Debug>(
    layer: &str,
    universe: &[TermId],
    items: Vec<&'a T>,
    terms_of: impl Fn(&T) -> Vec<TermId>,
    by_term: impl Fn(&TermId) -> Vec<&'a T>,
) {
    for &item in &items {
        for term in terms_of(item) {
            assert!(by_term(&term).contains(&item), "{} {:?} missing under {}", layer, item, term);
        }
    }
    for term in universe {
        for item in by_term(term) {
            assert!(terms_of(item).contains(term), "{} {:?} wrongly under {}", layer, item, term);
        }
    }
}

/// `x` is listed under sentence `s` exactly when `sentence_of(x)` is `s`.
fn check_sentence_index<'a, T: PartialEq + Debug>(
    layer: &str,
    sentences: &BTreeSet<u32>,
    items: Vec<&'a T>,
    sentence_of: impl Fn(&T) -> Option<u32>,
    by_sentence: impl Fn(u32) -> Vec<&'a T>,
) {
    for &item in &items {
        if let Some(s) = sentence_of(item) {
            assert!(by_sentence(s).contains(&item), "{} {:?} missing under sentence {}", layer, item, s);
        }
    }
    for &s in sentences {
        for item in by_sentence(s) {
            assert_eq!(sentence_of(item), Some(s), "{} {:?} wrongly under sentence {}", layer, item, s);
        }
    }
}

fn assert_indices_consistent(doc: &Document) {
    let universe: Vec<TermId> = doc
        .terms()
        .flat_map(|t| std::iter::once(t.id().clone()).chain(t.components().iter().map(|c| c.id().clone())))
        .collect();
    let sentences: BTreeSet<u32> = doc.wfs().map(|w| w.sent()).collect();
    let store = doc.store();
    let first_sentence = |terms: Vec<TermId>| terms.first().and_then(|t| store.term_sentence(t.as_str()));
    let dep_terms = |d: &Dep| vec![d.from().clone(), d.to().clone()];

    check_term_index("dep", &universe, doc.deps().collect::<Vec<_>>(), dep_terms, |t| doc.deps_by_term(t));
    check_term_index("chunk", &universe, doc.chunks().collect::<Vec<_>>(), |c| c.span().targets().to_vec(), |t| {
        doc.chunks_by_term(t)
    });
    check_term_index("entity", &universe, doc.entities().collect::<Vec<_>>(), |e| e.terms().cloned().collect(), |t| {
        doc.entities_by_term(t)
    });
    check_term_index("coref", &universe, doc.corefs().collect::<Vec<_>>(), |c| c.terms().cloned().collect(), |t| {
        doc.corefs_by_term(t)
    });
    check_term_index("opinion", &universe, doc.opinions().collect::<Vec<_>>(), |o| o.terms().cloned().collect(), |t| {
        doc.opinions_by_term(t)
    });
    check_term_index("predicate", &universe, doc.predicates().collect::<Vec<_>>(), |p| p.span().targets().to_vec(), |t| {
        doc.predicates_by_term(t)
    });
    check_term_index("sst", &universe, doc.ssts().collect::<Vec<_>>(), |s| s.span().targets().to_vec(), |t| {
        doc.ssts_by_term(t)
    });
    check_term_index("mark", &universe, doc.marks("coref"), |m| m.span().targets().to_vec(), |t| {
        doc.marks_by_term("coref", t)
    });
    for kind in [FeatureKind::Property, FeatureKind::Category] {
        let features: Vec<&Feature> = match kind {
            FeatureKind::Property => doc.properties().collect(),
            FeatureKind::Category => doc.categories().collect(),
        };
        check_term_index("feature", &universe, features, |f| f.terms().cloned().collect(), |t| {
            doc.features_by_term(kind, t)
        });
    }

    check_sentence_index("dep", &sentences, doc.deps().collect::<Vec<_>>(), |d| store.term_sentence(d.from().as_str()), |s| {
        doc.deps_by_sentence(s)
    });
    check_sentence_index("chunk", &sentences, doc.chunks().collect::<Vec<_>>(), |c| first_sentence(c.span().targets().to_vec()), |s| {
        doc.chunks_by_sentence(s)
    });
    check_sentence_index("entity", &sentences, doc.entities().collect::<Vec<_>>(), |e| first_sentence(e.terms().cloned().collect()), |s| {
        doc.entities_by_sentence(s)
    });
    check_sentence_index(
        "predicate",
        &sentences,
        doc.predicates().collect::<Vec<_>>(),
        |p| first_sentence(p.span().targets().to_vec()),
        |s| doc.predicates_by_sentence(s),
    );
    check_sentence_index("wf", &sentences, doc.wfs().collect::<Vec<_>>(), |w| Some(w.sent()), |s| doc.wfs_by_sentence(s));
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_round_trip_all_layers() {
    let doc = full_document();
    let text = doc.to_naf_string();
    let back: Document = text.parse().unwrap();

    assert_eq!(back.lang(), "en");
    assert_eq!(back.raw(), doc.raw());
    assert_eq!(back.header, doc.header);
    assert_eq!(back.store().counts(), doc.store().counts());
    assert_layers_eq!(
        doc, back, wfs, terms, deps, chunks, entities, corefs, properties, categories, opinions, relations,
        predicates, trees, timex3s, factualities, linked_entities, ssts, topics, tlinks, clinks,
    );
    assert_eq!(back.marks("coref"), doc.marks("coref"));
    assert_eq!(back.constituency_string(2), doc.constituency_string(2));

    // A second pass is byte-identical.
    assert_eq!(back.to_naf_string(), text);
    assert_eq!(document_hash(&back), document_hash(&doc));
}

#[test]
fn test_indices_agree_with_annotations() {
    let mut doc = full_document();
    assert_indices_consistent(&doc);

    let back: Document = doc.to_naf_string().parse().unwrap();
    assert_indices_consistent(&back);

    doc.new_compound(&[t("t5"), t("t6")], "he_move").unwrap();
    assert_indices_consistent(&doc);

    let first_dep = doc.deps().next().cloned().unwrap();
    let removed = doc
        .remove_annotations(&[
            AnnotationRef::Entity("e1".into()),
            AnnotationRef::Dep(first_dep),
            AnnotationRef::Predicate("pr2".into()),
        ])
        .unwrap();
    assert_eq!(removed, 3);
    assert!(doc.entities_by_term(&t("t1")).is_empty());
    assert_indices_consistent(&doc);
}

#[test]
fn test_round_trip_compact() {
    let doc = full_document();
    let text = doc.to_naf_string_with(&CodecConfig::compact());
    assert!(!text.contains("<!--"));
    let back: Document = text.parse().unwrap();
    assert_eq!(back.store().counts(), doc.store().counts());
}

#[test]
fn test_unknown_section_survives() {
    let src = r#"<?xml version="1.0" encoding="UTF-8"?>
<NAF xml:lang="nl" version="v3">
  <text>
    <wf id="w1" sent="1">Amsterdam</wf>
  </text>
  <terms>
    <term id="t1" lemma="amsterdam">
      <span><target id="w1" /></span>
    </term>
  </terms>
  <locations source="geo"><loc id="l1" lat="52.37" /></locations>
</NAF>"#;
    let doc: Document = src.parse().unwrap();
    let out = doc.to_naf_string();
    assert!(out.contains(r#"<locations source="geo"><loc id="l1" lat="52.37" /></locations>"#));
    let again: Document = out.parse().unwrap();
    assert_eq!(again.store().unknown_layers(), doc.store().unknown_layers());
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_john_loves_mary_dep_path() {
    let doc = john_loves_mary();
    let path = doc.dep_path(&t("t1"), &t("t3")).unwrap();
    let ends: Vec<(&str, &str)> = path.iter().map(|d| (d.from().as_str(), d.to().as_str())).collect();
    assert_eq!(ends, vec![("t2", "t1"), ("t2", "t3")]);

    assert_eq!(doc.engine().render(&t("t1"), &path), "_-a_+b_");
    assert!(doc.match_dep_path(&t("t1"), &path, "-nsubj dobj").unwrap());
    assert!(!doc.match_dep_path(&t("t1"), &path, "nsubj dobj").unwrap());
    assert!(doc.match_dep_path(&t("t1"), &[], "").unwrap());
    assert_eq!(doc.terms_head(&[t("t1"), t("t2"), t("t3")]), Some(t("t2")));
}

#[test]
fn test_split_then_join_reproduces_counts() {
    let mut doc = with_sentences(
        DepPathEngine::shared(),
        &[&["John", "sleeps"], &["Mary", "runs", "fast"]],
    );
    doc.new_dep(&t("t2"), &t("t1"), "nsubj").unwrap();
    doc.new_dep(&t("t4"), &t("t3"), "nsubj").unwrap();
    doc.new_dep(&t("t4"), &t("t5"), "advmod").unwrap();
    doc.new_chunk(tspan(&["t3"])).unwrap();
    doc.new_entity(vec![tspan(&["t1"])]).unwrap();
    doc.new_entity(vec![tspan(&["t3"])]).unwrap();
    doc.new_coref(vec![tspan(&["t3"])]).unwrap();

    let sentence = |n: u32| -> Vec<WfId> { doc.wfs_by_sentence(n).iter().map(|w| w.id().clone()).collect() };
    let mut first = doc.split(&sentence(1)).unwrap();
    let second = doc.split(&sentence(2)).unwrap();
    assert_eq!(second.wfs().count(), 3);
    assert_eq!(second.deps().count(), 2);

    first.join(&second).unwrap();
    assert_eq!(first.store().counts(), doc.store().counts());
    let forms: Vec<String> = first.terms().map(|term| first.term_form(term.id())).collect();
    assert_eq!(forms, vec!["John", "sleeps", "Mary", "runs", "fast"]);
}

#[test]
fn test_split_middle_sentence_and_join_it_back() {
    let mut doc = with_sentences(
        DepPathEngine::shared(),
        &[&["John", "sleeps"], &["Mary", "runs"], &["Bob", "eats", "fish"]],
    );
    doc.new_dep(&t("t2"), &t("t1"), "nsubj").unwrap();
    doc.new_dep(&t("t4"), &t("t3"), "nsubj").unwrap();
    doc.new_dep(&t("t6"), &t("t5"), "nsubj").unwrap();
    doc.new_dep(&t("t6"), &t("t7"), "dobj").unwrap();
    doc.new_entity(vec![tspan(&["t1"])]).unwrap();
    doc.new_entity(vec![tspan(&["t3"])]).unwrap();
    doc.new_entity(vec![tspan(&["t5"])]).unwrap();

    let sentence = |n: u32| -> Vec<WfId> { doc.wfs_by_sentence(n).iter().map(|w| w.id().clone()).collect() };
    let middle = doc.split(&sentence(2)).unwrap();
    let mut outer = doc.split(&[sentence(1), sentence(3)].concat()).unwrap();
    assert_eq!(middle.wfs().map(|w| w.id().as_str()).collect::<Vec<_>>(), vec!["w1", "w2"]);
    assert_eq!(outer.wfs().count(), 5);

    outer.join(&middle).unwrap();
    assert_eq!(outer.store().counts(), doc.store().counts());
    let forms: Vec<&str> = outer.wfs().map(|w| w.form.as_str()).collect();
    assert_eq!(forms, vec!["John", "sleeps", "Bob", "eats", "fish", "Mary", "runs"]);

    // The joined sentence is re-keyed after the ids already in use.
    let joined: Vec<&str> = outer.wfs_by_sentence(2).iter().map(|w| w.id().as_str()).collect();
    assert_eq!(joined, vec!["w6", "w7"]);
    assert_eq!(outer.term_form(&t("t6")), "Mary");
    let dep = outer.dep_to_term(&t("t6")).unwrap();
    assert_eq!((dep.from(), dep.rfunc.as_str()), (&t("t7"), "nsubj"));
    assert_eq!(outer.entities_by_term(&t("t6")).len(), 1);
    assert_indices_consistent(&outer);
}

#[test]
fn test_chunk_removal_is_unsupported() {
    let mut doc = john_loves_mary();
    doc.new_chunk(tspan(&["t1"])).unwrap();
    let before = doc.store().counts();
    let err = doc.remove_annotation(&AnnotationRef::Chunk("c1".into())).unwrap_err();
    assert!(matches!(err, NafError::UnsupportedRemoval { .. }));
    assert!(err.is_recoverable());
    assert_eq!(doc.store().counts(), before);
}

#[test]
fn test_compound_keeps_indices() {
    let mut doc = john_loves_mary();
    doc.new_entity(vec![tspan(&["t3"])]).unwrap();
    let id = doc.new_compound(&[t("t2"), t("t3")], "love_mary").unwrap().id().clone();
    assert_eq!(doc.terms().count(), 2);
    assert_eq!(doc.terms_by_wf("w3")[0].id(), &id);
    assert_eq!(doc.term_form(&id), "loves Mary");

    let back: Document = doc.to_naf_string().parse().unwrap();
    let compound = back.term(id.as_str()).unwrap();
    assert_eq!(compound.components().len(), 2);
    assert_eq!(compound.head_component(), Some(&t("t2")));
}
