//! NAF decoder.
//!
//! Sections are consumed in dependency order (text before terms, terms before
//! everything that points at them, relationals before relations), whatever
//! their position in the file. Every reference is resolved through the
//! document factories, so a dangling target fails the whole load with
//! [`NafError::UnresolvedReference`] and no partial document escapes.

use std::str::FromStr;

use crate::document::{Document, DEFAULT_NAF_VERSION};
use crate::error::{NafError, Result};
use crate::store::UnknownLayer;
use crate::types::{
    ExternalRef, FeatureKind, FileDesc, LinguisticProcessor, OpinionExpression, OpinionHolder, OpinionTarget,
    Public, Relational, Sentiment, Span, TLinkReferable, Term, TermId, Tree, TreeEdge, WfId,
};

use super::xml::{self, Element};

/// Reading stages; a section is read once every earlier stage is done.
const STAGES: &[&[&str]] = &[
    &["nafHeader", "kafHeader", "raw", "text", "terms"],
    &["markables", "deps", "chunks", "entities", "coreferences"],
    &["timeExpressions", "features", "opinions", "srl", "constituency", "constituencyStrings"],
    &["factualitylayer", "linkedEntities", "SSTspans", "topics"],
    &["relations", "temporalRelations", "causalRelations"],
];

fn is_known(name: &str) -> bool {
    STAGES.iter().any(|stage| stage.contains(&name))
}

// ─── attribute helpers ──────────────────────────────────────────────────────

fn owned(el: &Element, key: &str) -> Option<String> {
    el.attr(key).map(str::to_string)
}

fn number<T: FromStr>(el: &Element, key: &str) -> Result<Option<T>> {
    match el.attr(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| NafError::malformed(format!("<{}> has a non-numeric {}=\"{}\"", el.name, key, raw))),
    }
}

fn flag(el: &Element, key: &str, truthy: &str) -> bool {
    el.attr(key).is_some_and(|v| v.eq_ignore_ascii_case(truthy))
}

fn flags(el: &Element) -> Vec<String> {
    el.attr("flags")
        .map(|f| f.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

fn span<T: Clone + PartialEq>(el: &Element, make: impl Fn(&str) -> T) -> Result<Span<T>> {
    let mut out = Span::new();
    for target in el.children_named("target") {
        out.add_target(make(target.req_attr("id")?), flag(target, "head", "yes"));
    }
    Ok(out)
}

fn child_span<T: Clone + PartialEq>(el: &Element, make: impl Fn(&str) -> T) -> Result<Span<T>> {
    match el.child("span") {
        Some(s) => span(s, make),
        None => Ok(Span::new()),
    }
}

fn term_span(el: &Element) -> Result<Span<TermId>> {
    child_span(el, |id: &str| TermId::new(id))
}

fn wf_span(el: &Element) -> Result<Span<WfId>> {
    child_span(el, |id: &str| WfId::new(id))
}

fn external_ref(el: &Element) -> Result<ExternalRef> {
    let mut out = ExternalRef::new(el.attr("resource").unwrap_or_default(), el.req_attr("reference")?);
    out.confidence = number(el, "confidence")?;
    out.source = owned(el, "source");
    if let Some(nested) = el.child("externalRef") {
        out.external_ref = Some(Box::new(external_ref(nested)?));
    }
    Ok(out)
}

fn external_refs(el: &Element) -> Result<Vec<ExternalRef>> {
    match el.child("externalReferences") {
        Some(refs) => refs.children_named("externalRef").map(external_ref).collect(),
        None => Ok(Vec::new()),
    }
}

// ─── decoder ────────────────────────────────────────────────────────────────

/// Decode a NAF document.
pub fn read(src: &str) -> Result<Document> {
    let parsed = xml::parse(src)?;
    let root = &parsed.root;
    if root.name != "NAF" && root.name != "KAF" {
        return Err(NafError::malformed(format!("unexpected root element <{}>", root.name)));
    }
    let lang = root.attr("xml:lang").unwrap_or_default();
    let version = root.attr("version").unwrap_or(DEFAULT_NAF_VERSION);
    let mut doc = Document::new(lang, version);

    for stage in STAGES {
        for section in root.elements().filter(|e| stage.contains(&e.name.as_str())) {
            read_section(&mut doc, section)?;
        }
    }
    for (section, source) in root.elements().zip(&parsed.sections) {
        if !is_known(&section.name) {
            tracing::debug!(layer = %section.name, "Keeping unknown layer verbatim");
            doc.add_unknown_layer(UnknownLayer {
                name: section.name.clone(),
                xml: source.clone(),
            });
        }
    }

    let counts = doc.store().counts();
    tracing::debug!(
        wfs = counts.wfs,
        terms = counts.terms,
        deps = counts.deps,
        entities = counts.entities,
        predicates = counts.predicates,
        unknown = counts.unknown,
        "Decoded NAF document"
    );
    Ok(doc)
}

fn read_section(doc: &mut Document, section: &Element) -> Result<()> {
    match section.name.as_str() {
        "nafHeader" | "kafHeader" => read_header(doc, section),
        "raw" => {
            doc.set_raw(section.text());
            Ok(())
        }
        "text" => read_text(doc, section),
        "terms" => read_terms(doc, section),
        "markables" => read_markables(doc, section),
        "deps" => read_deps(doc, section),
        "chunks" => read_chunks(doc, section),
        "entities" => read_entities(doc, section),
        "coreferences" => read_corefs(doc, section),
        "timeExpressions" => read_timexes(doc, section),
        "features" => read_features(doc, section),
        "opinions" => read_opinions(doc, section),
        "srl" => read_srl(doc, section),
        "constituency" => read_constituency(doc, section),
        "constituencyStrings" => read_constituency_strings(doc, section),
        "factualitylayer" => read_factualities(doc, section),
        "linkedEntities" => read_linked_entities(doc, section),
        "SSTspans" => read_ssts(doc, section),
        "topics" => read_topics(doc, section),
        "relations" => read_relations(doc, section),
        "temporalRelations" => read_tlinks(doc, section),
        "causalRelations" => read_clinks(doc, section),
        _ => Ok(()),
    }
}

fn read_header(doc: &mut Document, el: &Element) -> Result<()> {
    if let Some(fd) = el.child("fileDesc") {
        doc.header.file_desc = Some(FileDesc {
            author: owned(fd, "author"),
            title: owned(fd, "title"),
            filename: owned(fd, "filename"),
            filetype: owned(fd, "filetype"),
            pages: number(fd, "pages")?,
            creationtime: owned(fd, "creationtime"),
        });
    }
    if let Some(public) = el.child("public") {
        doc.header.public = Some(Public {
            public_id: owned(public, "publicId"),
            uri: owned(public, "uri"),
        });
    }
    for group in el.children_named("linguisticProcessors") {
        let layer = group.req_attr("layer")?;
        for lp in group.children_named("lp") {
            let mut processor = LinguisticProcessor::new(lp.req_attr("name")?);
            processor.version = owned(lp, "version");
            processor.timestamp = owned(lp, "timestamp");
            processor.begin_timestamp = owned(lp, "beginTimestamp");
            processor.end_timestamp = owned(lp, "endTimestamp");
            doc.header.add_processor(layer, processor);
        }
    }
    Ok(())
}

fn read_text(doc: &mut Document, el: &Element) -> Result<()> {
    for w in el.children_named("wf") {
        let id = w
            .attr_any(&["id", "wid"])
            .ok_or_else(|| NafError::malformed("<wf> is missing attribute 'id'"))?;
        let sent = number(w, "sent")?.unwrap_or(0);
        let wf = doc.load_wf(id, w.text(), sent)?;
        wf.page = number(w, "page")?;
        wf.offset = number(w, "offset")?;
        wf.length = number(w, "length")?;
        wf.xpath = owned(w, "xpath");
        if let Some(para) = number(w, "para")? {
            doc.set_wf_para(id, para)?;
        }
    }
    Ok(())
}

fn term_attrs(term: &mut Term, el: &Element) -> Result<()> {
    term.term_type = owned(el, "type");
    term.lemma = owned(el, "lemma");
    term.pos = owned(el, "pos");
    term.morphofeat = owned(el, "morphofeat");
    term.case = owned(el, "case");
    term.supersense = owned(el, "supersense");
    term.wordnet = owned(el, "wordnet");
    term.bbn = owned(el, "bbn");
    term.sentiment = el.child("sentiment").map(|s| Sentiment {
        resource: owned(s, "resource"),
        polarity: owned(s, "polarity"),
        strength: owned(s, "strength"),
        subjectivity: owned(s, "subjectivity"),
        sentiment_semantic_type: owned(s, "sentiment_semantic_type"),
        sentiment_modifier: owned(s, "sentiment_modifier"),
        sentiment_marker: owned(s, "sentiment_marker"),
        sentiment_product_feature: owned(s, "sentiment_product_feature"),
    });
    term.external_refs = external_refs(el)?;
    Ok(())
}

fn read_terms(doc: &mut Document, el: &Element) -> Result<()> {
    for t in el.children_named("term") {
        let id = t
            .attr_any(&["id", "tid"])
            .ok_or_else(|| NafError::malformed("<term> is missing attribute 'id'"))?;
        let wfs = wf_span(t)?;
        if wfs.is_empty() {
            return Err(NafError::malformed(format!("term {} has an empty span", id)));
        }
        let mut term = Term::new(TermId::new(id), wfs, false);
        term_attrs(&mut term, t)?;

        let head = t.attr("head");
        for c in t.children_named("component") {
            let cid = c.req_attr("id")?;
            let mut component = Term::new(TermId::new(cid), wf_span(c)?, true);
            term_attrs(&mut component, c)?;
            term.add_component(component, head == Some(cid));
        }
        if let Some(head) = head {
            if term.component(head).is_none() {
                return Err(NafError::malformed(format!("term {} has head {} which is not a component", id, head)));
            }
        }
        doc.insert_term(term, None)?;
    }
    Ok(())
}

fn read_markables(doc: &mut Document, el: &Element) -> Result<()> {
    let source = el.attr("source").unwrap_or_default();
    for m in el.children_named("mark") {
        let external = external_refs(m)?;
        let mark = doc.load_mark(source, m.req_attr("id")?, term_span(m)?)?;
        mark.mark_type = owned(m, "type");
        mark.lemma = owned(m, "lemma");
        mark.pos = owned(m, "pos");
        mark.morphofeat = owned(m, "morphofeat");
        mark.case = owned(m, "case");
        mark.external_refs = external;
    }
    Ok(())
}

fn read_deps(doc: &mut Document, el: &Element) -> Result<()> {
    for d in el.children_named("dep") {
        let from = TermId::new(d.req_attr("from")?);
        let to = TermId::new(d.req_attr("to")?);
        let dep = doc.new_dep(&from, &to, d.req_attr("rfunc")?)?;
        dep.case = owned(d, "case");
    }
    Ok(())
}

fn read_chunks(doc: &mut Document, el: &Element) -> Result<()> {
    for c in el.children_named("chunk") {
        let id = c.req_attr("id")?;
        let head = TermId::new(c.req_attr("head")?);
        let mut span = term_span(c)?;
        if !span.has_target(&head) {
            return Err(NafError::malformed(format!("chunk {} has head {} outside its span", id, head)));
        }
        span.clear_heads();
        span.set_head(head);
        let chunk = doc.load_chunk(id, span)?;
        chunk.phrase = owned(c, "phrase");
        chunk.case = owned(c, "case");
    }
    Ok(())
}

fn reference_spans(el: &Element) -> Result<Vec<Span<TermId>>> {
    match el.child("references") {
        Some(refs) => refs.children_named("span").map(|s| span(s, |id: &str| TermId::new(id))).collect(),
        None => Ok(Vec::new()),
    }
}

fn read_entities(doc: &mut Document, el: &Element) -> Result<()> {
    for e in el.children_named("entity") {
        let external = external_refs(e)?;
        let entity = doc.load_entity(e.req_attr("id")?, reference_spans(e)?)?;
        entity.entity_type = owned(e, "type");
        entity.named = !flag(e, "unnamed", "yes");
        entity.external_refs = external;
    }
    Ok(())
}

fn read_corefs(doc: &mut Document, el: &Element) -> Result<()> {
    for c in el.children_named("coref") {
        let mentions = c.children_named("span").map(|s| span(s, |id: &str| TermId::new(id))).collect::<Result<Vec<_>>>()?;
        let external = external_refs(c)?;
        let coref = doc.load_coref(c.req_attr("id")?, mentions)?;
        coref.coref_type = owned(c, "type");
        coref.cluster = owned(c, "cluster");
        coref.external_refs = external;
    }
    Ok(())
}

fn read_timexes(doc: &mut Document, el: &Element) -> Result<()> {
    let mut points = Vec::new();
    for t in el.children_named("timex3") {
        let id = t.req_attr("id")?;
        let span = match t.child("span") {
            Some(s) => Some(span(s, |id: &str| WfId::new(id))?),
            None => None,
        };
        let timex = doc.load_timex3(id, t.req_attr("type")?, span)?;
        timex.begin_point = owned(t, "beginPoint");
        timex.end_point = owned(t, "endPoint");
        timex.quant = owned(t, "quant");
        timex.freq = owned(t, "freq");
        timex.function_in_document = owned(t, "functionInDocument");
        timex.temporal_function = t.attr("temporalFunction").map(|v| v.eq_ignore_ascii_case("true"));
        timex.value = owned(t, "value");
        timex.value_from_function = owned(t, "valueFromFunction");
        timex.modifier = owned(t, "mod");
        timex.anchor_time_id = t.attr_any(&["anchorTimeId", "anchorTimeID"]).map(str::to_string);
        timex.comment = owned(t, "comment");
        for point in [&timex.begin_point, &timex.end_point].into_iter().flatten() {
            points.push((id.to_string(), point.clone()));
        }
    }
    for (id, point) in points {
        if doc.timex3(&point).is_none() {
            return Err(NafError::unresolved(format!("timex3 {}", id), point));
        }
    }
    Ok(())
}

fn read_features(doc: &mut Document, el: &Element) -> Result<()> {
    let groups = [
        ("properties", "property", FeatureKind::Property),
        ("categories", "category", FeatureKind::Category),
    ];
    for (group, item, kind) in groups {
        for f in el.children_named(group).flat_map(|g| g.children_named(item)) {
            let external = external_refs(f)?;
            let feature = doc.load_feature(kind, f.req_attr("id")?, f.req_attr("lemma")?, reference_spans(f)?)?;
            feature.external_refs = external;
        }
    }
    Ok(())
}

fn read_opinions(doc: &mut Document, el: &Element) -> Result<()> {
    for o in el.children_named("opinion") {
        let id = o
            .attr_any(&["id", "oid"])
            .ok_or_else(|| NafError::malformed("<opinion> is missing attribute 'id'"))?;
        let external = external_refs(o)?;
        let opinion = doc.load_opinion(id)?;
        opinion.label = owned(o, "label");
        opinion.external_refs = external;

        if let Some(h) = o.child("opinion_holder") {
            let mut holder = OpinionHolder::new(term_span(h)?);
            holder.holder_type = owned(h, "type");
            holder.external_refs = external_refs(h)?;
            doc.set_opinion_holder(id, Some(holder))?;
        }
        if let Some(t) = o.child("opinion_target") {
            let mut target = OpinionTarget::new(term_span(t)?);
            target.target_type = owned(t, "type");
            target.external_refs = external_refs(t)?;
            doc.set_opinion_target(id, Some(target))?;
        }
        if let Some(e) = o.child("opinion_expression") {
            let mut expression = OpinionExpression::new(term_span(e)?);
            expression.polarity = owned(e, "polarity");
            expression.strength = owned(e, "strength");
            expression.subjectivity = owned(e, "subjectivity");
            expression.sentiment_semantic_type = owned(e, "sentiment_semantic_type");
            expression.sentiment_product_feature = owned(e, "sentiment_product_feature");
            expression.external_refs = external_refs(e)?;
            doc.set_opinion_expression(id, Some(expression))?;
        }
    }
    Ok(())
}

fn read_srl(doc: &mut Document, el: &Element) -> Result<()> {
    for p in el.children_named("predicate") {
        let id = p.req_attr("id")?;
        let external = external_refs(p)?;
        let predicate = doc.load_predicate(id, term_span(p)?)?;
        predicate.uri = owned(p, "uri");
        predicate.source = owned(p, "source");
        predicate.confidence = number(p, "confidence")?;
        predicate.flags = flags(p);
        predicate.external_refs = external;
        for r in p.children_named("role") {
            let external = external_refs(r)?;
            let role = doc.load_role(id, r.req_attr("id")?, r.req_attr("semRole")?, term_span(r)?)?;
            role.flags = flags(r);
            role.external_refs = external;
        }
    }
    Ok(())
}

fn read_constituency(doc: &mut Document, el: &Element) -> Result<()> {
    for t in el.children_named("tree") {
        let sentence = number(t, "sentence")?;
        let nonterminals = t
            .children_named("nt")
            .map(|nt| Ok((nt.req_attr("id")?.to_string(), nt.req_attr("label")?.to_string())))
            .collect::<Result<Vec<_>>>()?;
        let terminals = t
            .children_named("t")
            .map(|term| Ok((term.req_attr("id")?.to_string(), term_span(term)?)))
            .collect::<Result<Vec<_>>>()?;
        let edges = t
            .children_named("edge")
            .map(|e| {
                Ok(TreeEdge {
                    id: e.attr("id"),
                    from: e.req_attr("from")?,
                    to: e.req_attr("to")?,
                    head: flag(e, "head", "yes"),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if nonterminals.is_empty() {
            continue;
        }
        let tree = Tree::assemble(sentence, nonterminals, terminals, &edges)?;
        doc.load_tree(tree.sentence(), tree.root().clone())?;
    }
    Ok(())
}

fn read_constituency_strings(doc: &mut Document, el: &Element) -> Result<()> {
    for t in el.children_named("tree") {
        let sentence = number(t, "sentence")?
            .ok_or_else(|| NafError::malformed("<tree> is missing attribute 'sentence'"))?;
        doc.add_constituency_string(sentence, t.text());
    }
    Ok(())
}

fn read_factualities(doc: &mut Document, el: &Element) -> Result<()> {
    for f in el.children_named("factvalue") {
        let wf = f.req_attr("id")?;
        if doc.wf(wf).is_none() {
            return Err(NafError::unresolved("factvalue", wf));
        }
        let Some(term) = doc.terms_by_wf(wf).first().map(|t| t.id().clone()) else {
            tracing::warn!(wf = %wf, "Skipping factuality over a word form without term");
            continue;
        };
        let factuality = doc.load_factuality(WfId::new(wf), &term)?;
        for part in f.children_named("factuality") {
            factuality.add_part(part.req_attr("prediction")?, number(part, "confidence")?);
        }
        if factuality.parts.is_empty() {
            if let Some(prediction) = f.attr("prediction") {
                factuality.add_part(prediction, number(f, "confidence")?);
            }
        }
    }
    Ok(())
}

fn read_linked_entities(doc: &mut Document, el: &Element) -> Result<()> {
    for l in el.children_named("linkedEntity") {
        let entity = doc.load_linked_entity(l.req_attr("id")?, wf_span(l)?)?;
        entity.resource = owned(l, "resource");
        entity.reference = owned(l, "reference");
        entity.confidence = number(l, "confidence")?;
        entity.spotted = flag(l, "spotted", "true");
        for ty in l.children_named("types").flat_map(|t| t.children_named("type")) {
            entity.add_type(ty.req_attr("source")?, ty.req_attr("label")?);
        }
    }
    Ok(())
}

fn read_ssts(doc: &mut Document, el: &Element) -> Result<()> {
    for s in el.children_named("sst") {
        let external = external_refs(s)?;
        let sst = doc.load_sst(s.req_attr("id")?, term_span(s)?)?;
        sst.sst_type = owned(s, "type");
        sst.label = owned(s, "label");
        sst.external_refs = external;
    }
    Ok(())
}

fn read_topics(doc: &mut Document, el: &Element) -> Result<()> {
    for t in el.children_named("topic") {
        let label = owned(t, "label").unwrap_or_else(|| t.text());
        let topic = doc.new_topic(label)?;
        topic.probability = number(t, "probability")?;
    }
    Ok(())
}

fn read_relations(doc: &mut Document, el: &Element) -> Result<()> {
    for r in el.children_named("relation") {
        let id = r.req_attr("id")?;
        let resolve = |key: &str| -> Result<Relational> {
            let target = r.req_attr(key)?;
            doc.relational(target)
                .ok_or_else(|| NafError::unresolved(format!("relation {}", id), target))
        };
        let from = resolve("from")?;
        let to = resolve("to")?;
        let relation = doc.load_relation(id, from, to)?;
        if let Some(confidence) = number(r, "confidence")? {
            relation.set_confidence(confidence)?;
        }
    }
    Ok(())
}

fn referable(el: &Element, id_key: &str, type_key: &str) -> Result<TLinkReferable> {
    let id = el.req_attr(id_key)?.to_string();
    match el.req_attr(type_key)? {
        "event" => Ok(TLinkReferable::Event(id)),
        "timex" => Ok(TLinkReferable::Timex(id)),
        other => Err(NafError::malformed(format!("<{}> has unknown {}=\"{}\"", el.name, type_key, other))),
    }
}

fn read_tlinks(doc: &mut Document, el: &Element) -> Result<()> {
    for t in el.children_named("tlink") {
        let from = referable(t, "from", "fromType")?;
        let to = referable(t, "to", "toType")?;
        doc.load_tlink(t.req_attr("id")?, from, to, t.req_attr("relType")?)?;
    }
    Ok(())
}

fn read_clinks(doc: &mut Document, el: &Element) -> Result<()> {
    for c in el.children_named("clink") {
        let clink = doc.load_clink(c.req_attr("id")?, c.req_attr("from")?, c.req_attr("to")?)?;
        clink.rel_type = owned(c, "relType");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<NAF xml:lang="en" version="v3">
  <kafHeader>
    <fileDesc title="demo" pages="1" />
    <linguisticProcessors layer="terms">
      <lp name="tagger" version="1.0" timestamp="2024-01-01T00:00:00Z" />
    </linguisticProcessors>
  </kafHeader>
  <deps>
    <dep from="t2" to="t1" rfunc="nsubj" />
  </deps>
  <text>
    <wf wid="w1" sent="1" para="1" offset="0" length="4">John</wf>
    <wf id="w2" sent="1" offset="5" length="6">sleeps</wf>
  </text>
  <terms>
    <term tid="t1" lemma="John" pos="R"><span><target id="w1" /></span></term>
    <term id="t2" lemma="sleep" pos="V"><span><target id="w2" /></span></term>
  </terms>
  <locations><loc id="l1" /></locations>
</NAF>"#;

    #[test]
    fn test_sections_are_read_in_dependency_order() {
        let doc = read(SAMPLE).unwrap();
        assert_eq!(doc.lang(), "en");
        assert_eq!(doc.wfs().count(), 2);
        assert_eq!(doc.wf("w1").unwrap().para(), Some(1));
        assert_eq!(doc.term("t1").unwrap().lemma.as_deref(), Some("John"));
        assert_eq!(doc.deps().count(), 1);
        assert!(doc.linguistic_processor_exists("terms", "tagger", Some("1.0")));
        assert_eq!(doc.header.file_desc.as_ref().and_then(|f| f.pages), Some(1));
    }

    #[test]
    fn test_unknown_layers_are_kept_verbatim() {
        let doc = read(SAMPLE).unwrap();
        let unknown = doc.store().unknown_layers();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].name, "locations");
        assert_eq!(unknown[0].xml, r#"<locations><loc id="l1" /></locations>"#);
    }

    #[test]
    fn test_unresolved_target_fails_the_load() {
        let src = SAMPLE.replace(r#"to="t1""#, r#"to="t9""#);
        let err = read(&src).unwrap_err();
        assert!(matches!(err, NafError::UnresolvedReference { ref id, .. } if id == "t9"));
    }

    #[test]
    fn test_missing_attribute_is_malformed() {
        let src = SAMPLE.replace(r#" rfunc="nsubj""#, "");
        assert!(matches!(read(&src), Err(NafError::MalformedInput(_))));
    }

    #[test]
    fn test_chunk_head_must_be_in_span() {
        let src = SAMPLE.replace(
            "</terms>",
            r#"</terms><chunks><chunk id="c1" head="t2" phrase="NP"><span><target id="t1" /></span></chunk></chunks>"#,
        );
        assert!(matches!(read(&src), Err(NafError::MalformedInput(_))));
    }

    #[test]
    fn test_forward_timex_points_resolve() {
        let src = SAMPLE.replace(
            "</terms>",
            r#"</terms><timeExpressions>
                 <timex3 id="tmx1" type="DURATION" beginPoint="tmx2" />
                 <timex3 id="tmx2" type="DATE" value="2024" />
               </timeExpressions>"#,
        );
        let doc = read(&src).unwrap();
        assert_eq!(doc.timex3("tmx1").unwrap().begin_point.as_deref(), Some("tmx2"));

        let broken = src.replace(r#"beginPoint="tmx2""#, r#"beginPoint="tmx7""#);
        assert!(matches!(read(&broken), Err(NafError::UnresolvedReference { .. })));
    }
}
