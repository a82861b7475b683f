//! NAF encoder.
//!
//! One section per non-empty layer, in a fixed order, with optional
//! surface-string comments next to the annotations they describe. Sections kept
//! verbatim by the reader are appended last, in load order.

use std::fmt::Display;

use crate::document::Document;
use crate::types::tree::id_number;
use crate::types::{
    ExternalRef, FeatureKind, LinguisticProcessor, Span, Term, TermId, Tree, TreeNode, WfId,
};

use super::xml::{self, Element, Node};
use super::CodecConfig;

/// Make `text` safe inside `<!-- -->`: trimmed, dash runs collapsed, no
/// trailing dash.
pub fn sanitize_comment(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.push(ch);
    }
    if out.ends_with('-') {
        out.push_str(" .");
    }
    out
}

struct Writer<'a> {
    doc: &'a Document,
    comments: bool,
}

fn span_element<T: Clone + PartialEq + Display>(span: &Span<T>) -> Element {
    let mut el = Element::new("span");
    for target in span.targets() {
        let mut t = Element::new("target").with_attr("id", target.to_string());
        if span.is_head(target) {
            t.set_attr("head", "yes");
        }
        el.push(t);
    }
    el
}

fn external_ref_element(r: &ExternalRef) -> Element {
    let mut el = Element::new("externalRef")
        .with_attr("resource", r.resource.as_str())
        .with_attr("reference", r.reference.as_str());
    el.set_opt_attr("confidence", r.confidence);
    el.set_opt_attr("source", r.source.as_deref());
    if let Some(nested) = &r.external_ref {
        el.push(external_ref_element(nested));
    }
    el
}

fn push_external_refs(el: &mut Element, refs: &[ExternalRef]) {
    if refs.is_empty() {
        return;
    }
    let mut block = Element::new("externalReferences");
    for r in refs {
        block.push(external_ref_element(r));
    }
    el.push(block);
}

fn flags_attr(el: &mut Element, flags: &[String]) {
    if !flags.is_empty() {
        el.set_attr("flags", flags.join(","));
    }
}

fn processor_element(lp: &LinguisticProcessor) -> Element {
    let mut el = Element::new("lp").with_attr("name", lp.name.as_str());
    el.set_opt_attr("version", lp.version.as_deref());
    el.set_opt_attr("timestamp", lp.timestamp.as_deref());
    el.set_opt_attr("beginTimestamp", lp.begin_timestamp.as_deref());
    el.set_opt_attr("endTimestamp", lp.end_timestamp.as_deref());
    el
}

fn section_if(el: Element) -> Option<Element> {
    (!el.children.is_empty()).then_some(el)
}

/// Encode `doc` as NAF XML.
pub fn write(doc: &Document, config: &CodecConfig) -> String {
    let w = Writer {
        doc,
        comments: config.emit_comments,
    };
    let mut root = Element::new("NAF")
        .with_attr("xml:lang", doc.lang())
        .with_attr("version", doc.version());

    let sections = [
        w.header(),
        w.raw(),
        w.text(),
        w.terms(),
    ];
    for section in sections.into_iter().flatten() {
        root.push(section);
    }
    for section in w.markables() {
        root.push(section);
    }
    let sections = [
        w.deps(),
        w.chunks(),
        w.entities(),
        w.corefs(),
        w.timexes(),
        w.factualities(),
        w.linked_entities(),
        w.ssts(),
        w.topics(),
        w.features(),
        w.opinions(),
        w.relations(),
        w.srl(),
        w.constituency_strings(),
        w.constituency(),
        w.tlinks(),
        w.clinks(),
    ];
    for section in sections.into_iter().flatten() {
        root.push(section);
    }
    for unknown in doc.store().unknown_layers() {
        root.push_node(Node::Raw(unknown.xml.clone()));
    }

    let out = xml::to_string(&root, config.indent);
    tracing::debug!(bytes = out.len(), sections = root.children.len(), "Encoded NAF document");
    out
}

impl Writer<'_> {
    fn comment(&self, el: &mut Element, text: impl AsRef<str>) {
        if self.comments {
            el.push_node(Node::Comment(sanitize_comment(text.as_ref())));
        }
    }

    fn term_span(&self, el: &mut Element, span: &Span<TermId>) {
        self.comment(el, self.doc.span_str(span));
        el.push(span_element(span));
    }

    fn wf_span(&self, el: &mut Element, span: &Span<WfId>) {
        self.comment(el, self.doc.wf_span_str(span));
        el.push(span_element(span));
    }

    // ─── header, raw, text, terms ───────────────────────────────────────────

    fn header(&self) -> Option<Element> {
        let header = &self.doc.header;
        let mut el = Element::new("nafHeader");
        if let Some(fd) = &header.file_desc {
            let mut f = Element::new("fileDesc");
            f.set_opt_attr("author", fd.author.as_deref());
            f.set_opt_attr("title", fd.title.as_deref());
            f.set_opt_attr("filename", fd.filename.as_deref());
            f.set_opt_attr("filetype", fd.filetype.as_deref());
            f.set_opt_attr("pages", fd.pages);
            f.set_opt_attr("creationtime", fd.creationtime.as_deref());
            el.push(f);
        }
        if let Some(public) = &header.public {
            let mut p = Element::new("public");
            p.set_opt_attr("publicId", public.public_id.as_deref());
            p.set_opt_attr("uri", public.uri.as_deref());
            el.push(p);
        }
        for group in header.processor_groups() {
            let mut g = Element::new("linguisticProcessors").with_attr("layer", group.layer.as_str());
            for lp in &group.processors {
                g.push(processor_element(lp));
            }
            el.push(g);
        }
        section_if(el)
    }

    fn raw(&self) -> Option<Element> {
        if self.doc.raw().is_empty() {
            return None;
        }
        let mut el = Element::new("raw");
        el.push_node(Node::CData(self.doc.raw().to_string()));
        Some(el)
    }

    fn text(&self) -> Option<Element> {
        let mut el = Element::new("text");
        for wf in self.doc.wfs() {
            let mut w = Element::new("wf")
                .with_attr("id", wf.id().as_str())
                .with_attr("sent", wf.sent().to_string());
            w.set_opt_attr("para", wf.para());
            w.set_opt_attr("page", wf.page);
            w.set_opt_attr("offset", wf.offset);
            w.set_opt_attr("length", wf.length);
            w.set_opt_attr("xpath", wf.xpath.as_deref());
            if !wf.form.is_empty() {
                w.push_node(Node::Text(wf.form.clone()));
            }
            el.push(w);
        }
        section_if(el)
    }

    fn term_element(&self, name: &str, term: &Term) -> Element {
        let mut t = Element::new(name).with_attr("id", term.id().as_str());
        t.set_opt_attr("type", term.term_type.as_deref());
        t.set_opt_attr("lemma", term.lemma.as_deref());
        t.set_opt_attr("supersense", term.supersense.as_deref());
        t.set_opt_attr("wordnet", term.wordnet.as_deref());
        t.set_opt_attr("bbn", term.bbn.as_deref());
        t.set_opt_attr("pos", term.pos.as_deref());
        t.set_opt_attr("morphofeat", term.morphofeat.as_deref());
        t.set_opt_attr("head", term.head_component().map(TermId::as_str));
        t.set_opt_attr("case", term.case.as_deref());
        if let Some(s) = &term.sentiment {
            let mut el = Element::new("sentiment");
            el.set_opt_attr("resource", s.resource.as_deref());
            el.set_opt_attr("polarity", s.polarity.as_deref());
            el.set_opt_attr("strength", s.strength.as_deref());
            el.set_opt_attr("subjectivity", s.subjectivity.as_deref());
            el.set_opt_attr("sentiment_semantic_type", s.sentiment_semantic_type.as_deref());
            el.set_opt_attr("sentiment_modifier", s.sentiment_modifier.as_deref());
            el.set_opt_attr("sentiment_marker", s.sentiment_marker.as_deref());
            el.set_opt_attr("sentiment_product_feature", s.sentiment_product_feature.as_deref());
            t.push(el);
        }
        t.push(span_element(term.span()));
        for component in term.components() {
            t.push(self.term_element("component", component));
        }
        push_external_refs(&mut t, &term.external_refs);
        t
    }

    fn terms(&self) -> Option<Element> {
        let mut el = Element::new("terms");
        for term in self.doc.terms() {
            self.comment(&mut el, self.doc.term_str(term.id()));
            el.push(self.term_element("term", term));
        }
        section_if(el)
    }

    // ─── syntax ─────────────────────────────────────────────────────────────

    fn markables(&self) -> Vec<Element> {
        let store = self.doc.store();
        let mut out = Vec::new();
        for source in store.mark_sources() {
            let mut el = Element::new("markables");
            if !source.is_empty() {
                el.set_attr("source", source);
            }
            for mark in self.doc.marks(source) {
                let mut m = Element::new("mark").with_attr("id", mark.id());
                m.set_opt_attr("type", mark.mark_type.as_deref());
                m.set_opt_attr("lemma", mark.lemma.as_deref());
                m.set_opt_attr("pos", mark.pos.as_deref());
                m.set_opt_attr("morphofeat", mark.morphofeat.as_deref());
                m.set_opt_attr("case", mark.case.as_deref());
                self.term_span(&mut m, mark.span());
                push_external_refs(&mut m, &mark.external_refs);
                el.push(m);
            }
            out.extend(section_if(el));
        }
        out
    }

    fn deps(&self) -> Option<Element> {
        let mut el = Element::new("deps");
        for dep in self.doc.deps() {
            self.comment(&mut el, self.doc.dep_str(dep));
            let mut d = Element::new("dep")
                .with_attr("from", dep.from().as_str())
                .with_attr("to", dep.to().as_str())
                .with_attr("rfunc", dep.rfunc.as_str());
            d.set_opt_attr("case", dep.case.as_deref());
            el.push(d);
        }
        section_if(el)
    }

    fn chunks(&self) -> Option<Element> {
        let mut el = Element::new("chunks");
        for chunk in self.doc.chunks() {
            let mut c = Element::new("chunk").with_attr("id", chunk.id());
            c.set_opt_attr("head", chunk.head().or(chunk.span().first()).map(TermId::as_str));
            c.set_opt_attr("phrase", chunk.phrase.as_deref());
            c.set_opt_attr("case", chunk.case.as_deref());
            self.term_span(&mut c, chunk.span());
            el.push(c);
        }
        section_if(el)
    }

    // ─── entities and coreference ───────────────────────────────────────────

    fn references(&self, el: &mut Element, spans: &[Span<TermId>]) {
        let mut refs = Element::new("references");
        for span in spans {
            self.term_span(&mut refs, span);
        }
        el.push(refs);
    }

    fn entities(&self) -> Option<Element> {
        let mut el = Element::new("entities");
        for entity in self.doc.entities() {
            let mut e = Element::new("entity").with_attr("id", entity.id());
            e.set_opt_attr("type", entity.entity_type.as_deref());
            if !entity.named {
                e.set_attr("unnamed", "yes");
            }
            self.references(&mut e, entity.references());
            push_external_refs(&mut e, &entity.external_refs);
            el.push(e);
        }
        section_if(el)
    }

    fn corefs(&self) -> Option<Element> {
        let mut el = Element::new("coreferences");
        for coref in self.doc.corefs() {
            let mut c = Element::new("coref").with_attr("id", coref.id());
            c.set_opt_attr("type", coref.coref_type.as_deref());
            c.set_opt_attr("cluster", coref.cluster.as_deref());
            for mention in coref.mentions() {
                self.term_span(&mut c, mention);
            }
            push_external_refs(&mut c, &coref.external_refs);
            el.push(c);
        }
        section_if(el)
    }

    // ─── temporal and word-form layers ──────────────────────────────────────

    fn timexes(&self) -> Option<Element> {
        let mut el = Element::new("timeExpressions");
        for timex in self.doc.timex3s() {
            let mut t = Element::new("timex3")
                .with_attr("id", timex.id())
                .with_attr("type", timex.timex_type.as_str());
            t.set_opt_attr("beginPoint", timex.begin_point.as_deref());
            t.set_opt_attr("endPoint", timex.end_point.as_deref());
            t.set_opt_attr("quant", timex.quant.as_deref());
            t.set_opt_attr("freq", timex.freq.as_deref());
            t.set_opt_attr("functionInDocument", timex.function_in_document.as_deref());
            t.set_opt_attr("temporalFunction", timex.temporal_function);
            t.set_opt_attr("value", timex.value.as_deref());
            t.set_opt_attr("valueFromFunction", timex.value_from_function.as_deref());
            t.set_opt_attr("mod", timex.modifier.as_deref());
            t.set_opt_attr("anchorTimeId", timex.anchor_time_id.as_deref());
            t.set_opt_attr("comment", timex.comment.as_deref());
            if let Some(span) = timex.span() {
                self.wf_span(&mut t, span);
            }
            el.push(t);
        }
        section_if(el)
    }

    fn factualities(&self) -> Option<Element> {
        let mut el = Element::new("factualitylayer");
        for fact in self.doc.factualities() {
            let mut f = Element::new("factvalue").with_attr("id", fact.id());
            if let Some(best) = fact.max_part() {
                f.set_attr("prediction", best.prediction.as_str());
                f.set_opt_attr("confidence", best.confidence);
            }
            for part in &fact.parts {
                let mut p = Element::new("factuality").with_attr("prediction", part.prediction.as_str());
                p.set_opt_attr("confidence", part.confidence);
                f.push(p);
            }
            el.push(f);
        }
        section_if(el)
    }

    fn linked_entities(&self) -> Option<Element> {
        let mut el = Element::new("linkedEntities");
        for entity in self.doc.linked_entities() {
            let mut l = Element::new("linkedEntity").with_attr("id", entity.id());
            l.set_opt_attr("resource", entity.resource.as_deref());
            l.set_opt_attr("reference", entity.reference.as_deref());
            l.set_opt_attr("confidence", entity.confidence);
            if entity.spotted {
                l.set_attr("spotted", "true");
            }
            self.wf_span(&mut l, entity.span());
            if !entity.types().is_empty() {
                let mut types = Element::new("types");
                for (source, labels) in entity.types() {
                    for label in labels {
                        types.push(
                            Element::new("type")
                                .with_attr("source", source.as_str())
                                .with_attr("label", label.as_str()),
                        );
                    }
                }
                l.push(types);
            }
            el.push(l);
        }
        section_if(el)
    }

    fn ssts(&self) -> Option<Element> {
        let mut el = Element::new("SSTspans");
        for sst in self.doc.ssts() {
            let mut s = Element::new("sst").with_attr("id", sst.id());
            s.set_opt_attr("type", sst.sst_type.as_deref());
            s.set_opt_attr("label", sst.label.as_deref());
            self.term_span(&mut s, sst.span());
            push_external_refs(&mut s, &sst.external_refs);
            el.push(s);
        }
        section_if(el)
    }

    fn topics(&self) -> Option<Element> {
        let mut el = Element::new("topics");
        for topic in self.doc.topics() {
            let mut t = Element::new("topic");
            t.set_opt_attr("probability", topic.probability);
            t.push_node(Node::Text(topic.label.clone()));
            el.push(t);
        }
        section_if(el)
    }

    // ─── features, opinions, relations ──────────────────────────────────────

    fn features(&self) -> Option<Element> {
        let mut el = Element::new("features");
        let groups = [
            ("properties", "property", FeatureKind::Property),
            ("categories", "category", FeatureKind::Category),
        ];
        for (group, item, kind) in groups {
            let mut g = Element::new(group);
            for feature in self.doc.store().features(kind).iter() {
                let mut f = Element::new(item)
                    .with_attr("id", feature.id())
                    .with_attr("lemma", feature.lemma.as_str());
                self.references(&mut f, feature.references());
                push_external_refs(&mut f, &feature.external_refs);
                g.push(f);
            }
            el.children.extend(section_if(g).map(Node::Element));
        }
        section_if(el)
    }

    fn opinions(&self) -> Option<Element> {
        let mut el = Element::new("opinions");
        for opinion in self.doc.opinions() {
            let mut o = Element::new("opinion").with_attr("id", opinion.id());
            o.set_opt_attr("label", opinion.label.as_deref());
            push_external_refs(&mut o, &opinion.external_refs);
            if let Some(holder) = opinion.holder() {
                let mut h = Element::new("opinion_holder");
                h.set_opt_attr("type", holder.holder_type.as_deref());
                self.term_span(&mut h, &holder.span);
                push_external_refs(&mut h, &holder.external_refs);
                o.push(h);
            }
            if let Some(target) = opinion.target() {
                let mut t = Element::new("opinion_target");
                t.set_opt_attr("type", target.target_type.as_deref());
                self.term_span(&mut t, &target.span);
                push_external_refs(&mut t, &target.external_refs);
                o.push(t);
            }
            if let Some(expression) = opinion.expression() {
                let mut e = Element::new("opinion_expression");
                e.set_opt_attr("polarity", expression.polarity.as_deref());
                e.set_opt_attr("strength", expression.strength.as_deref());
                e.set_opt_attr("subjectivity", expression.subjectivity.as_deref());
                e.set_opt_attr("sentiment_semantic_type", expression.sentiment_semantic_type.as_deref());
                e.set_opt_attr("sentiment_product_feature", expression.sentiment_product_feature.as_deref());
                self.term_span(&mut e, &expression.span);
                push_external_refs(&mut e, &expression.external_refs);
                o.push(e);
            }
            el.push(o);
        }
        section_if(el)
    }

    fn relations(&self) -> Option<Element> {
        let mut el = Element::new("relations");
        for relation in self.doc.relations() {
            let note = match relation.confidence() {
                Some(c) => format!("({}, {}) [{}]", relation.from(), relation.to(), c),
                None => format!("({}, {})", relation.from(), relation.to()),
            };
            self.comment(&mut el, note);
            let mut r = Element::new("relation")
                .with_attr("id", relation.id())
                .with_attr("from", relation.from().id())
                .with_attr("to", relation.to().id());
            r.set_opt_attr("confidence", relation.confidence());
            el.push(r);
        }
        section_if(el)
    }

    // ─── srl ────────────────────────────────────────────────────────────────

    fn srl(&self) -> Option<Element> {
        let mut el = Element::new("srl");
        for predicate in self.doc.predicates() {
            let roles: Vec<String> = predicate
                .roles()
                .iter()
                .map(|r| format!("{}[{} {}]", r.sem_role, r.id(), self.doc.span_str(r.span())))
                .collect();
            self.comment(
                &mut el,
                format!("{} {} : {}", predicate.id(), self.doc.span_str(predicate.span()), roles.join(" ")),
            );
            let mut p = Element::new("predicate").with_attr("id", predicate.id());
            p.set_opt_attr("source", predicate.source.as_deref());
            p.set_opt_attr("uri", predicate.uri.as_deref());
            p.set_opt_attr("confidence", predicate.confidence);
            flags_attr(&mut p, &predicate.flags);
            self.term_span(&mut p, predicate.span());
            push_external_refs(&mut p, &predicate.external_refs);
            for role in predicate.roles() {
                let mut r = Element::new("role")
                    .with_attr("id", role.id())
                    .with_attr("semRole", role.sem_role.as_str());
                flags_attr(&mut r, &role.flags);
                self.term_span(&mut r, role.span());
                push_external_refs(&mut r, &role.external_refs);
                p.push(r);
            }
            el.push(p);
        }
        section_if(el)
    }

    // ─── constituency ───────────────────────────────────────────────────────

    fn constituency_strings(&self) -> Option<Element> {
        let mut el = Element::new("constituencyStrings");
        for (sentence, tree) in self.doc.store().constituency_strings() {
            let mut t = Element::new("tree").with_attr("sentence", sentence.to_string());
            t.push_node(Node::Text(tree.clone()));
            el.push(t);
        }
        section_if(el)
    }

    fn tree_element(&self, tree: &Tree) -> Element {
        let mut el = Element::new("tree");
        el.set_opt_attr("sentence", tree.sentence());

        let mut nodes = tree.nodes();
        nodes.sort_by_key(|n| id_number(n.id()));

        self.comment(&mut el, "Non-terminals");
        for node in &nodes {
            if let TreeNode::NonTerminal { id, label, .. } = node {
                el.push(
                    Element::new("nt")
                        .with_attr("id", id.as_str())
                        .with_attr("label", label.as_str()),
                );
            }
        }
        self.comment(&mut el, "Terminals");
        for node in &nodes {
            if let TreeNode::Terminal { id, span, .. } = node {
                self.comment(&mut el, self.doc.span_str(span));
                let mut t = Element::new("t").with_attr("id", id.as_str());
                t.push(span_element(span));
                el.push(t);
            }
        }
        self.comment(&mut el, "Tree edges");
        for edge in tree.edges() {
            let mut e = Element::new("edge");
            e.set_opt_attr("id", edge.id);
            e.set_attr("from", edge.from);
            e.set_attr("to", edge.to);
            if edge.head {
                e.set_attr("head", "yes");
            }
            el.push(e);
        }
        el
    }

    fn constituency(&self) -> Option<Element> {
        let mut el = Element::new("constituency");
        for tree in self.doc.trees() {
            el.push(self.tree_element(tree));
        }
        section_if(el)
    }

    // ─── temporal and causal links ──────────────────────────────────────────

    fn tlinks(&self) -> Option<Element> {
        let mut el = Element::new("temporalRelations");
        for tlink in self.doc.tlinks() {
            self.comment(&mut el, format!("{}({}, {})", tlink.rel_type, tlink.from(), tlink.to()));
            el.push(
                Element::new("tlink")
                    .with_attr("id", tlink.id())
                    .with_attr("from", tlink.from().id())
                    .with_attr("to", tlink.to().id())
                    .with_attr("fromType", tlink.from().type_name())
                    .with_attr("toType", tlink.to().type_name())
                    .with_attr("relType", tlink.rel_type.as_str()),
            );
        }
        section_if(el)
    }

    fn clinks(&self) -> Option<Element> {
        let mut el = Element::new("causalRelations");
        for clink in self.doc.clinks() {
            self.comment(
                &mut el,
                format!("{}({}, {})", clink.rel_type.as_deref().unwrap_or_default(), clink.from(), clink.to()),
            );
            let mut c = Element::new("clink")
                .with_attr("id", clink.id())
                .with_attr("from", clink.from())
                .with_attr("to", clink.to());
            c.set_opt_attr("relType", clink.rel_type.as_deref());
            el.push(c);
        }
        section_if(el)
    }
}
