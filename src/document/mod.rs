//! The document facade.
//!
//! A [`Document`] owns the header, the raw text, the identifier generators and
//! the [`AnnotationStore`]. Pipeline code creates annotations through the typed
//! factories (`load_*` with a caller-supplied id, `new_*` with a fresh one),
//! reads them back through the per-layer queries and persists the whole graph
//! with the NAF codec.
//!
//! ```text
//! factories ──► IdManager ──► AnnotationStore ──► queries
//!                                   │
//!                              codec (load/save)
//! ```

mod edit;
mod factories;
mod queries;

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::codec::{reader, writer, CodecConfig};
use crate::dep_path::DepPathEngine;
use crate::error::{NafError, Result};
use crate::ids::IdManager;
use crate::store::AnnotationStore;
use crate::types::term::{dash_safe, surface_form};
use crate::types::{Dep, Header, Span, TermId, Wf, WfId};

/// NAF version written when none is given.
pub const DEFAULT_NAF_VERSION: &str = "v3";

/// A linguistically annotated document.
#[derive(Debug, Clone)]
pub struct Document {
    lang: String,
    version: String,
    /// File description, public id and linguistic processors.
    pub header: Header,
    raw: String,
    ids: IdManager,
    store: AnnotationStore,
    engine: Arc<DepPathEngine>,
}

impl Document {
    /// Create an empty document.
    pub fn new(lang: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_engine(lang, version, DepPathEngine::shared())
    }

    /// Create an empty document using a private dependency-path engine.
    pub fn with_engine(lang: impl Into<String>, version: impl Into<String>, engine: Arc<DepPathEngine>) -> Self {
        Self {
            lang: lang.into(),
            version: version.into(),
            header: Header::default(),
            raw: String::new(),
            ids: IdManager::new(),
            store: AnnotationStore::new(),
            engine,
        }
    }

    /// Language code (`xml:lang`).
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Set the language code.
    pub fn set_lang(&mut self, lang: impl Into<String>) {
        self.lang = lang.into();
    }

    /// Format version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Set the format version.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Raw source text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Replace the raw source text.
    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    /// Identifier generators.
    pub fn ids(&self) -> &IdManager {
        &self.ids
    }

    /// Underlying annotation store.
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Dependency-path engine used by path queries.
    pub fn engine(&self) -> &Arc<DepPathEngine> {
        &self.engine
    }

    /// Whether `layer` already lists the tool `name` at `version`.
    pub fn linguistic_processor_exists(&self, layer: &str, name: &str, version: Option<&str>) -> bool {
        self.header.processor_exists(layer, name, version)
    }

    // ─── sentences and paragraphs ───────────────────────────────────────────

    /// Word forms grouped by sentence, in ascending sentence order.
    pub fn sentences(&self) -> Vec<Vec<&Wf>> {
        let mut groups: BTreeMap<u32, Vec<&Wf>> = BTreeMap::new();
        for wf in self.store.text().iter() {
            groups.entry(wf.sent()).or_default().push(wf);
        }
        groups.into_values().collect()
    }

    /// Lowest sentence number, if there is any text.
    pub fn first_sentence(&self) -> Option<u32> {
        self.store.text().sentences().next()
    }

    /// Number of distinct sentences.
    pub fn num_sentences(&self) -> usize {
        self.store.text().sentences().count()
    }

    /// Word forms of every sentence of `para`, grouped by sentence.
    pub fn sentences_by_paragraph(&self, para: u32) -> Vec<Vec<&Wf>> {
        self.store
            .paragraph_sentences(para)
            .iter()
            .map(|s| self.store.text().by_sentence(*s))
            .collect()
    }

    /// Lowest paragraph number, if any paragraph is assigned.
    pub fn first_paragraph(&self) -> Option<u32> {
        self.store.paragraph_numbers().next()
    }

    /// Number of distinct paragraphs.
    pub fn num_paragraphs(&self) -> usize {
        self.store.paragraph_numbers().count()
    }

    // ─── surface strings ────────────────────────────────────────────────────

    /// Surface form of a term: its word forms laid out by offset.
    pub fn term_form(&self, term: &TermId) -> String {
        let Some(term) = self.store.term(term.as_str()) else {
            return String::new();
        };
        let wfs: Vec<&Wf> = term.wfs().iter().filter_map(|w| self.store.text().get(w.as_str())).collect();
        surface_form(&wfs)
    }

    /// Surface form made safe for XML comments.
    pub fn term_str(&self, term: &TermId) -> String {
        dash_safe(&self.term_form(term))
    }

    /// Surface strings of the terms of `span`, space separated.
    pub fn span_str(&self, span: &Span<TermId>) -> String {
        span.targets().iter().map(|t| self.term_str(t)).collect::<Vec<_>>().join(" ")
    }

    /// Forms of the word forms of `span`, space separated.
    pub fn wf_span_str(&self, span: &Span<WfId>) -> String {
        span.targets()
            .iter()
            .filter_map(|w| self.store.text().get(w.as_str()))
            .map(|wf| wf.form.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `rfunc(from-N, to-M)` rendering of a dependency.
    pub fn dep_str(&self, dep: &Dep) -> String {
        format!(
            "{}({}-{}, {}-{})",
            dep.rfunc,
            self.term_str(dep.from()),
            dep.from().digits(),
            self.term_str(dep.to()),
            dep.to().digits()
        )
    }

    // ─── load and save ──────────────────────────────────────────────────────

    /// Decode a document from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        text.parse()
    }

    /// Decode a document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let doc: Document = text.parse()?;
        tracing::info!(path = %path.display(), wfs = doc.store.text().len(), "Document loaded");
        Ok(doc)
    }

    /// Encode with the default [`CodecConfig`].
    pub fn to_naf_string(&self) -> String {
        self.to_naf_string_with(&CodecConfig::default())
    }

    /// Encode with explicit output settings.
    pub fn to_naf_string_with(&self, config: &CodecConfig) -> String {
        writer::write(self, config)
    }

    /// Encode into a writer.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        out.write_all(self.to_naf_string().as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Encode into a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_naf_string())?;
        tracing::info!(path = %path.display(), "Document saved");
        Ok(())
    }
}

impl FromStr for Document {
    type Err = NafError;

    fn from_str(s: &str) -> Result<Self> {
        reader::read(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new("en", DEFAULT_NAF_VERSION);
        for (form, sent, para, offset) in [("John", 1, 1, 0), ("sleeps", 1, 1, 5), ("He", 2, 1, 12), ("snores", 3, 2, 15)] {
            let id = doc.new_wf(form, sent).unwrap().id().clone();
            doc.wf_mut(id.as_str()).unwrap().offset = Some(offset);
            doc.set_wf_para(id.as_str(), para).unwrap();
        }
        doc
    }

    #[test]
    fn test_sentences_and_paragraphs() {
        let doc = sample();
        assert_eq!(doc.num_sentences(), 3);
        assert_eq!(doc.first_sentence(), Some(1));
        assert_eq!(doc.sentences()[0].len(), 2);
        assert_eq!(doc.num_paragraphs(), 2);
        assert_eq!(doc.first_paragraph(), Some(1));
        let para1 = doc.sentences_by_paragraph(1);
        assert_eq!(para1.len(), 2);
        assert_eq!(para1[1][0].form, "He");
    }

    #[test]
    fn test_term_form_and_dep_str() {
        let mut doc = sample();
        let t1 = doc.new_term(Span::from_targets(vec![WfId::new("w1")])).unwrap().id().clone();
        let t2 = doc
            .new_term(Span::from_targets(vec![WfId::new("w1"), WfId::new("w2")]))
            .unwrap()
            .id()
            .clone();
        assert_eq!(doc.term_form(&t2), "John sleeps");
        let dep = doc.new_dep(&t2, &t1, "nsubj").unwrap().clone();
        assert_eq!(doc.dep_str(&dep), "nsubj(John sleeps-2, John-1)");
    }

    #[test]
    fn test_processor_lookup() {
        let mut doc = Document::new("en", "v3");
        doc.header
            .add_processor("terms", crate::types::LinguisticProcessor::new("tagger").with_version("1"));
        assert!(doc.linguistic_processor_exists("terms", "tagger", Some("1")));
        assert!(!doc.linguistic_processor_exists("text", "tagger", Some("1")));
    }
}
