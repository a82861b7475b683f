//! Dependency paths and the pattern language used to query them.
//!
//! A path between two terms is the list of dependency edges connecting them
//! through their lowest common governor. Paths are rendered as compact strings
//! where each edge becomes `<sign><letters>_`: the sign is `+` when the edge is
//! walked from governor to dependent and `-` otherwise, and every `-`-separated
//! part of the relation label is mapped to a single character.
//!
//! Patterns are written over labels (`"-nsubj dobj"`, `"(amod|nn)*"`) and
//! compiled into regular expressions over the rendered strings. Label
//! characters and compiled patterns are cached by the [`DepPathEngine`]; the
//! caches only grow.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use regex_lite::Regex;

use crate::error::{NafError, Result};
use crate::store::IndexedLayer;
use crate::types::{Dep, TermId};

static SHARED_ENGINE: OnceLock<Arc<DepPathEngine>> = OnceLock::new();

/// Cache sizes of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepPathStats {
    /// Distinct labels seen.
    pub labels: usize,
    /// Compiled patterns.
    pub patterns: usize,
}

/// Label-to-character table and compiled pattern cache.
#[derive(Debug, Default)]
pub struct DepPathEngine {
    letters: RwLock<HashMap<String, char>>,
    patterns: RwLock<HashMap<String, Arc<Regex>>>,
}

impl DepPathEngine {
    /// Create an engine with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide engine shared by documents that are not given their own.
    pub fn shared() -> Arc<Self> {
        Arc::clone(SHARED_ENGINE.get_or_init(|| Arc::new(Self::new())))
    }

    /// Character assigned to `label` (case-insensitive).
    ///
    /// The first label gets `'a'`; every new label gets the successor of the
    /// largest character handed out so far.
    pub fn letter(&self, label: &str) -> char {
        let key = label.to_lowercase();
        if let Some(&ch) = self.letters.read().get(&key) {
            return ch;
        }
        let mut letters = self.letters.write();
        if let Some(&ch) = letters.get(&key) {
            return ch;
        }
        let ch = match letters.values().max() {
            None => 'a',
            Some(&max) => (max as u32 + 1..)
                .find_map(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        };
        letters.insert(key, ch);
        ch
    }

    /// Render `path`, walked starting at `from`.
    pub fn render(&self, from: &TermId, path: &[&Dep]) -> String {
        let mut out = String::from("_");
        let mut current = from;
        for dep in path {
            let sign = if dep.from() == current {
                current = dep.to();
                '+'
            } else {
                current = dep.from();
                '-'
            };
            for label in dep.rfunc.split('-') {
                out.push(sign);
                out.push(self.letter(label));
            }
            out.push('_');
        }
        out
    }

    /// Compile (or fetch from cache) the regex for `pattern`.
    pub fn compile(&self, pattern: &str) -> Result<Arc<Regex>> {
        if let Some(regex) = self.patterns.read().get(pattern) {
            return Ok(Arc::clone(regex));
        }
        let mut patterns = self.patterns.write();
        if let Some(regex) = patterns.get(pattern) {
            return Ok(Arc::clone(regex));
        }
        let source = self.translate(pattern);
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| NafError::InvalidValue {
            field: "dependency path pattern".to_string(),
            reason: format!("{}: {}", pattern, e),
        })?;
        let regex = Arc::new(regex);
        patterns.insert(pattern.to_string(), Arc::clone(&regex));
        tracing::debug!(pattern = %pattern, regex = %source, "Compiled dependency path pattern");
        Ok(regex)
    }

    fn translate(&self, pattern: &str) -> String {
        let mut out = String::from("_");
        let mut token = String::new();
        for ch in pattern.chars().chain(std::iter::once(' ')) {
            if ch.is_alphabetic() || ch == '-' {
                token.push(ch);
                continue;
            }
            if !token.is_empty() {
                let (sign, label) = match token.strip_prefix('-') {
                    Some(rest) => ('-', rest),
                    None => ('+', token.as_str()),
                };
                let step = format!("{}{}", sign, self.letter(label));
                out.push_str("([^_]*");
                out.push_str(&regex_lite::escape(&step));
                out.push_str("[^_]*_)");
                token.clear();
            }
            if !ch.is_whitespace() {
                out.push(ch);
            }
        }
        out
    }

    /// Whether the rendering of `path` from `from` fully matches `pattern`.
    pub fn matches(&self, from: &TermId, path: &[&Dep], pattern: &str) -> Result<bool> {
        let regex = self.compile(pattern)?;
        Ok(regex.is_match(&self.render(from, path)))
    }

    /// Current cache sizes.
    pub fn stats(&self) -> DepPathStats {
        DepPathStats {
            labels: self.letters.read().len(),
            patterns: self.patterns.read().len(),
        }
    }
}

// ─── graph walks over a dependency layer ────────────────────────────────────

/// First edge whose dependent is `term`.
pub fn dep_to_term<'a>(deps: &'a IndexedLayer<Dep>, term: &TermId) -> Option<&'a Dep> {
    deps.by_term(term.as_str()).into_iter().find(|d| d.to() == term)
}

/// Edges governed by `term`.
pub fn deps_from_term<'a>(deps: &'a IndexedLayer<Dep>, term: &TermId) -> Vec<&'a Dep> {
    deps.by_term(term.as_str()).into_iter().filter(|d| d.from() == term).collect()
}

/// Chain of edges from `term` up towards the root, stopping on cycles.
fn upward<'a>(deps: &'a IndexedLayer<Dep>, term: &TermId) -> impl Iterator<Item = &'a Dep> + 'a {
    let mut seen: HashSet<TermId> = HashSet::from([term.clone()]);
    let mut next = dep_to_term(deps, term);
    std::iter::from_fn(move || {
        let dep = next?;
        next = if seen.insert(dep.from().clone()) {
            dep_to_term(deps, dep.from())
        } else {
            None
        };
        Some(dep)
    })
}

/// Edges connecting `from` to `to` through their lowest common governor.
///
/// Returns an empty path when both are the same term and `None` when they are
/// not connected.
pub fn dep_path<'a>(deps: &'a IndexedLayer<Dep>, from: &TermId, to: &TermId) -> Option<Vec<&'a Dep>> {
    if from == to {
        return Some(Vec::new());
    }
    let mut to_path: Vec<&Dep> = Vec::new();
    for dep in upward(deps, to) {
        to_path.push(dep);
        if dep.from() == from {
            to_path.reverse();
            return Some(to_path);
        }
    }
    let mut from_path: Vec<&Dep> = Vec::new();
    for dep in upward(deps, from) {
        from_path.push(dep);
        if dep.from() == to {
            return Some(from_path);
        }
        if let Some(i) = to_path.iter().position(|d| d.from() == dep.from()) {
            from_path.extend(to_path[..=i].iter().rev());
            return Some(from_path);
        }
    }
    None
}

/// The unique term of `terms` whose governor lies outside the set.
pub fn terms_head(deps: &IndexedLayer<Dep>, terms: &[TermId]) -> Option<TermId> {
    let set: HashSet<&TermId> = terms.iter().collect();
    let mut head: Option<&TermId> = None;
    for term in terms {
        let outside = dep_to_term(deps, term).map_or(true, |d| !set.contains(&d.from()));
        if outside {
            match head {
                None => head = Some(term),
                Some(h) if h == term => {}
                Some(_) => return None,
            }
        }
    }
    head.cloned()
}

/// Direction of a breadth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// From governors to dependents.
    Down,
    /// From dependents to governors.
    Up,
}

/// Terms reachable from `start` (inclusive) in breadth-first order.
pub fn reachable(deps: &IndexedLayer<Dep>, start: &[TermId], walk: Walk) -> Vec<TermId> {
    let mut seen: HashSet<TermId> = HashSet::new();
    let mut out = Vec::new();
    let mut queue = VecDeque::new();
    for term in start {
        if seen.insert(term.clone()) {
            out.push(term.clone());
            queue.push_back(term.clone());
        }
    }
    while let Some(term) = queue.pop_front() {
        for dep in deps.by_term(term.as_str()) {
            let next = match walk {
                Walk::Down if dep.from() == &term => dep.to(),
                Walk::Up if dep.to() == &term => dep.from(),
                _ => continue,
            };
            if seen.insert(next.clone()) {
                out.push(next.clone());
                queue.push_back(next.clone());
            }
        }
    }
    out
}

/// Terms reachable from each of `start` whose path from it matches `pattern`.
pub fn reachable_matching(
    engine: &DepPathEngine,
    deps: &IndexedLayer<Dep>,
    start: &[TermId],
    walk: Walk,
    pattern: &str,
) -> Result<Vec<TermId>> {
    let mut seen: HashSet<TermId> = HashSet::new();
    let mut out = Vec::new();
    for term in start {
        for found in reachable(deps, std::slice::from_ref(term), walk) {
            let Some(path) = dep_path(deps, term, &found) else {
                continue;
            };
            if engine.matches(term, &path, pattern)? && seen.insert(found.clone()) {
                out.push(found);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IndexKeys;

    fn layer(edges: &[(&str, &str, &str)]) -> IndexedLayer<Dep> {
        let mut deps = IndexedLayer::new("deps");
        for (from, to, rfunc) in edges {
            let dep = Dep::new(TermId::new(*from), TermId::new(*to), *rfunc);
            let keys = IndexKeys::terms([dep.from().clone(), dep.to().clone()]);
            deps.push(dep, None, keys).unwrap();
        }
        deps
    }

    fn t(id: &str) -> TermId {
        TermId::new(id)
    }

    #[test]
    fn test_letters_are_assigned_in_order() {
        let engine = DepPathEngine::new();
        assert_eq!(engine.letter("nsubj"), 'a');
        assert_eq!(engine.letter("dobj"), 'b');
        assert_eq!(engine.letter("NSUBJ"), 'a');
        assert_eq!(engine.stats().labels, 2);
    }

    #[test]
    fn test_john_loves_mary() {
        let deps = layer(&[("t2", "t1", "nsubj"), ("t2", "t3", "dobj")]);
        let engine = DepPathEngine::new();

        let path = dep_path(&deps, &t("t1"), &t("t3")).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!((path[0].from().as_str(), path[0].to().as_str()), ("t2", "t1"));
        assert_eq!((path[1].from().as_str(), path[1].to().as_str()), ("t2", "t3"));
        assert_eq!(engine.render(&t("t1"), &path), "_-a_+b_");

        assert!(engine.matches(&t("t1"), &path, "-nsubj dobj").unwrap());
        assert!(!engine.matches(&t("t1"), &path, "nsubj dobj").unwrap());
    }

    #[test]
    fn test_path_symmetry() {
        let deps = layer(&[("t2", "t1", "nsubj"), ("t2", "t4", "dobj"), ("t4", "t3", "amod")]);
        let forward = dep_path(&deps, &t("t1"), &t("t3")).unwrap();
        let mut backward = dep_path(&deps, &t("t3"), &t("t1")).unwrap();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_path_matches_empty_pattern() {
        let engine = DepPathEngine::new();
        assert!(engine.matches(&t("t1"), &[], "").unwrap());
        assert_eq!(engine.render(&t("t1"), &[]), "_");
    }

    #[test]
    fn test_unconnected_terms_have_no_path() {
        let deps = layer(&[("t2", "t1", "nsubj"), ("t4", "t3", "amod")]);
        assert!(dep_path(&deps, &t("t1"), &t("t3")).is_none());
    }

    #[test]
    fn test_cycle_terminates() {
        let deps = layer(&[("t1", "t2", "x"), ("t2", "t1", "y")]);
        assert!(dep_path(&deps, &t("t1"), &t("t3")).is_none());
    }

    #[test]
    fn test_compound_labels_split_on_dash() {
        let deps = layer(&[("t2", "t1", "nsubj-pass")]);
        let engine = DepPathEngine::new();
        let path = dep_path(&deps, &t("t2"), &t("t1")).unwrap();
        assert_eq!(engine.render(&t("t2"), &path), "_+a+b_");
    }

    #[test]
    fn test_leading_dash_yields_empty_label() {
        let deps = layer(&[("t2", "t1", "-pass")]);
        let engine = DepPathEngine::new();
        let path = dep_path(&deps, &t("t2"), &t("t1")).unwrap();
        assert_eq!(engine.render(&t("t2"), &path), "_+a+b_");
        assert_eq!(engine.letter(""), 'a');
        assert_eq!(engine.letter("pass"), 'b');
    }

    #[test]
    fn test_terms_head() {
        let deps = layer(&[("t2", "t1", "nsubj"), ("t2", "t3", "dobj"), ("t3", "t4", "amod")]);
        assert_eq!(terms_head(&deps, &[t("t3"), t("t4")]), Some(t("t3")));
        assert_eq!(terms_head(&deps, &[t("t1"), t("t4")]), None);
    }

    #[test]
    fn test_reachable_with_pattern() {
        let deps = layer(&[("t2", "t1", "nsubj"), ("t2", "t3", "dobj"), ("t3", "t4", "amod")]);
        let engine = DepPathEngine::new();

        let down = reachable(&deps, &[t("t2")], Walk::Down);
        assert_eq!(down, vec![t("t2"), t("t1"), t("t3"), t("t4")]);
        let up = reachable(&deps, &[t("t4")], Walk::Up);
        assert_eq!(up, vec![t("t4"), t("t3"), t("t2")]);

        let objects = reachable_matching(&engine, &deps, &[t("t2")], Walk::Down, "dobj amod?").unwrap();
        assert_eq!(objects, vec![t("t3"), t("t4")]);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let engine = DepPathEngine::new();
        assert!(engine.compile("(nsubj").is_err());
    }
}
