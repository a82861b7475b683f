//! Generic indexed arena backing every annotation layer.
//!
//! A layer keeps its items in insertion order and maintains four secondary
//! indices: by term, by word form, by sentence and by relational id. The keys an
//! item is indexed under are computed by the caller *before* insertion and stored
//! next to the item, so removal retracts exactly what insertion committed.

use std::collections::{BTreeMap, HashMap};

use crate::error::{NafError, Result};
use crate::types::{TermId, WfId};

type Slot = u64;

/// Keys an item is registered under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexKeys {
    /// Terms the item touches.
    pub terms: Vec<TermId>,
    /// Word forms the item touches.
    pub wfs: Vec<WfId>,
    /// Sentence the item belongs to.
    pub sentence: Option<u32>,
    /// Relational ids the item points at.
    pub relational: Vec<String>,
}

impl IndexKeys {
    /// Keys over terms only.
    pub fn terms(terms: impl IntoIterator<Item = TermId>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Keys over word forms only.
    pub fn wfs(wfs: impl IntoIterator<Item = WfId>) -> Self {
        Self {
            wfs: wfs.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add a sentence key.
    pub fn in_sentence(mut self, sentence: Option<u32>) -> Self {
        self.sentence = sentence;
        self
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    id: Option<String>,
    keys: IndexKeys,
}

/// Ordered arena with secondary indices.
#[derive(Debug, Clone)]
pub struct IndexedLayer<T> {
    name: &'static str,
    next_slot: Slot,
    order: Vec<Slot>,
    entries: HashMap<Slot, Entry<T>>,
    by_id: HashMap<String, Slot>,
    by_term: HashMap<TermId, Vec<Slot>>,
    by_wf: HashMap<WfId, Vec<Slot>>,
    by_sentence: BTreeMap<u32, Vec<Slot>>,
    by_ref: HashMap<String, Vec<Slot>>,
    slot_ordered: bool,
}

impl<T> IndexedLayer<T> {
    /// Create an empty layer; `name` is used in error messages.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_slot: 0,
            order: Vec::new(),
            entries: HashMap::new(),
            by_id: HashMap::new(),
            by_term: HashMap::new(),
            by_wf: HashMap::new(),
            by_sentence: BTreeMap::new(),
            by_ref: HashMap::new(),
            slot_ordered: true,
        }
    }

    /// Layer name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append an item.
    pub fn push(&mut self, item: T, id: Option<String>, keys: IndexKeys) -> Result<&mut T> {
        let position = self.order.len();
        self.insert_at(position, item, id, keys)
    }

    /// Insert an item at `position` in iteration order.
    ///
    /// Fails without modifying the layer when `id` is already taken.
    pub fn insert_at(&mut self, position: usize, item: T, id: Option<String>, keys: IndexKeys) -> Result<&mut T> {
        if let Some(id) = &id {
            if self.by_id.contains_key(id) {
                return Err(NafError::malformed(format!("duplicate {} id {}", self.name, id)));
            }
        }
        let slot = self.next_slot;
        self.next_slot += 1;

        if let Some(id) = &id {
            self.by_id.insert(id.clone(), slot);
        }
        for term in &keys.terms {
            push_unique(self.by_term.entry(term.clone()).or_default(), slot);
        }
        for wf in &keys.wfs {
            push_unique(self.by_wf.entry(wf.clone()).or_default(), slot);
        }
        if let Some(sentence) = keys.sentence {
            self.by_sentence.entry(sentence).or_default().push(slot);
        }
        for r in &keys.relational {
            push_unique(self.by_ref.entry(r.clone()).or_default(), slot);
        }
        if position < self.order.len() {
            self.slot_ordered = false;
        }
        self.order.insert(position.min(self.order.len()), slot);

        let entry = self.entries.entry(slot).or_insert(Entry { item, id, keys });
        Ok(&mut entry.item)
    }

    /// Remove the item registered under `id`.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let slot = self.by_id.get(id).copied()?;
        self.remove_slot(slot)
    }

    /// Remove the first item matching `pred`.
    pub fn remove_where(&mut self, pred: impl Fn(&T) -> bool) -> Option<T> {
        let slot = self.order.iter().copied().find(|s| self.entries.get(s).is_some_and(|e| pred(&e.item)))?;
        self.remove_slot(slot)
    }

    fn remove_slot(&mut self, slot: Slot) -> Option<T> {
        let entry = self.entries.remove(&slot)?;
        self.order.retain(|s| *s != slot);
        if let Some(id) = &entry.id {
            self.by_id.remove(id);
        }
        for term in &entry.keys.terms {
            retract(&mut self.by_term, term, slot);
        }
        for wf in &entry.keys.wfs {
            retract(&mut self.by_wf, wf, slot);
        }
        if let Some(sentence) = entry.keys.sentence {
            if let Some(slots) = self.by_sentence.get_mut(&sentence) {
                slots.retain(|s| *s != slot);
                if slots.is_empty() {
                    self.by_sentence.remove(&sentence);
                }
            }
        }
        for r in &entry.keys.relational {
            retract(&mut self.by_ref, r, slot);
        }
        Some(entry.item)
    }

    /// Replace the keys of the item registered under `id`, keeping its position.
    pub fn reindex(&mut self, id: &str, keys: IndexKeys) -> Result<()> {
        let position = self.position(id).ok_or_else(|| NafError::unresolved(self.name, id))?;
        let item = self.remove(id).ok_or_else(|| NafError::unresolved(self.name, id))?;
        self.insert_at(position, item, Some(id.to_string()), keys)?;
        Ok(())
    }

    /// Drop every item and index entry.
    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
        self.by_id.clear();
        self.by_term.clear();
        self.by_wf.clear();
        self.by_sentence.clear();
        self.by_ref.clear();
        self.slot_ordered = true;
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the layer is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Items in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|s| self.entries.get(s).map(|e| &e.item))
    }

    /// Apply `f` to every item in order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for slot in &self.order {
            if let Some(entry) = self.entries.get_mut(slot) {
                f(&mut entry.item);
            }
        }
    }

    /// Item registered under `id`.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).and_then(|s| self.entries.get(s)).map(|e| &e.item)
    }

    /// Mutable item registered under `id`.
    ///
    /// Callers must not change index-relevant fields; those are private on
    /// every model type.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        let slot = self.by_id.get(id)?;
        self.entries.get_mut(slot).map(|e| &mut e.item)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iteration position of the item registered under `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        let slot = self.by_id.get(id)?;
        self.order.iter().position(|s| s == slot)
    }

    /// Items touching `term`.
    pub fn by_term(&self, term: &str) -> Vec<&T> {
        self.resolve(self.by_term.get(term))
    }

    /// Items touching `wf`.
    pub fn by_wf(&self, wf: &str) -> Vec<&T> {
        self.resolve(self.by_wf.get(wf))
    }

    /// Items in `sentence`.
    pub fn by_sentence(&self, sentence: u32) -> Vec<&T> {
        self.resolve(self.by_sentence.get(&sentence))
    }

    /// Items pointing at relational id `id`.
    pub fn by_ref(&self, id: &str) -> Vec<&T> {
        self.resolve(self.by_ref.get(id))
    }

    /// Sentence numbers with at least one item, ascending.
    pub fn sentences(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_sentence.keys().copied()
    }

    fn resolve(&self, slots: Option<&Vec<Slot>>) -> Vec<&T> {
        let Some(slots) = slots else {
            return Vec::new();
        };
        if self.slot_ordered {
            return slots.iter().filter_map(|s| self.entries.get(s).map(|e| &e.item)).collect();
        }
        // Index lists hold slots in commit order; report them in layer order.
        let mut hits: Vec<(usize, &T)> = slots
            .iter()
            .filter_map(|s| {
                let pos = self.order.iter().position(|o| o == s)?;
                Some((pos, &self.entries.get(s)?.item))
            })
            .collect();
        hits.sort_by_key(|(pos, _)| *pos);
        hits.into_iter().map(|(_, item)| item).collect()
    }
}

fn push_unique(slots: &mut Vec<Slot>, slot: Slot) {
    if !slots.contains(&slot) {
        slots.push(slot);
    }
}

fn retract<K: std::hash::Hash + Eq>(index: &mut HashMap<K, Vec<Slot>>, key: &K, slot: Slot) {
    if let Some(slots) = index.get_mut(key) {
        slots.retain(|s| *s != slot);
        if slots.is_empty() {
            index.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(terms: &[&str], sentence: u32) -> IndexKeys {
        IndexKeys::terms(terms.iter().map(|t| TermId::new(*t))).in_sentence(Some(sentence))
    }

    #[test]
    fn test_push_indexes_every_key() {
        let mut layer: IndexedLayer<&str> = IndexedLayer::new("chunks");
        layer.push("c1", Some("c1".into()), keys(&["t1", "t2"], 1)).unwrap();
        layer.push("c2", Some("c2".into()), keys(&["t2"], 2)).unwrap();

        assert_eq!(layer.by_term("t2"), vec![&"c1", &"c2"]);
        assert_eq!(layer.by_sentence(2), vec![&"c2"]);
        assert!(layer.by_term("t9").is_empty());
        assert_eq!(layer.sentences().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_remove_is_exact_inverse() {
        let mut layer: IndexedLayer<&str> = IndexedLayer::new("entities");
        layer.push("e1", Some("e1".into()), keys(&["t1"], 1)).unwrap();
        layer.push("e2", Some("e2".into()), keys(&["t1"], 1)).unwrap();

        assert_eq!(layer.remove("e1"), Some("e1"));
        assert_eq!(layer.by_term("t1"), vec![&"e2"]);
        assert!(layer.get("e1").is_none());
        assert_eq!(layer.remove("e2"), Some("e2"));
        assert!(layer.by_term("t1").is_empty());
        assert_eq!(layer.sentences().count(), 0);
    }

    #[test]
    fn test_insert_at_keeps_order_and_index_order() {
        let mut layer: IndexedLayer<&str> = IndexedLayer::new("terms");
        layer.push("t1", Some("t1".into()), keys(&[], 1)).unwrap();
        layer.push("t3", Some("t3".into()), keys(&[], 1)).unwrap();
        layer.insert_at(1, "t2", Some("t2".into()), keys(&[], 1)).unwrap();

        assert_eq!(layer.iter().copied().collect::<Vec<_>>(), vec!["t1", "t2", "t3"]);
        assert_eq!(layer.by_sentence(1), vec![&"t1", &"t2", &"t3"]);
        assert_eq!(layer.position("t3"), Some(2));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut layer: IndexedLayer<&str> = IndexedLayer::new("chunks");
        layer.push("a", Some("c1".into()), IndexKeys::default()).unwrap();
        assert!(layer.push("b", Some("c1".into()), IndexKeys::default()).is_err());
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_remove_where_for_id_less_items() {
        let mut layer: IndexedLayer<(&str, &str)> = IndexedLayer::new("deps");
        layer.push(("t2", "t1"), None, keys(&["t2", "t1"], 1)).unwrap();
        layer.push(("t2", "t3"), None, keys(&["t2", "t3"], 1)).unwrap();

        assert_eq!(layer.remove_where(|d| *d == ("t2", "t1")), Some(("t2", "t1")));
        assert_eq!(layer.by_term("t2"), vec![&("t2", "t3")]);
        assert!(layer.by_term("t1").is_empty());
    }
}
