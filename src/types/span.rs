//! Ordered reference lists with designated heads.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{NafError, Result};

/// Ordered sequence of references into a lower layer plus a set of heads.
///
/// Targets are identifiers, so `has_target` and `is_head` compare by id: two
/// distinct terms with identical surface text are distinct targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span<T> {
    targets: Vec<T>,
    /// Head subset, kept in marking order.
    heads: Vec<T>,
}

impl<T> Default for Span<T> {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            heads: Vec::new(),
        }
    }
}

impl<T: Clone + PartialEq> Span<T> {
    /// Create an empty span.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a span over `targets` without heads.
    pub fn from_targets(targets: Vec<T>) -> Self {
        Self {
            targets,
            heads: Vec::new(),
        }
    }

    /// Create a span over `targets` with a single head.
    pub fn with_head(targets: Vec<T>, head: T) -> Self {
        Self {
            targets,
            heads: vec![head],
        }
    }

    /// Append a target, optionally marking it as head.
    pub fn add_target(&mut self, target: T, is_head: bool) {
        if is_head {
            self.set_head(target.clone());
        }
        self.targets.push(target);
    }

    /// Append several targets.
    pub fn add_targets(&mut self, targets: impl IntoIterator<Item = T>) {
        self.targets.extend(targets);
    }

    /// Builder-style variant of [`Span::add_target`].
    pub fn with_target(mut self, target: T, is_head: bool) -> Self {
        self.add_target(target, is_head);
        self
    }

    /// Targets in order.
    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    /// First target, if any.
    pub fn first(&self) -> Option<&T> {
        self.targets.first()
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the span has no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether `target` is one of the targets.
    pub fn has_target(&self, target: &T) -> bool {
        self.targets.contains(target)
    }

    /// All heads, in marking order.
    pub fn heads(&self) -> &[T] {
        &self.heads
    }

    /// Whether any head is marked.
    pub fn has_head(&self) -> bool {
        !self.heads.is_empty()
    }

    /// First marked head.
    pub fn head(&self) -> Option<&T> {
        self.heads.first()
    }

    /// Whether `target` is marked as head.
    pub fn is_head(&self, target: &T) -> bool {
        self.heads.contains(target)
    }

    /// Mark `head` as a head (set semantics).
    pub fn set_head(&mut self, head: T) {
        if !self.heads.contains(&head) {
            self.heads.push(head);
        }
    }

    /// Unmark `head`.
    pub fn delete_head(&mut self, head: &T) {
        self.heads.retain(|h| h != head);
    }

    /// Remove every head mark.
    pub fn clear_heads(&mut self) {
        self.heads.clear();
    }
}

impl<T: Clone + PartialEq + Eq + Hash + fmt::Display> Span<T> {
    /// Rebuild this span through an old-id to new-id table.
    ///
    /// Fails with [`NafError::DanglingReference`] if a target has no counterpart.
    pub fn remap(&self, table: &HashMap<T, T>) -> Result<Self> {
        let lookup = |t: &T| table.get(t).cloned().ok_or_else(|| NafError::dangling(t.to_string()));
        let targets = self.targets.iter().map(lookup).collect::<Result<Vec<_>>>()?;
        let heads = self.heads.iter().map(lookup).collect::<Result<Vec<_>>>()?;
        Ok(Self { targets, heads })
    }
}

impl<T> IntoIterator for Span<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Span<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_set_semantics() {
        let mut span = Span::new();
        span.add_target("a".to_string(), false);
        span.add_target("b".to_string(), true);
        span.set_head("b".to_string());
        span.set_head("a".to_string());

        assert_eq!(span.heads(), &["b".to_string(), "a".to_string()]);
        assert_eq!(span.head(), Some(&"b".to_string()));
        assert!(span.is_head(&"a".to_string()));

        span.delete_head(&"b".to_string());
        assert_eq!(span.head(), Some(&"a".to_string()));
    }

    #[test]
    fn test_has_target_by_id() {
        let span = Span::from_targets(vec![1, 2, 3]);
        assert!(span.has_target(&2));
        assert!(!span.has_target(&4));
        assert_eq!(span.first(), Some(&1));
        assert!(!span.has_head());
    }

    #[test]
    fn test_remap_keeps_shape() {
        let span = Span::with_head(vec!["w1".to_string(), "w2".to_string()], "w2".to_string());
        let table: HashMap<String, String> = [("w1", "w10"), ("w2", "w11")]
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();

        let copy = span.remap(&table).unwrap();
        assert_eq!(copy.targets(), &["w10".to_string(), "w11".to_string()]);
        assert_eq!(copy.head(), Some(&"w11".to_string()));
    }

    #[test]
    fn test_remap_reports_dangling_target() {
        let span = Span::from_targets(vec!["w1".to_string(), "w9".to_string()]);
        let table: HashMap<String, String> = [("w1".to_string(), "w2".to_string())].into_iter().collect();

        match span.remap(&table) {
            Err(NafError::DanglingReference { id }) => assert_eq!(id, "w9"),
            other => panic!("expected dangling reference, got {:?}", other),
        }
    }
}
