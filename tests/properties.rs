//! Property tests for identifier generation, span remapping and dependency paths.

use std::collections::HashMap;

use naf_kernel::{Document, IdGenerator, NafError, Span, TermId, WfId};
use proptest::prelude::*;

/// Document with `parents.len() + 1` terms in one sentence; term `i + 2`
/// depends on term `parents[i] + 1`.
fn dep_tree(parents: &[usize]) -> Document {
    let mut doc = Document::new("en", "v3");
    for i in 0..=parents.len() {
        let wf = doc.new_wf(format!("w{}", i), 1).unwrap().id().clone();
        doc.new_term(Span::from_targets(vec![wf])).unwrap();
    }
    for (i, parent) in parents.iter().enumerate() {
        let from = TermId::new(format!("t{}", parent + 1));
        let to = TermId::new(format!("t{}", i + 2));
        let rfunc = if i % 2 == 0 { "nmod" } else { "amod" };
        doc.new_dep(&from, &to, rfunc).unwrap();
    }
    doc
}

/// Parent index for each non-root node, always smaller than the node itself.
fn parents_strategy() -> impl Strategy<Value = Vec<usize>> {
    (1usize..12).prop_flat_map(|n| (0..n).map(|i| 0..=i).collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn test_next_after_observe_is_fresh(observed in prop::collection::vec(0u64..10_000, 1..20)) {
        let mut generator = IdGenerator::new("entities", "e");
        for n in &observed {
            generator.observe(&format!("e{}", n));
        }
        let max = *observed.iter().max().unwrap();
        let next = generator.next().unwrap();
        let number: u64 = next.trim_start_matches('e').parse().unwrap();
        prop_assert!(number > max);
        prop_assert!(!generator.is_inconsistent());
    }

    #[test]
    fn test_span_remap_preserves_shape(len in 1usize..16, head in 0usize..16, shift in 1usize..100) {
        let head = head % len;
        let ids: Vec<WfId> = (0..len).map(|i| WfId::new(format!("w{}", i))).collect();
        let span = Span::with_head(ids.clone(), ids[head].clone());
        let table: HashMap<WfId, WfId> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), WfId::new(format!("w{}", i + shift))))
            .collect();

        let remapped = span.remap(&table).unwrap();
        prop_assert_eq!(remapped.len(), span.len());
        prop_assert_eq!(remapped.head(), table.get(&ids[head]));

        let mut partial = table.clone();
        partial.remove(&ids[head]);
        let dangling = matches!(span.remap(&partial), Err(NafError::DanglingReference { .. }));
        prop_assert!(dangling);
    }

    #[test]
    fn test_dep_path_is_symmetric(parents in parents_strategy(), a in 0usize..12, b in 0usize..12) {
        let doc = dep_tree(&parents);
        let n = parents.len() + 1;
        let from = TermId::new(format!("t{}", a % n + 1));
        let to = TermId::new(format!("t{}", b % n + 1));

        let forward = doc.dep_path(&from, &to).unwrap();
        let mut backward = doc.dep_path(&to, &from).unwrap();
        backward.reverse();
        prop_assert_eq!(forward.clone(), backward);
        prop_assert!(doc.match_dep_path(&from, &[], "").unwrap());

        // One `_`-terminated step per edge.
        let rendered = doc.engine().render(&from, &forward);
        prop_assert_eq!(rendered.matches('_').count(), forward.len() + 1);
    }
}
