//! Performance benchmarks for dependency-path queries and the NAF codec.
//!
//! Run with: `cargo bench --bench dep_path`
//!
//! | Operation | Notes |
//! |-----------|-------|
//! | Path matching, cold | Pattern compiled on a fresh engine |
//! | Path matching, cached | Compiled pattern reused |
//! | Engine contention | Shared engine across threads |
//! | Codec round-trip | Encode + decode, by sentence count |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::thread;

use naf_kernel::{DepPathEngine, Document, Span, TermId};

const LABELS: [&str; 4] = ["nsubj", "dobj", "amod", "nmod"];

/// Document of `sentences` sentences of `width` terms; each term depends on
/// the previous one of its sentence.
fn chain_document(engine: Arc<DepPathEngine>, sentences: u32, width: usize) -> Document {
    let mut doc = Document::with_engine("en", "v3", engine);
    for sent in 1..=sentences {
        let mut previous: Option<TermId> = None;
        for i in 0..width {
            let wf = doc.new_wf(format!("tok{}", i), sent).unwrap().id().clone();
            let term = doc.new_term(Span::from_targets(vec![wf])).unwrap().id().clone();
            if let Some(gov) = previous {
                doc.new_dep(&gov, &term, LABELS[i % LABELS.len()]).unwrap();
            }
            previous = Some(term);
        }
    }
    doc
}

/// Benchmark matching with a cold pattern cache.
fn bench_match_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_cold");

    for width in [4, 16, 64] {
        let doc = chain_document(Arc::new(DepPathEngine::new()), 1, width);
        let from = TermId::new(format!("t{}", width));
        let path = doc.dep_path(&from, &TermId::new("t1")).unwrap();
        let pattern = "(-nsubj|-dobj|-amod|-nmod)*";

        group.throughput(Throughput::Elements(path.len() as u64));
        group.bench_with_input(BenchmarkId::new("width", width), &path, |b, path| {
            b.iter(|| {
                let engine = DepPathEngine::new();
                let matched = engine.matches(black_box(&from), path, pattern).unwrap();
                assert!(matched);
                matched
            })
        });
    }

    group.finish();
}

/// Benchmark matching with the pattern already compiled.
fn bench_match_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_cached");

    for width in [4, 16, 64] {
        let doc = chain_document(Arc::new(DepPathEngine::new()), 1, width);
        let from = TermId::new(format!("t{}", width));
        let path = doc.dep_path(&from, &TermId::new("t1")).unwrap();
        let pattern = "(-nsubj|-dobj|-amod|-nmod)*";
        assert!(doc.match_dep_path(&from, &path, pattern).unwrap());

        group.throughput(Throughput::Elements(path.len() as u64));
        group.bench_with_input(BenchmarkId::new("width", width), &path, |b, path| {
            b.iter(|| doc.match_dep_path(black_box(&from), path, pattern).unwrap())
        });
    }

    group.finish();
}

/// Benchmark a shared engine queried from several threads.
fn bench_engine_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_contention");

    for num_threads in [1, 2, 4, 8] {
        let engine = Arc::new(DepPathEngine::new());
        let docs: Vec<Arc<Document>> = (0..num_threads)
            .map(|_| Arc::new(chain_document(Arc::clone(&engine), 1, 16)))
            .collect();

        group.bench_with_input(BenchmarkId::new("threads", num_threads), &docs, |b, docs| {
            b.iter(|| {
                let handles: Vec<_> = docs
                    .iter()
                    .map(|doc| {
                        let doc = Arc::clone(doc);
                        thread::spawn(move || {
                            let from = TermId::new("t16");
                            let path = doc.dep_path(&from, &TermId::new("t1")).unwrap();
                            (0..100)
                                .filter(|_| doc.match_dep_path(&from, &path, "(-nsubj|-dobj|-amod|-nmod)*").unwrap())
                                .count()
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).sum::<usize>()
            })
        });
    }

    group.finish();
}

/// Benchmark encode + decode of whole documents.
fn bench_codec_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_round_trip");

    for sentences in [1, 10, 50] {
        let doc = chain_document(DepPathEngine::shared(), sentences, 20);

        group.throughput(Throughput::Elements(sentences as u64));
        group.bench_with_input(BenchmarkId::new("sentences", sentences), &doc, |b, doc| {
            b.iter(|| {
                let text = doc.to_naf_string();
                let back: Document = black_box(text).parse().unwrap();
                back
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_match_cold,
    bench_match_cached,
    bench_engine_contention,
    bench_codec_round_trip,
);
criterion_main!(benches);
