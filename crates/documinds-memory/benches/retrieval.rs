//! Federated memory benchmarks
//!
//! - Lexical scoring cost by text length
//! - Ranking a candidate set by size

use std::sync::Arc;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use documinds_common::Role;
use documinds_memory::{
    InMemoryBackend, KeyDeriver, LexicalRanker, MemoryRecord, MemoryRetriever, Metadata,
    RelevanceRanker, RetrievalConfig,
};

const WORDS: [&str; 12] = [
    "revenue", "growth", "invoice", "total", "contract", "renewal", "margin", "survey",
    "employee", "payment", "terms", "quarter",
];

fn text(len: usize, offset: usize) -> String {
    (0..len)
        .map(|i| WORDS[(i + offset) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_lexical_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexical_score");
    let ranker = LexicalRanker::default();

    for words in [4usize, 32, 256].iter() {
        group.bench_with_input(BenchmarkId::new("words", words), words, |b, &words| {
            let query = text(4, 0);
            let fact = text(words, 3);
            b.iter(|| ranker.score(black_box(&query), black_box(&fact), "analyzer"));
        });
    }

    group.finish();
}

fn bench_rank_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    let retriever = MemoryRetriever::new(
        Arc::new(InMemoryBackend::new()),
        KeyDeriver::default(),
        Arc::new(LexicalRanker::default()),
        RetrievalConfig::default(),
    );

    for size in [100usize, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        let candidates: Vec<MemoryRecord> = (0..*size)
            .map(|i| MemoryRecord {
                fact: text(8, i),
                metadata: Metadata::new(),
                stored_at: Utc::now(),
                perspectives: vec![Role::analyzer()],
                lens_keywords: vec![],
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("candidates", size), &candidates, |b, candidates| {
            b.iter(|| {
                retriever.rank(
                    "analyzer",
                    black_box("revenue growth invoice total"),
                    candidates.clone(),
                    10,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lexical_score, bench_rank_candidates);
criterion_main!(benches);
