use criterion::{criterion_group, criterion_main, Criterion};
use docsearch_core::tokenizer::normalize;

fn bench_normalize(c: &mut Criterion) {
    let text = "The quick brown fox jumps over the lazy dog while searching \
                engines index documents, compute term frequencies, and rank \
                results against free-text queries. "
        .repeat(200);
    c.bench_function("normalize_paragraphs", |b| b.iter(|| normalize(&text)));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
