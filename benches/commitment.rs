use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stealth_core::commitment::{add_commitments, commit, verify_opening};

fn bench_commit(c: &mut Criterion) {
    c.bench_function("commit", |b| {
        b.iter(|| commit(black_box(1_000)).unwrap());
    });
}

fn bench_verify_opening(c: &mut Criterion) {
    let commitment = commit(1_000).unwrap();
    c.bench_function("verify_opening", |b| {
        b.iter(|| {
            verify_opening(
                black_box(&commitment.commitment),
                black_box(1_000),
                black_box(&commitment.blinding),
            )
        });
    });
}

fn bench_add_commitments(c: &mut Criterion) {
    let c1 = commit(100).unwrap();
    let c2 = commit(250).unwrap();
    c.bench_function("add_commitments", |b| {
        b.iter(|| add_commitments(black_box(&c1.commitment), black_box(&c2.commitment)));
    });
}

criterion_group!(benches, bench_commit, bench_verify_opening, bench_add_commitments);
criterion_main!(benches);
