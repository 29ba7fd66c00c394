//! Benchmarks for the differ and the LCS engine it builds on.
//!
//! Run with: `cargo bench -p dynamorph-patch`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use dynamorph_value::DynamicValue;

fn synthetic_record(seed: i32) -> DynamicValue {
    DynamicValue::record(vec![
        ("name".into(), DynamicValue::string(format!("user-{seed}"))),
        ("age".into(), DynamicValue::i32(20 + seed % 50)),
        (
            "tags".into(),
            DynamicValue::sequence((0..20).map(|i| DynamicValue::string(format!("tag-{i}"))).collect()),
        ),
    ])
    .unwrap()
}

fn bench_record_diff(c: &mut Criterion) {
    let old = synthetic_record(1);
    let new = synthetic_record(2);

    let mut group = c.benchmark_group("record_diff");
    group.throughput(Throughput::Elements(1));
    group.bench_function("diff", |b| {
        b.iter(|| {
            let patch = dynamorph_patch::diff(black_box(&old), black_box(&new));
            black_box(patch);
        });
    });
    group.finish();
}

fn bench_string_lcs(c: &mut Criterion) {
    let old = "the quick brown fox jumps over the lazy dog".repeat(20);
    let new = "the quick brown fox leaps over the lazy doge".repeat(20);

    let mut group = c.benchmark_group("string_lcs");
    group.throughput(Throughput::Bytes(old.len() as u64));
    group.bench_function("string_lcs", |b| {
        b.iter(|| {
            let result = dynamorph_lcs::string_lcs(black_box(&old), black_box(&new));
            black_box(result);
        });
    });
    group.finish();
}

fn bench_sequence_diff(c: &mut Criterion) {
    for len in [10, 100, 1000] {
        let old: Vec<DynamicValue> = (0..len).map(DynamicValue::i32).collect();
        let mut new = old.clone();
        new.insert(len as usize / 2, DynamicValue::i32(-1));

        let old_value = DynamicValue::sequence(old);
        let new_value = DynamicValue::sequence(new);

        let mut group = c.benchmark_group(format!("sequence_diff_{len}"));
        group.throughput(Throughput::Elements(len as u64));
        group.bench_function("diff", |b| {
            b.iter(|| {
                let patch = dynamorph_patch::diff(black_box(&old_value), black_box(&new_value));
                black_box(patch);
            });
        });
        group.finish();
    }
}

criterion_group!(benches, bench_record_diff, bench_string_lcs, bench_sequence_diff);
criterion_main!(benches);
