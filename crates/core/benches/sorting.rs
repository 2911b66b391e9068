use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mtsort_core::{check, Strategy};
use mtsort_testgen::generator::generate_single_batch_seeded;

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_check");

    // One endpoint mutation per step: most executions are skipped or need a
    // narrow re-sort.
    for (labels, slots) in [(64, 96), (512, 768), (4096, 6144)] {
        let sequence = generate_single_batch_seeded(labels, labels, slots, 64, 1);
        for strategy in [Strategy::Incremental, Strategy::Full] {
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), labels),
                &sequence,
                |b, sequence| {
                    b.iter(|| check(black_box(sequence), black_box(strategy)));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
