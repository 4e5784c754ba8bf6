//! Benchmarks for junction tree construction
//!
//! Compares the three admission strategies when growing a tree over a
//! pairwise grid model, plus one-shot min-fill over the whole grid.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jtgrow::{
    build_min_fill_tree, grow_junction_tree, AdmissionStrategy, GrowthConfig, Incidence, Mrf,
    VarId,
};
use std::hint::black_box;

fn bench_growth_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth");

    for side in [8usize, 16, 32] {
        let mrf = Mrf::grid(side, side, 2);
        let root = (side / 2 * side + side / 2) as VarId;
        group.throughput(Throughput::Elements((side * side) as u64));

        for strategy in AdmissionStrategy::ALL {
            // replay and min-fill revalidate everything per offer
            if strategy != AdmissionStrategy::Incremental && side > 16 {
                continue;
            }
            let config = GrowthConfig::default().with_strategy(strategy);
            group.bench_with_input(
                BenchmarkId::new(strategy.as_str(), side),
                &mrf,
                |b, mrf| {
                    b.iter(|| black_box(grow_junction_tree(mrf, root, &config).unwrap()));
                },
            );
        }
    }

    group.finish();
}

fn bench_min_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("min_fill");

    for side in [8usize, 16, 24] {
        let mrf = Mrf::grid(side, side, 2);
        let n = (side * side) as VarId;
        group.bench_with_input(BenchmarkId::new("order", side), &mrf, |b, mrf| {
            let incidence = Incidence::from_network(mrf, 0..n).unwrap();
            b.iter(|| black_box(jtgrow::min_fill_order(&incidence, 4 * side).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("tree", side), &mrf, |b, mrf| {
            b.iter(|| black_box(build_min_fill_tree(mrf, 4 * side).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_growth_strategies, bench_min_fill);
criterion_main!(benches);
