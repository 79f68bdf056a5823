//! Benchmarks for the biquad filter operator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pmsynth::engine::stats::EngineStats;
use pmsynth::operator::{filter::Filter, BlockCtx};
use pmsynth::Operator;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators/filter");
    let stats = EngineStats::new();
    let ctx = BlockCtx::new(SAMPLE_RATE, 0, &stats);

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp, plenty of highs to remove
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut filter = Filter::lowpass(0.707, 1_000.0, size).unwrap();
        filter.prepare(SAMPLE_RATE).unwrap();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                filter.set_ins(black_box(&input));
                filter.compute(black_box(&ctx));
                black_box(filter.get_outs());
            })
        });

        let mut filter = Filter::highpass(0.707, 1_000.0, size).unwrap();
        filter.prepare(SAMPLE_RATE).unwrap();
        group.bench_with_input(BenchmarkId::new("highpass", size), &size, |b, _| {
            b.iter(|| {
                filter.set_ins(black_box(&input));
                filter.compute(black_box(&ctx));
                black_box(filter.get_outs());
            })
        });
    }

    group.finish();
}
