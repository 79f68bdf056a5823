//! Benchmarks for the multi-tap delay operator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pmsynth::engine::stats::EngineStats;
use pmsynth::operator::{
    echo::{Echo, Tap},
    BlockCtx,
};
use pmsynth::Operator;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_echo(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators/echo");
    let stats = EngineStats::new();
    let ctx = BlockCtx::new(SAMPLE_RATE, 0, &stats);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 0.1).sin())
            .collect();

        // Single long echo - 250ms
        let tap = Tap {
            delay_samples: 11_025,
            gain: 0.5,
        };
        let mut echo = Echo::new(&[tap], size).unwrap();
        group.bench_with_input(BenchmarkId::new("single_tap", size), &size, |b, _| {
            b.iter(|| {
                echo.set_ins(black_box(&input));
                echo.compute(black_box(&ctx));
                black_box(echo.get_outs());
            })
        });

        // Seven short taps
        let mut chorus = Echo::chorus(size).unwrap();
        group.bench_with_input(BenchmarkId::new("chorus", size), &size, |b, _| {
            b.iter(|| {
                chorus.set_ins(black_box(&input));
                chorus.compute(black_box(&ctx));
                black_box(chorus.get_outs());
            })
        });
    }

    group.finish();
}
