//! Benchmarks for complete FM patches.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pmsynth::engine::stats::EngineStats;
use pmsynth::operator::{
    carrier::CarrierConfig,
    echo::Echo,
    filter::Filter,
    BlockCtx,
};
use pmsynth::{Carrier, Engine, EngineConfig, GraphBuilder, Note, OperatorGraph, OperatorId};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const CHORD: [u8; 4] = [48, 55, 60, 64];

fn sounding(config: CarrierConfig, size: usize) -> Carrier {
    let mut carrier = Carrier::new(config, size).unwrap();
    for &midi in &CHORD {
        carrier.add_note(Note::from_midi(midi, 0.0).unwrap());
    }
    carrier
}

/// modulator -> carrier
fn two_op(size: usize) -> GraphBuilder {
    let mut builder = GraphBuilder::new();
    let modulator = builder.add(sounding(CarrierConfig::with_ratio(2.0), size));
    let carrier = builder.add(sounding(CarrierConfig::with_ratio(1.0), size));
    builder.connect(modulator, carrier).unwrap();
    builder
}

/// two modulators -> carrier -> lowpass -> chorus
fn full_chain(size: usize) -> GraphBuilder {
    let mut builder = GraphBuilder::new();
    let bright = builder.add(sounding(CarrierConfig::with_ratio(3.0).amplitude(0.5), size));
    let low = builder.add(sounding(CarrierConfig::with_ratio(0.5).amplitude(0.5), size));
    let carrier = builder.add(sounding(CarrierConfig::with_ratio(1.0), size));
    let lowpass = builder.add(Filter::lowpass(0.707, 2_500.0, size).unwrap());
    let chorus = builder.add(Echo::chorus(size).unwrap());
    let ids: [OperatorId; 3] = [carrier, lowpass, chorus];
    builder.connect(bright, carrier).unwrap();
    builder.connect(low, carrier).unwrap();
    builder.chain(&ids).unwrap();
    builder
}

fn build(builder: GraphBuilder, size: usize) -> OperatorGraph {
    let config = EngineConfig::default()
        .with_sample_rate(SAMPLE_RATE)
        .with_max_block_size(size);
    builder.build(&config).unwrap()
}

pub fn bench_patches(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/patches");
    let stats = EngineStats::new();

    for &size in BLOCK_SIZES {
        let mut graph = build(two_op(size), size);
        let mut start = 0u64;
        group.bench_with_input(BenchmarkId::new("two_op", size), &size, |b, _| {
            b.iter(|| {
                let ctx = BlockCtx::new(SAMPLE_RATE, start, &stats);
                black_box(graph.evaluate(size, black_box(&ctx)));
                start += size as u64;
            })
        });

        let mut graph = build(full_chain(size), size);
        let mut start = 0u64;
        group.bench_with_input(BenchmarkId::new("full_chain", size), &size, |b, _| {
            b.iter(|| {
                let ctx = BlockCtx::new(SAMPLE_RATE, start, &stats);
                black_box(graph.evaluate(size, black_box(&ctx)));
                start += size as u64;
            })
        });
    }

    group.finish();
}

pub fn bench_callback(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/callback");

    for &size in BLOCK_SIZES {
        let config = EngineConfig::default()
            .with_sample_rate(SAMPLE_RATE)
            .with_max_block_size(size);
        let (mut engine, _handle) = Engine::new(config, full_chain(size)).unwrap();
        let mut output = vec![0.0f32; size * 2];

        // Stereo callback of exactly one block
        group.bench_with_input(BenchmarkId::new("stereo", size), &size, |b, _| {
            b.iter(|| {
                black_box(engine.process(black_box(&mut output), 2));
            })
        });
    }

    group.finish();
}
