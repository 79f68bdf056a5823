//! Benchmarks for the carrier's per-note phase accumulation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pmsynth::dsp::Waveform;
use pmsynth::engine::stats::EngineStats;
use pmsynth::operator::{carrier::CarrierConfig, BlockCtx};
use pmsynth::{Carrier, Note, Operator};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn carrier(config: CarrierConfig, size: usize, notes: usize) -> Carrier {
    let mut carrier = Carrier::new(config.max_notes(notes.max(1)), size).unwrap();
    for i in 0..notes {
        carrier.add_note(Note::from_midi(48 + i as u8 * 4, 0.0).unwrap());
    }
    carrier
}

pub fn bench_carrier(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators/carrier");
    let stats = EngineStats::new();
    let ctx = BlockCtx::new(SAMPLE_RATE, 0, &stats);

    for &size in BLOCK_SIZES {
        let silence = vec![0.0f32; size];
        let modulator: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 0.05).sin())
            .collect();

        // One sine note, no modulation - the baseline
        let mut op = carrier(CarrierConfig::default(), size, 1);
        group.bench_with_input(BenchmarkId::new("sine_1_note", size), &size, |b, _| {
            b.iter(|| {
                op.set_ins(black_box(&silence));
                op.compute(black_box(&ctx));
                black_box(op.get_outs());
            })
        });

        // Eight notes bent by a modulator - a full chord
        let mut op = carrier(CarrierConfig::default(), size, 8);
        group.bench_with_input(BenchmarkId::new("fm_8_notes", size), &size, |b, _| {
            b.iter(|| {
                op.set_ins(black_box(&modulator));
                op.compute(black_box(&ctx));
                black_box(op.get_outs());
            })
        });

        // Square - branch per sample instead of sin()
        let mut op = carrier(CarrierConfig::default().waveform(Waveform::Square), size, 8);
        group.bench_with_input(BenchmarkId::new("square_8_notes", size), &size, |b, _| {
            b.iter(|| {
                op.set_ins(black_box(&modulator));
                op.compute(black_box(&ctx));
                black_box(op.get_outs());
            })
        });
    }

    group.finish();
}
