use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::Waveform,
    engine::stats::Fault,
    error::{Result, SynthError},
    note::Note,
    operator::{BlockCtx, Operator, OperatorBuffers},
    MAX_NOTES_PER_CARRIER,
};

/*
Carrier
=======

A carrier turns scheduled notes into sound. Each note owns a phase
accumulator; every frame the carrier evaluates the waveform at that phase and
then advances it by one sample's worth of the note's instantaneous frequency.

Frequency Modulation
--------------------

The carrier's input buffer is the modulator signal (the summed output of its
upstream operators, or silence). For frame i:

    f = note.freq_hz * freq_ratio * (1 + modulation_depth * in[i])
    out[i] += waveform(phase)
    phase  += TAU * f / sample_rate          (wrapped to [0, TAU))

With no modulator the input is all zeros and each note is a plain periodic
tone at freq_hz * freq_ratio, phase-continuous across blocks because the
accumulator lives in the carrier, not in the block.

Feedback
--------

A note can also modulate itself. Its previous raw sample, scaled by
`feedback`, is added to the phase it is read at:

    out[i] += waveform(phase + feedback * last)
    last    = waveform(phase + feedback * last)

`last` is per note and starts at 0, so `feedback = 0` renders exactly the
plain tone. The graph rejects cycles, so this is the only way to get a
self-modulated carrier.

Timing
------

A note sounds from the first frame whose clock time is >= its onset. Its phase
is 0 at that frame, so a sine note at onset 0 renders sin(TAU * f * n / sr).
Notes stay active until removed.

Mixing
------

Simultaneous notes are summed, then `amplitude` and the mix policy apply:

  Sum       raw sum, may exceed [-1, 1]
  Clamp     sum hard-clipped to [-1, 1]
  Headroom  sum divided by max_notes; can never exceed amplitude
*/

/// How simultaneous notes are combined.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixPolicy {
    Sum,
    #[default]
    Clamp,
    Headroom,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierConfig {
    /// Output frequency relative to the note frequency. Must be > 0.
    pub freq_ratio: f32,
    /// Scales the modulator input before it bends the frequency.
    pub modulation_depth: f32,
    pub amplitude: f32,
    pub waveform: Waveform,
    pub mix: MixPolicy,
    /// Phase offset per unit of the note's previous sample.
    pub feedback: f32,
    /// Notes held at once; storage is reserved up front.
    pub max_notes: usize,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            freq_ratio: 1.0,
            modulation_depth: 1.0,
            amplitude: 1.0,
            waveform: Waveform::Sine,
            mix: MixPolicy::Clamp,
            feedback: 0.0,
            max_notes: 16,
        }
    }
}

impl CarrierConfig {
    pub fn with_ratio(freq_ratio: f32) -> Self {
        Self {
            freq_ratio,
            ..Self::default()
        }
    }

    pub fn modulation_depth(mut self, depth: f32) -> Self {
        self.modulation_depth = depth;
        self
    }

    pub fn amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn mix(mut self, mix: MixPolicy) -> Self {
        self.mix = mix;
        self
    }

    pub fn feedback(mut self, feedback: f32) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn max_notes(mut self, max_notes: usize) -> Self {
        self.max_notes = max_notes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.freq_ratio.is_finite() && self.freq_ratio > 0.0) {
            return Err(SynthError::InvalidFreqRatio(self.freq_ratio));
        }
        if !self.modulation_depth.is_finite() {
            return Err(SynthError::invalid_param(
                "modulation_depth",
                format!("must be finite, got {}", self.modulation_depth),
            ));
        }
        if !self.feedback.is_finite() {
            return Err(SynthError::invalid_param(
                "feedback",
                format!("must be finite, got {}", self.feedback),
            ));
        }
        if !(self.amplitude.is_finite() && self.amplitude >= 0.0) {
            return Err(SynthError::invalid_param(
                "amplitude",
                format!("must be finite and non-negative, got {}", self.amplitude),
            ));
        }
        if self.max_notes == 0 || self.max_notes > MAX_NOTES_PER_CARRIER {
            return Err(SynthError::invalid_param(
                "max_notes",
                format!(
                    "must be between 1 and {MAX_NOTES_PER_CARRIER}, got {}",
                    self.max_notes
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Voice {
    note: Note,
    phase: f64,
    /// Previous raw sample, fed back into the phase.
    last: f32,
}

pub struct Carrier {
    config: CarrierConfig,
    voices: Vec<Voice>,
    buffers: OperatorBuffers,
}

impl Carrier {
    /// Build a carrier; invalid configuration is rejected here, never in
    /// `compute`.
    pub fn new(config: CarrierConfig, block_capacity: usize) -> Result<Self> {
        config.validate()?;
        let buffers = OperatorBuffers::with_capacity(block_capacity)?;

        Ok(Self {
            config,
            voices: Vec::with_capacity(config.max_notes),
            buffers,
        })
    }

    /// Sine carrier with default settings and the given ratio.
    pub fn with_ratio(freq_ratio: f32, block_capacity: usize) -> Result<Self> {
        Self::new(CarrierConfig::with_ratio(freq_ratio), block_capacity)
    }

    pub fn config(&self) -> &CarrierConfig {
        &self.config
    }

    pub fn freq_ratio(&self) -> f32 {
        self.config.freq_ratio
    }

    /// Schedule a note. Returns false when `max_notes` are already held.
    pub fn add_note(&mut self, note: Note) -> bool {
        if self.voices.len() >= self.config.max_notes {
            return false;
        }
        self.voices.push(Voice {
            note,
            phase: 0.0,
            last: 0.0,
        });
        true
    }

    /// Drop a previously added note (same frequency and onset).
    pub fn remove_note(&mut self, note: &Note) -> bool {
        match self.voices.iter().position(|v| v.note.same_event(note)) {
            Some(idx) => {
                self.voices.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear_notes(&mut self) {
        self.voices.clear();
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.voices.iter().map(|v| &v.note)
    }

    pub fn note_count(&self) -> usize {
        self.voices.len()
    }

    fn apply_mix(&mut self) {
        let amplitude = self.config.amplitude;
        let (_, outs) = self.buffers.split();
        match self.config.mix {
            MixPolicy::Sum => outs.iter_mut().for_each(|s| *s *= amplitude),
            MixPolicy::Clamp => outs
                .iter_mut()
                .for_each(|s| *s = (*s * amplitude).clamp(-1.0, 1.0)),
            MixPolicy::Headroom => {
                let gain = amplitude / self.config.max_notes as f32;
                outs.iter_mut().for_each(|s| *s *= gain);
            }
        }
    }
}

impl Operator for Carrier {
    fn set_ins(&mut self, samples: &[f32]) {
        self.buffers.load(samples);
    }

    fn compute(&mut self, ctx: &BlockCtx) {
        if self.buffers.check_overflow(ctx) {
            return;
        }

        let waveform = self.config.waveform;
        let ratio = self.config.freq_ratio as f64;
        let depth = self.config.modulation_depth as f64;
        let feedback = self.config.feedback as f64;
        let step = TAU / ctx.sample_rate as f64;

        let (ins, outs) = self.buffers.split();
        outs.fill(0.0);

        for voice in self.voices.iter_mut() {
            let base = voice.note.freq_hz() as f64 * ratio;

            for (frame, (out, &modulation)) in outs.iter_mut().zip(ins).enumerate() {
                if !voice.note.is_active_at(ctx.time_at(frame)) {
                    continue;
                }

                let read = if feedback == 0.0 {
                    voice.phase
                } else {
                    (voice.phase + feedback * voice.last as f64).rem_euclid(TAU)
                };
                let sample = waveform.evaluate(read as f32);
                voice.last = if sample.is_finite() { sample } else { 0.0 };
                *out += sample;

                let freq = base * (1.0 + depth * modulation as f64);
                let next = (voice.phase + step * freq).rem_euclid(TAU);
                voice.phase = if next.is_finite() {
                    next
                } else {
                    ctx.stats.record_fault(Fault::NonFinite);
                    0.0
                };
            }
        }

        self.apply_mix();
        self.buffers.sanitize(ctx);
    }

    fn get_outs(&self) -> &[f32] {
        self.buffers.outs()
    }

    fn block_capacity(&self) -> usize {
        self.buffers.capacity()
    }

    fn reset(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.phase = 0.0;
            voice.last = 0.0;
        }
        self.buffers.clear();
    }
}
