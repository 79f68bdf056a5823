use crate::{
    dsp::DelayLine,
    error::{Result, SynthError},
    operator::{BlockCtx, Operator, OperatorBuffers},
    MAX_DELAY_SAMPLES,
};

/// Prime-spaced taps for a short chorus smear.
const CHORUS_TAPS: [usize; 7] = [13, 17, 19, 23, 29, 31, 37];
const CHORUS_GAIN: f32 = 0.7;

/// One delayed copy of the input: how far back and how loud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub delay_samples: usize,
    pub gain: f32,
}

/// Multi-tap delay: `out[n] = in[n] + sum(gain_k * in[n - delay_k])`.
///
/// History is kept in a [`DelayLine`] sized for the longest tap, so echoes
/// carry across block boundaries.
pub struct Echo {
    taps: Vec<Tap>,
    line: DelayLine,
    buffers: OperatorBuffers,
}

impl Echo {
    pub fn new(taps: &[Tap], block_capacity: usize) -> Result<Self> {
        if taps.is_empty() {
            return Err(SynthError::invalid_param("taps", "need at least one tap"));
        }
        for tap in taps {
            if tap.delay_samples == 0 || tap.delay_samples > MAX_DELAY_SAMPLES {
                return Err(SynthError::invalid_param(
                    "delay_samples",
                    format!(
                        "must be between 1 and {MAX_DELAY_SAMPLES}, got {}",
                        tap.delay_samples
                    ),
                ));
            }
            if !tap.gain.is_finite() {
                return Err(SynthError::invalid_param(
                    "gain",
                    format!("must be finite, got {}", tap.gain),
                ));
            }
        }

        let longest = taps.iter().map(|t| t.delay_samples).max().unwrap_or(1);
        let buffers = OperatorBuffers::with_capacity(block_capacity)?;

        Ok(Self {
            taps: taps.to_vec(),
            line: DelayLine::new(longest),
            buffers,
        })
    }

    /// Seven short prime-spaced taps, gain shared between them.
    ///
    /// The classic preset puts 0.7 on every tap, which lets a full-scale
    /// input reach 5.9. Here the 0.7 is split across the taps, so the wet
    /// sum never exceeds 0.7 times the peak input.
    pub fn chorus(block_capacity: usize) -> Result<Self> {
        let gain = CHORUS_GAIN / CHORUS_TAPS.len() as f32;
        let taps: Vec<Tap> = CHORUS_TAPS
            .iter()
            .map(|&delay_samples| Tap {
                delay_samples,
                gain,
            })
            .collect();
        Self::new(&taps, block_capacity)
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }
}

impl Operator for Echo {
    fn set_ins(&mut self, samples: &[f32]) {
        self.buffers.load(samples);
    }

    fn compute(&mut self, ctx: &BlockCtx) {
        if self.buffers.check_overflow(ctx) {
            return;
        }
        let (ins, outs) = self.buffers.split();
        for (out, &dry) in outs.iter_mut().zip(ins) {
            self.line.push(dry);
            let wet: f32 = self
                .taps
                .iter()
                .map(|tap| tap.gain * self.line.tap(tap.delay_samples))
                .sum();
            *out = dry + wet;
        }
        self.buffers.sanitize(ctx);
    }

    fn get_outs(&self) -> &[f32] {
        self.buffers.outs()
    }

    fn block_capacity(&self) -> usize {
        self.buffers.capacity()
    }

    fn reset(&mut self) {
        self.line.reset();
        self.buffers.clear();
    }
}
