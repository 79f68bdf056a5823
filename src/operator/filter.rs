#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{Biquad, BiquadResponse},
    error::{Result, SynthError},
    operator::{BlockCtx, Operator, OperatorBuffers},
    DEFAULT_SAMPLE_RATE,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub response: BiquadResponse,
    pub q: f32,
    pub cutoff_hz: f32,
}

/// Biquad filter applied to the operator's input.
///
/// Coefficients depend on the sample rate, so the cutoff is checked against
/// Nyquist in `prepare`, when the graph is built.
pub struct Filter {
    config: FilterConfig,
    biquad: Biquad,
    buffers: OperatorBuffers,
}

impl Filter {
    pub fn new(config: FilterConfig, block_capacity: usize) -> Result<Self> {
        if !(config.q.is_finite() && config.q > 0.0) {
            return Err(SynthError::invalid_param(
                "q",
                format!("must be positive and finite, got {}", config.q),
            ));
        }
        if !(config.cutoff_hz.is_finite() && config.cutoff_hz > 0.0) {
            return Err(SynthError::invalid_param(
                "cutoff_hz",
                format!("must be positive and finite, got {}", config.cutoff_hz),
            ));
        }
        let buffers = OperatorBuffers::with_capacity(block_capacity)?;
        let biquad = Biquad::new(config.response, config.q, config.cutoff_hz, DEFAULT_SAMPLE_RATE);

        Ok(Self {
            config,
            biquad,
            buffers,
        })
    }

    pub fn lowpass(q: f32, cutoff_hz: f32, block_capacity: usize) -> Result<Self> {
        let config = FilterConfig {
            response: BiquadResponse::LowPass,
            q,
            cutoff_hz,
        };
        Self::new(config, block_capacity)
    }

    pub fn highpass(q: f32, cutoff_hz: f32, block_capacity: usize) -> Result<Self> {
        let config = FilterConfig {
            response: BiquadResponse::HighPass,
            q,
            cutoff_hz,
        };
        Self::new(config, block_capacity)
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

impl Operator for Filter {
    fn set_ins(&mut self, samples: &[f32]) {
        self.buffers.load(samples);
    }

    fn compute(&mut self, ctx: &BlockCtx) {
        if self.buffers.check_overflow(ctx) {
            return;
        }
        let (ins, outs) = self.buffers.split();
        self.biquad.render(ins, outs);
        self.buffers.sanitize(ctx);
    }

    fn get_outs(&self) -> &[f32] {
        self.buffers.outs()
    }

    fn block_capacity(&self) -> usize {
        self.buffers.capacity()
    }

    fn prepare(&mut self, sample_rate: f32) -> Result<()> {
        let nyquist = sample_rate / 2.0;
        if self.config.cutoff_hz >= nyquist {
            return Err(SynthError::invalid_param(
                "cutoff_hz",
                format!(
                    "{} Hz is at or above Nyquist ({nyquist} Hz)",
                    self.config.cutoff_hz
                ),
            ));
        }
        self.biquad
            .design(self.config.q, self.config.cutoff_hz, sample_rate);
        Ok(())
    }

    fn reset(&mut self) {
        self.biquad.reset();
        self.buffers.clear();
    }
}
