//! Stream-level configuration shared by the graph and the engine.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SynthError},
    DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE, OUTPUT_CHANNELS,
};

/// Parameters negotiated with the audio backend.
///
/// - sample_rate: fixed stream rate in Hz (44100 by default)
/// - channels: interleaved output channels (stereo by default)
/// - max_block_size: frames rendered per graph evaluation; longer callbacks
///   are split into chunks of this size
/// - note_queue_capacity: slots in the control → audio note ring
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub channels: u16,
    pub max_block_size: usize,
    pub note_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: OUTPUT_CHANNELS,
            max_block_size: MAX_BLOCK_SIZE,
            note_queue_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_max_block_size(mut self, frames: usize) -> Self {
        self.max_block_size = frames;
        self
    }

    pub fn with_note_queue_capacity(mut self, slots: usize) -> Self {
        self.note_queue_capacity = slots;
        self
    }

    /// Check every field before anything is allocated for the stream.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(SynthError::InvalidBlockSize {
                size: self.max_block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if self.channels == 0 {
            return Err(SynthError::invalid_param("channels", "need at least one output channel"));
        }
        if self.note_queue_capacity == 0 {
            return Err(SynthError::invalid_param(
                "note_queue_capacity",
                "note ring needs at least one slot",
            ));
        }
        Ok(())
    }
}
