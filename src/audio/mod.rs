//! Output device glue.
//!
//! The engine itself knows nothing about devices: anything that can call
//! [`crate::Engine::process`] with an interleaved `f32` buffer can drive it.
//! The cpal backend (feature `cpal`) opens the default output device with
//! the fixed format the engine renders: 2 channels, 32-bit float, 44.1 kHz,
//! device-chosen buffer size.

use thiserror::Error;

use crate::{config::EngineConfig, OUTPUT_CHANNELS};

#[cfg(feature = "cpal")]
mod cpal_backend;

#[cfg(feature = "cpal")]
pub use cpal_backend::{AudioStream, CpalBackend};

/// Rate the output stream is opened at.
pub const STREAM_SAMPLE_RATE: u32 = 44_100;

/// Failures while opening or controlling an output stream.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no default output device available")]
    NoDevice,

    #[error("engine renders at {engine} Hz but the stream is fixed at {stream} Hz")]
    SampleRateMismatch { engine: f32, stream: u32 },

    #[error("engine renders {engine} channels but the stream is fixed at {stream}")]
    ChannelMismatch { engine: u16, stream: u16 },

    #[cfg(feature = "cpal")]
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "cpal")]
    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[cfg(feature = "cpal")]
    #[error("failed to pause output stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),
}

/// Reject an engine whose format differs from the stream's, before any
/// device is opened.
pub fn check_stream_format(config: &EngineConfig) -> Result<(), BackendError> {
    if config.sample_rate != STREAM_SAMPLE_RATE as f32 {
        return Err(BackendError::SampleRateMismatch {
            engine: config.sample_rate,
            stream: STREAM_SAMPLE_RATE,
        });
    }
    if config.channels != OUTPUT_CHANNELS {
        return Err(BackendError::ChannelMismatch {
            engine: config.channels,
            stream: OUTPUT_CHANNELS,
        });
    }
    Ok(())
}
