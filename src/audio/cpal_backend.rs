use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::{
    engine::stats::{EngineStats, Fault},
    Engine, OUTPUT_CHANNELS,
};

use super::{check_stream_format, BackendError, STREAM_SAMPLE_RATE};

/// Opens the default output device and hands it an [`Engine`].
pub struct CpalBackend;

impl CpalBackend {
    /// Move `engine` into a new output stream and start it.
    ///
    /// The engine's sample rate and channel count must match the stream's,
    /// so the oscillators never run at the wrong pitch or width.
    pub fn start(mut engine: Engine) -> Result<AudioStream, BackendError> {
        check_stream_format(engine.config())?;

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(BackendError::NoDevice)?;
        if let Ok(name) = device.name() {
            log::info!("opening output device '{name}'");
        }

        let config = cpal::StreamConfig {
            channels: OUTPUT_CHANNELS,
            sample_rate: cpal::SampleRate(STREAM_SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };
        let channels = config.channels as usize;

        let stats = engine.stats();
        let err_stats = stats.clone();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                engine.process(data, channels);
            },
            move |err| {
                log::error!("audio stream error: {err}");
                err_stats.record_fault(Fault::Backend);
            },
            None,
        )?;
        stream.play()?;

        log::info!(
            "stream started: {} channels, {} Hz, f32",
            OUTPUT_CHANNELS,
            STREAM_SAMPLE_RATE
        );
        Ok(AudioStream { stream, stats })
    }
}

/// A running output stream. Dropping it stops playback.
pub struct AudioStream {
    stream: cpal::Stream,
    stats: Arc<EngineStats>,
}

impl AudioStream {
    pub fn play(&self) -> Result<(), BackendError> {
        self.stream.play()?;
        Ok(())
    }

    pub fn pause(&self) -> Result<(), BackendError> {
        self.stream.pause()?;
        Ok(())
    }

    /// Counters of the engine running inside the stream.
    pub fn stats(&self) -> Arc<EngineStats> {
        self.stats.clone()
    }
}
