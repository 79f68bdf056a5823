//! The callback adapter between the audio backend and the operator graph.
//!
//! [`Engine::process`] is what the backend's real-time callback calls. Per
//! invocation it drains pending note messages, splits the buffer into blocks
//! the graph can hold, advances the sample clock, evaluates the graph and
//! copies the mono result into every output channel. It never allocates,
//! locks or returns an error; problems are counted in [`EngineStats`].

/// Sample-count clock; the only time source.
pub mod clock;
/// Lock-free note handoff from the control thread.
pub mod message;
/// Fault and throughput counters readable from any thread.
pub mod stats;

use std::sync::Arc;

use rtrb::Consumer;

use crate::{
    config::EngineConfig,
    error::Result,
    graph::{GraphBuilder, OperatorGraph, OperatorId},
    note::Note,
    operator::{carrier::Carrier, BlockCtx},
};

pub use self::message::NoteHandle;

use self::{
    clock::SampleClock,
    message::{note_channel, NoteCommand, NoteMessage},
    stats::{EngineStats, Fault},
};

/// What the callback tells the backend. Stopping the stream is the
/// backend owner's decision, so the engine always asks to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    Continue,
}

pub struct Engine {
    graph: OperatorGraph,
    clock: SampleClock,
    rx: Consumer<NoteMessage>,
    stats: Arc<EngineStats>,
    config: EngineConfig,
}

impl Engine {
    /// Validate and build the graph, and open the note ring.
    ///
    /// Returns the engine (to be moved into the audio callback) and the
    /// handle the control thread uses to schedule notes.
    pub fn new(config: EngineConfig, builder: GraphBuilder) -> Result<(Self, NoteHandle)> {
        let graph = builder.build(&config)?;
        let (handle, rx) = note_channel(config.note_queue_capacity, graph.carrier_ids());

        log::info!(
            "engine ready: {} operators, {} Hz, {} channels, blocks of {} frames",
            graph.len(),
            config.sample_rate,
            config.channels,
            graph.block_size()
        );

        let engine = Self {
            graph,
            clock: SampleClock::new(config.sample_rate),
            rx,
            stats: Arc::new(EngineStats::new()),
            config,
        };
        Ok((engine, handle))
    }

    /// Fill an interleaved output buffer of `output.len() / channels` frames.
    pub fn process(&mut self, output: &mut [f32], channels: usize) -> CallbackStatus {
        self.drain_messages();

        if channels == 0 {
            output.fill(0.0);
            self.stats.record_fault(Fault::BadChannelCount);
            return CallbackStatus::Continue;
        }

        let total_frames = output.len() / channels;
        let block = self.graph.block_size();
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames = (total_frames - frames_written).min(block);
            let start = self.clock.advance(frames);
            let ctx = BlockCtx::new(self.clock.sample_rate(), start, &self.stats);
            let mono = self.graph.evaluate(frames, &ctx);

            let out_off = frames_written * channels;
            let dest = &mut output[out_off..out_off + frames * channels];
            for (frame, &sample) in dest.chunks_exact_mut(channels).zip(mono) {
                let sample = if sample.is_finite() {
                    sample
                } else {
                    self.stats.record_fault(Fault::NonFinite);
                    0.0
                };
                frame.fill(sample);
            }

            self.stats.record_block(frames);
            frames_written += frames;
        }

        // A trailing partial frame cannot be rendered; keep it silent.
        output[total_frames * channels..].fill(0.0);

        CallbackStatus::Continue
    }

    /// Apply every queued note message. Never waits.
    fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.pop() {
            // The handle filters targets on the control thread; a ring whose
            // producer was built for another graph still lands here.
            let Some(carrier) = self.graph.carrier_mut(message.carrier) else {
                self.stats.record_fault(Fault::UnknownTarget);
                continue;
            };
            match message.command {
                NoteCommand::On(note) => {
                    if !carrier.add_note(note) {
                        self.stats.record_fault(Fault::NoteCapacity);
                    }
                }
                NoteCommand::Off(note) => {
                    carrier.remove_note(&note);
                }
                NoteCommand::AllOff => carrier.clear_notes(),
            }
        }
    }

    /// Schedule a note directly. Only possible while the engine is still
    /// owned by the control thread, before it moves into the callback.
    pub fn schedule(&mut self, carrier: OperatorId, note: Note) -> Result<bool> {
        let target = self
            .carrier_mut(carrier)
            .ok_or(crate::error::SynthError::NotACarrier(carrier))?;
        Ok(target.add_note(note))
    }

    pub fn carrier_mut(&mut self, id: OperatorId) -> Option<&mut Carrier> {
        self.graph.carrier_mut(id)
    }

    pub fn stats(&self) -> Arc<EngineStats> {
        self.stats.clone()
    }

    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    pub fn graph(&self) -> &OperatorGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::SynthError,
        operator::carrier::{Carrier, CarrierConfig},
    };

    const BLOCK: usize = 64;

    fn config() -> EngineConfig {
        EngineConfig::default().with_max_block_size(BLOCK)
    }

    fn single_carrier(config: CarrierConfig) -> (Engine, NoteHandle, OperatorId) {
        let mut builder = GraphBuilder::new();
        let id = builder.add(Carrier::new(config, BLOCK).unwrap());
        let (engine, handle) = Engine::new(self::config(), builder).unwrap();
        (engine, handle, id)
    }

    #[test]
    fn duplicates_mono_into_stereo() {
        let (mut engine, _handle, id) = single_carrier(CarrierConfig::default());
        engine.schedule(id, Note::new(440.0, 0.0).unwrap()).unwrap();

        let mut output = vec![0.0; BLOCK * 2];
        assert_eq!(engine.process(&mut output, 2), CallbackStatus::Continue);

        for frame in output.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!(output.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn clock_advances_by_frames() {
        let (mut engine, _handle, _) = single_carrier(CarrierConfig::default());
        let mut output = vec![0.0; 100 * 2];
        engine.process(&mut output, 2);
        assert_eq!(engine.clock().position(), 100);

        let mut output = vec![0.0; 37 * 2];
        engine.process(&mut output, 2);
        assert_eq!(engine.clock().position(), 137);
    }

    #[test]
    fn long_callbacks_are_split_into_blocks() {
        let (mut engine, _handle, _) = single_carrier(CarrierConfig::default());
        let stats = engine.stats();

        let mut output = vec![0.0; (BLOCK * 2 + 10) * 2];
        engine.process(&mut output, 2);

        assert_eq!(stats.blocks_rendered(), 3);
        assert_eq!(stats.frames_rendered(), (BLOCK * 2 + 10) as u64);
    }

    #[test]
    fn rendering_is_independent_of_callback_size() {
        let render = |sizes: &[usize]| {
            let (mut engine, _handle, id) = single_carrier(CarrierConfig::default());
            engine.schedule(id, Note::new(523.25, 0.001).unwrap()).unwrap();
            let mut all = Vec::new();
            for &frames in sizes {
                let mut output = vec![0.0; frames];
                engine.process(&mut output, 1);
                all.extend_from_slice(&output);
            }
            all
        };

        let steady = render(&[BLOCK; 4]);
        let jittery = render(&[10, 100, 3, 143]);
        assert_eq!(steady.len(), jittery.len());
        for (a, b) in steady.iter().zip(&jittery) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn handle_notes_apply_at_next_callback() {
        let (mut engine, mut handle, id) = single_carrier(CarrierConfig::default());
        let mut output = vec![0.0; BLOCK];

        engine.process(&mut output, 1);
        assert!(output.iter().all(|&s| s == 0.0));

        let note = Note::new(440.0, 0.0).unwrap();
        handle.note_on(id, note).unwrap();
        engine.process(&mut output, 1);
        assert!(output.iter().any(|&s| s != 0.0));

        handle.note_off(id, note).unwrap();
        engine.process(&mut output, 1);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn all_notes_off_silences_carrier() {
        let (mut engine, mut handle, id) = single_carrier(CarrierConfig::default());
        handle.note_on(id, Note::new(220.0, 0.0).unwrap()).unwrap();
        handle.note_on(id, Note::new(330.0, 0.0).unwrap()).unwrap();
        handle.all_notes_off(id).unwrap();

        let mut output = vec![1.0; BLOCK];
        engine.process(&mut output, 1);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn full_carrier_counts_dropped_note() {
        let (mut engine, mut handle, id) = single_carrier(CarrierConfig::default().max_notes(1));
        handle.note_on(id, Note::new(220.0, 0.0).unwrap()).unwrap();
        handle.note_on(id, Note::new(330.0, 0.0).unwrap()).unwrap();

        let mut output = vec![0.0; BLOCK];
        engine.process(&mut output, 1);
        assert_eq!(engine.stats().fault_count(Fault::NoteCapacity), 1);
    }

    #[test]
    fn zero_channels_is_a_fault_not_a_panic() {
        let (mut engine, _handle, _) = single_carrier(CarrierConfig::default());
        let mut output = vec![1.0; 16];
        assert_eq!(engine.process(&mut output, 0), CallbackStatus::Continue);
        assert!(output.iter().all(|&s| s == 0.0));
        assert_eq!(engine.stats().fault_count(Fault::BadChannelCount), 1);
    }

    #[test]
    fn partial_trailing_frame_is_silent() {
        let (mut engine, _handle, id) = single_carrier(CarrierConfig::default());
        engine.schedule(id, Note::new(440.0, 0.0).unwrap()).unwrap();

        let mut output = vec![1.0; 2 * 10 + 1];
        engine.process(&mut output, 2);
        assert_eq!(output[20], 0.0);
        assert_eq!(engine.clock().position(), 10);
    }

    #[test]
    fn messages_for_unknown_carriers_are_counted() {
        let (mut engine, _handle, id) = single_carrier(CarrierConfig::default());
        let ghost = OperatorId::from_index(5);

        // A producer that believes `ghost` is a carrier.
        let (mut stray, rx) = note_channel(4, vec![ghost, id]);
        engine.rx = rx;

        stray.note_on(ghost, Note::new(440.0, 0.0).unwrap()).unwrap();
        stray.note_on(id, Note::new(220.0, 0.0).unwrap()).unwrap();

        let mut output = vec![0.0; BLOCK];
        engine.process(&mut output, 1);

        assert_eq!(engine.stats().fault_count(Fault::UnknownTarget), 1);
        assert_eq!(engine.carrier_mut(id).unwrap().note_count(), 1);
        assert!(output.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn schedule_rejects_non_carriers() {
        let (mut engine, _handle, _) = single_carrier(CarrierConfig::default());
        let ghost = OperatorId::from_index(9);
        assert_eq!(
            engine.schedule(ghost, Note::new(440.0, 0.0).unwrap()),
            Err(SynthError::NotACarrier(ghost))
        );
    }
}
