//! pmsynth - plays a short FM phrase on the default output device
//!
//! Run with: cargo run --features cpal
//! Set RUST_LOG=debug to see the graph build.

use std::{thread, time::Duration};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use pmsynth::{
    audio::CpalBackend,
    engine::message::NoteHandle,
    operator::{carrier::CarrierConfig, filter::Filter},
    Carrier, Engine, EngineConfig, GraphBuilder, Note, OperatorId,
};

/// MIDI note and how long it sounds, in seconds.
const PHRASE: [(u8, f32); 6] = [
    (48, 0.4),
    (55, 0.4),
    (60, 0.4),
    (63, 0.8),
    (58, 0.4),
    (60, 1.2),
];

const BLOCK: usize = 512;

/// Control-side view of the patch: the note handle and the carriers that
/// every note is sent to.
struct Voice {
    handle: NoteHandle,
    modulator: OperatorId,
    carrier: OperatorId,
}

impl Voice {
    fn note_on(&mut self, midi: u8, onset_s: f32) -> EyreResult<Note> {
        let note = Note::from_midi(midi, onset_s)?;
        self.handle.note_on(self.modulator, note)?;
        self.handle.note_on(self.carrier, note)?;
        Ok(note)
    }

    fn note_off(&mut self, note: Note) -> EyreResult<()> {
        self.handle.note_off(self.modulator, note)?;
        self.handle.note_off(self.carrier, note)?;
        Ok(())
    }
}

/// modulator (ratio 2) -> carrier (ratio 1) -> low-pass
fn build_patch() -> EyreResult<(Engine, Voice)> {
    let config = EngineConfig::default().with_max_block_size(BLOCK);

    let mut builder = GraphBuilder::new();
    let modulator = builder.add(Carrier::new(
        CarrierConfig::with_ratio(2.0).modulation_depth(0.0).amplitude(0.8),
        BLOCK,
    )?);
    let carrier = builder.add(Carrier::new(
        CarrierConfig::with_ratio(1.0).modulation_depth(1.5).amplitude(0.5),
        BLOCK,
    )?);
    let lowpass = builder.add(Filter::lowpass(0.707, 3_000.0, BLOCK)?);
    builder.chain(&[modulator, carrier, lowpass])?;

    let (engine, handle) = Engine::new(config, builder).wrap_err("failed to build FM patch")?;
    Ok((
        engine,
        Voice {
            handle,
            modulator,
            carrier,
        },
    ))
}

fn play_live(engine: Engine, mut voice: Voice) -> EyreResult<()> {
    let stream = CpalBackend::start(engine)?;

    for &(midi, seconds) in &PHRASE {
        // The clock is already past 0, so the note sounds at the next callback.
        let note = voice.note_on(midi, 0.0)?;
        thread::sleep(Duration::from_secs_f32(seconds));
        voice.note_off(note)?;
    }
    thread::sleep(Duration::from_millis(200));

    stream.pause()?;
    log::info!("{}", stream.stats().snapshot());
    Ok(())
}

/// Render the phrase without a device and report its level.
fn render_offline(mut engine: Engine, mut voice: Voice) -> EyreResult<()> {
    let sample_rate = engine.config().sample_rate;
    let channels = engine.config().channels as usize;
    let mut buffer = vec![0.0f32; BLOCK * channels];
    let mut peak = 0.0f32;
    let mut energy = 0.0f64;
    let mut samples = 0usize;
    let mut onset = 0.0f32;

    for &(midi, seconds) in &PHRASE {
        let note = voice.note_on(midi, onset)?;
        let end = ((onset + seconds) * sample_rate) as u64;
        while engine.clock().position() < end {
            engine.process(&mut buffer, channels);
            for &sample in &buffer {
                peak = peak.max(sample.abs());
                energy += f64::from(sample) * f64::from(sample);
            }
            samples += buffer.len();
        }
        voice.note_off(note)?;
        onset += seconds;
    }

    let rms = (energy / samples.max(1) as f64).sqrt();
    log::info!(
        "rendered {:.2} s offline: peak {peak:.3}, rms {rms:.3}",
        engine.clock().seconds()
    );
    log::info!("{}", engine.stats().snapshot());
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (engine, voice) = build_patch()?;
    if let Err(err) = play_live(engine, voice) {
        log::error!("playback failed: {err:#}");
        log::info!("rendering offline instead");
        let (engine, voice) = build_patch()?;
        render_offline(engine, voice)?;
    }
    Ok(())
}
