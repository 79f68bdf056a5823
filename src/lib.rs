pub mod audio; // Backend glue (cpal behind the `cpal` feature)
pub mod config;
pub mod dsp;
pub mod engine; // Per-block evaluation, clock and note handoff
pub mod error;
pub mod graph; // Operator graph construction and topological evaluation
pub mod note;
pub mod operator; // Operator capability and its variants

pub use config::EngineConfig;
pub use engine::{CallbackStatus, Engine, NoteHandle};
pub use error::{Result, SynthError};
pub use graph::{GraphBuilder, OperatorGraph, OperatorId};
pub use note::Note;
pub use operator::{carrier::Carrier, Operator, OperatorNode};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
pub const OUTPUT_CHANNELS: u16 = 2;
pub const MAX_NOTES_PER_CARRIER: usize = 64;
pub const MAX_DELAY_SAMPLES: usize = 48_000;
