//! Low-level DSP primitives used by the operators.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! so operators can embed them directly. They stay focused on the
//! signal-processing math; buffer handling and fault reporting live in the
//! operator layer.

/// Second-order low/high-pass section.
pub mod biquad;
/// Fixed-length circular sample history with arbitrary taps.
pub mod delay;
/// Periodic waveforms evaluated from a phase in radians.
pub mod waveform;

pub use biquad::{Biquad, BiquadResponse};
pub use delay::DelayLine;
pub use waveform::Waveform;
