use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Waveforms
=========

Every shape here is a pure function of phase, so an operator only has to keep
a phase accumulator per note and can switch shapes without resetting state.
Phase is expected in [0, TAU); callers wrap their accumulator.

  Sine      sin(phase). Fundamental only; the classic FM carrier.
  Square    +1 for the first half cycle, -1 for the second.
  Triangle  -1 at phase 0, rising to +1 at PI, falling back to -1.
  Saw       Linear ramp from -1 to +1 over one cycle.

All shapes are bipolar and stay inside [-1, 1].
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Saw,
}

impl Waveform {
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase < PI {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                let frac = phase / TAU;
                1.0 - 4.0 * (frac - 0.5).abs()
            }
            Waveform::Saw => phase / PI - 1.0,
        }
    }
}
