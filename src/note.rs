use crate::error::{Result, SynthError};

/// A scheduled pitch event: a frequency and the time it starts sounding.
///
/// Onset is measured on the engine's sample clock, in seconds since the
/// stream started. Notes stay active until removed; envelopes and decay are
/// handled outside the carrier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    freq_hz: f32,
    act_time_s: f32,
}

impl Note {
    pub fn new(freq_hz: f32, act_time_s: f32) -> Result<Self> {
        if !(freq_hz.is_finite() && freq_hz > 0.0) {
            return Err(SynthError::InvalidFrequency(freq_hz));
        }
        if !(act_time_s.is_finite() && act_time_s >= 0.0) {
            return Err(SynthError::InvalidOnset(act_time_s));
        }
        Ok(Self { freq_hz, act_time_s })
    }

    /// Note from a MIDI note number (A4 = 69 = 440 Hz).
    pub fn from_midi(note: u8, act_time_s: f32) -> Result<Self> {
        Self::new(midi_note_to_freq(note), act_time_s)
    }

    pub fn freq_hz(&self) -> f32 {
        self.freq_hz
    }

    pub fn act_time_s(&self) -> f32 {
        self.act_time_s
    }

    /// Whether the note has started at time `t` (seconds).
    #[inline]
    pub fn is_active_at(&self, t: f64) -> bool {
        self.act_time_s as f64 <= t
    }

    /// Bitwise identity, used to find a note again for removal.
    pub(crate) fn same_event(&self, other: &Note) -> bool {
        self.freq_hz.to_bits() == other.freq_hz.to_bits()
            && self.act_time_s.to_bits() == other.act_time_s.to_bits()
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
