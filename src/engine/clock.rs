/*
Sample Clock
============

The engine never looks at wall-clock time. Time is the number of frames
rendered since the stream started, divided by the sample rate:

    seconds = position / sample_rate

Each block reads the current position as its start and then advances it by
the block length. Two runs fed the same notes produce bit-identical output
regardless of callback jitter or how the backend sizes its buffers.
*/

#[derive(Debug, Clone)]
pub struct SampleClock {
    sample_rate: f32,
    position: u64,
}

impl SampleClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            position: 0,
        }
    }

    /// Frames rendered so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn seconds(&self) -> f64 {
        self.position as f64 / self.sample_rate as f64
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Move forward by one block; returns the position where the block starts.
    #[inline]
    pub fn advance(&mut self, frames: usize) -> u64 {
        let start = self.position;
        self.position += frames as u64;
        start
    }
}
