pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// History long enough to read `max_delay` samples back.
    pub fn new(max_delay: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay + 1],
            write_pos: 0,
        }
    }

    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Store the newest sample. `tap(0)` returns it until the next push.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        self.buffer[self.write_pos] = sample;
    }

    /// Sample pushed `delay` pushes ago, clamped to the history length.
    #[inline]
    pub fn tap(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.min(len - 1);
        let read_pos = (self.write_pos + len - delay) % len;
        self.buffer[read_pos]
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
