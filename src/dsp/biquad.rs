use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Biquad Low/High-Pass
====================

A direct-form I second-order section:

    y[n] = a0*x[n] + a1*x[n-1] + a2*x[n-2] - b1*y[n-1] - b2*y[n-2]

Coefficient design (Q is resonance, fc the cutoff, sr the sample rate):

    w     = TAU * fc / sr
    d     = 1 / Q
    beta  = 0.5 * (1 - 0.5*d*sin w) / (1 + 0.5*d*sin w)
    gamma = (0.5 + beta) * cos w

    low-pass:   a0 = a2 = (0.5 + beta - gamma) / 2    a1 =   0.5 + beta - gamma
    high-pass:  a0 = a2 = (0.5 + beta + gamma) / 2    a1 = -(0.5 + beta + gamma)
    both:       b1 = -2 * gamma                        b2 = 2 * beta

Q = 0.707 gives a flat (Butterworth) passband. The two delay registers per side
carry across blocks, so a signal split over many callbacks filters exactly as
if it were rendered in one go.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiquadResponse {
    LowPass,
    HighPass,
}

#[derive(Debug, Clone)]
pub struct Biquad {
    response: BiquadResponse,
    a0: f32,
    a1: f32,
    a2: f32,
    b1: f32,
    b2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Design a section. Callers validate `q > 0` and `0 < cutoff_hz < sr / 2`.
    pub fn new(response: BiquadResponse, q: f32, cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            response,
            a0: 0.0,
            a1: 0.0,
            a2: 0.0,
            b1: 0.0,
            b2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        };
        filter.design(q, cutoff_hz, sample_rate);
        filter
    }

    /// Recompute coefficients, keeping the delay registers.
    pub fn design(&mut self, q: f32, cutoff_hz: f32, sample_rate: f32) {
        let w = TAU * cutoff_hz / sample_rate;
        let d = 1.0 / q;
        let beta = 0.5 * (1.0 - 0.5 * d * w.sin()) / (1.0 + 0.5 * d * w.sin());
        let gamma = (0.5 + beta) * w.cos();

        let (a0, a1) = match self.response {
            BiquadResponse::LowPass => {
                let a1 = 0.5 + beta - gamma;
                (0.5 * a1, a1)
            }
            BiquadResponse::HighPass => {
                let a1 = 0.5 + beta + gamma;
                (0.5 * a1, -a1)
            }
        };

        self.a0 = a0;
        self.a1 = a1;
        self.a2 = a0;
        self.b1 = -2.0 * gamma;
        self.b2 = 2.0 * beta;
    }

    #[inline]
    pub fn next_sample(&mut self, x: f32) -> f32 {
        let y = self.a0 * x + self.a1 * self.x1 + self.a2 * self.x2
            - self.b1 * self.y1
            - self.b2 * self.y2;

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;

        y
    }

    /// Filter `input` into `output`; both slices have the same length.
    pub fn render(&mut self, input: &[f32], output: &mut [f32]) {
        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.next_sample(x);
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    pub fn response(&self) -> BiquadResponse {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn settle(filter: &mut Biquad, input: impl Fn(usize) -> f32, samples: usize) -> f32 {
        let mut peak = 0.0f32;
        for n in 0..samples {
            let y = filter.next_sample(input(n));
            if n > samples / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = Biquad::new(BiquadResponse::LowPass, 0.707, 1000.0, SAMPLE_RATE);
        let mut last = 0.0;
        for _ in 0..4096 {
            last = filter.next_sample(1.0);
        }
        assert!((last - 1.0).abs() < 1e-3, "dc gain should be unity, got {last}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut filter = Biquad::new(BiquadResponse::HighPass, 0.707, 1000.0, SAMPLE_RATE);
        let mut last = 1.0;
        for _ in 0..4096 {
            last = filter.next_sample(1.0);
        }
        assert!(last.abs() < 1e-3, "dc should be rejected, got {last}");
    }

    #[test]
    fn lowpass_attenuates_high_tone() {
        let tone = |freq: f32| move |n: usize| (TAU * freq * n as f32 / SAMPLE_RATE).sin();

        let mut low = Biquad::new(BiquadResponse::LowPass, 0.707, 500.0, SAMPLE_RATE);
        let passed = settle(&mut low, tone(100.0), 8192);

        let mut high = Biquad::new(BiquadResponse::LowPass, 0.707, 500.0, SAMPLE_RATE);
        let stopped = settle(&mut high, tone(8000.0), 8192);

        assert!(passed > 0.9, "passband tone lost: {passed}");
        assert!(stopped < 0.05, "stopband tone leaked: {stopped}");
    }

    #[test]
    fn state_carries_across_blocks() {
        let input: Vec<f32> = (0..256).map(|n| (n as f32 * 0.37).sin()).collect();

        let mut whole = Biquad::new(BiquadResponse::LowPass, 0.707, 2000.0, SAMPLE_RATE);
        let mut expected = vec![0.0; 256];
        whole.render(&input, &mut expected);

        let mut split = Biquad::new(BiquadResponse::LowPass, 0.707, 2000.0, SAMPLE_RATE);
        let mut actual = vec![0.0; 256];
        split.render(&input[..100], &mut actual[..100]);
        split.render(&input[100..], &mut actual[100..]);

        assert_eq!(expected, actual);
    }
}
