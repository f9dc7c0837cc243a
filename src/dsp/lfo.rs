//! Control-rate oscillator for vibrato.
//!
//! Same phase math as the audio oscillator, but running in the 2-7 Hz
//! vibrato sweet spot and producing a bipolar value that the voice scales
//! into cents of pitch deviation.

use std::f32::consts::TAU;

pub struct Lfo {
    sample_rate: f32,
    rate_hz: f32,
    phase: f32,
}

impl Lfo {
    pub fn new(sample_rate: f32, rate_hz: f32) -> Self {
        Self {
            sample_rate,
            rate_hz,
            phase: 0.0,
        }
    }

    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate_hz = rate_hz.max(0.0);
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Bipolar sine output in [-1, 1].
    pub fn next_sample(&mut self) -> f32 {
        let value = (self.phase * TAU).sin();
        self.phase += self.rate_hz / self.sample_rate.max(1.0);
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_one_cycle_per_period() {
        let sample_rate = 1_000.0;
        let mut lfo = Lfo::new(sample_rate, 5.0);

        // One full period at 5 Hz is 200 samples; sample 50 is the peak.
        let mut peak = 0.0f32;
        for i in 0..200 {
            let v = lfo.next_sample();
            if i == 50 {
                peak = v;
            }
        }
        assert!(peak > 0.99, "expected peak near +1, got {peak}");
    }

    #[test]
    fn zero_rate_holds_phase() {
        let mut lfo = Lfo::new(48_000.0, 0.0);
        for _ in 0..100 {
            assert_eq!(lfo.next_sample(), 0.0);
        }
    }
}
