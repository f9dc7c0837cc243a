use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Waveform character, briefly:

  Sine      fundamental only - smooth, flute-like
  Saw       all harmonics (1/n) - bright, brassy, the classic lead/pad source
  Square    odd harmonics (1/n) - hollow, woody
  Triangle  odd harmonics (1/n^2) - soft, between sine and square
  Noise     no pitch - percussion and texture

The grid palette leans on this spread: sustained cells use saw/triangle,
percussive cells rotate through the whole list.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

/// Phase-accumulator oscillator. Frequency is supplied per sample so
/// callers can feed it from a smoothed parameter without clicks.
#[derive(Clone)]
pub struct Oscillator {
    sample_rate: f32,
    waveform: Waveform,
    phase: f32,
    noise_state: u32,
}

impl Oscillator {
    pub fn new(sample_rate: f32, waveform: Waveform) -> Self {
        Self {
            sample_rate,
            waveform,
            phase: 0.0,
            noise_state: 0x9E37_79B9,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Switch waveform without resetting phase, so a live tone can morph
    /// mid-gesture without a discontinuity in the phase accumulator.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Produce one sample at `frequency` Hz, advancing the phase.
    pub fn next_sample(&mut self, frequency: f32) -> f32 {
        let value = match self.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                // 0..1 phase -> -1..1..-1 triangle
                4.0 * (self.phase - 0.5).abs() - 1.0
            }
            Waveform::Noise => next_signed(&mut self.noise_state),
        };

        self.phase += frequency / self.sample_rate.max(1.0);
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        value
    }
}

/// xorshift32 mapped to [-1, 1]. Allocation-free white noise for the audio
/// path; the particle system uses `rand` instead since it runs off-callback.
fn next_signed(state: &mut u32) -> f32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    ((x as f32 / u32::MAX as f32) * 2.0) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn sine_matches_closed_form() {
        let mut osc = Oscillator::new(SAMPLE_RATE, Waveform::Sine);
        let freq = 440.0;

        let mut actual = 0.0;
        for _ in 0..=12 {
            actual = osc.next_sample(freq);
        }

        // sample n is sin(2pi f n / sr)
        let expected = (TAU * freq * 12.0 / SAMPLE_RATE).sin();
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn all_waveforms_stay_in_range() {
        for waveform in [
            Waveform::Sine,
            Waveform::Saw,
            Waveform::Square,
            Waveform::Triangle,
            Waveform::Noise,
        ] {
            let mut osc = Oscillator::new(SAMPLE_RATE, waveform);
            for _ in 0..2048 {
                let s = osc.next_sample(330.0);
                assert!((-1.01..=1.01).contains(&s), "{waveform:?} out of range");
            }
        }
    }

    #[test]
    fn waveform_switch_keeps_phase() {
        let mut osc = Oscillator::new(SAMPLE_RATE, Waveform::Saw);
        for _ in 0..100 {
            osc.next_sample(220.0);
        }
        let before = osc.next_sample(220.0);
        osc.set_waveform(Waveform::Saw);
        let after = osc.next_sample(220.0);
        // Adjacent saw samples differ by exactly one phase increment.
        let step = 2.0 * 220.0 / SAMPLE_RATE;
        assert!((after - before - step).abs() < 1e-5);
    }
}
