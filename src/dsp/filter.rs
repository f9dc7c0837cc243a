use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| kind      | passes          | rejects      |
| --------- | --------------- | ------------ |
| low-pass  | below cutoff    | above cutoff |
| high-pass | above cutoff    | below cutoff |
| band-pass | around cutoff   | elsewhere    |
| notch     | elsewhere       | around cutoff|

Topology is the usual trapezoidal state-variable filter: two integrators,
all four responses available from one pass. Cutoff and resonance are plain
fields so the voice layer can feed them from smoothed parameters.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

pub struct SvFilter {
    sample_rate: f32,
    kind: FilterKind,
    pub cutoff_hz: f32,
    pub resonance: f32,

    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl SvFilter {
    pub fn new(sample_rate: f32, kind: FilterKind, cutoff_hz: f32, resonance: f32) -> Self {
        Self {
            sample_rate,
            kind,
            cutoff_hz,
            resonance: resonance.clamp(0.0, 0.95),
            ic1eq: 0.0,
            ic2eq: 0.0,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Retype the filter in place, keeping integrator state so a morphing
    /// voice does not click at the switch.
    pub fn set_kind(&mut self, kind: FilterKind) {
        self.kind = kind;
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn next_sample(&mut self, sample: f32) -> f32 {
        let wd = TAU * self.cutoff_hz.clamp(20.0, self.sample_rate * 0.45);
        let g = (wd / (2.0 * self.sample_rate)).tan();
        let k = 2.0 - 2.0 * self.resonance;

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.kind {
            FilterKind::LowPass => v2,
            FilterKind::BandPass => v1,
            FilterKind::HighPass => sample - k * v1 - v2,
            FilterKind::Notch => sample - k * v1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{Oscillator, Waveform};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn rms_through(kind: FilterKind, cutoff: f32, tone_hz: f32) -> f32 {
        let mut osc = Oscillator::new(SAMPLE_RATE, Waveform::Sine);
        let mut filter = SvFilter::new(SAMPLE_RATE, kind, cutoff, 0.0);

        let mut acc = 0.0;
        let n = 4_800;
        for _ in 0..n {
            let y = filter.next_sample(osc.next_sample(tone_hz));
            acc += y * y;
        }
        (acc / n as f32).sqrt()
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let passed = rms_through(FilterKind::LowPass, 2_000.0, 200.0);
        let rejected = rms_through(FilterKind::LowPass, 2_000.0, 12_000.0);
        assert!(passed > 4.0 * rejected, "passed={passed} rejected={rejected}");
    }

    #[test]
    fn highpass_attenuates_below_cutoff() {
        let passed = rms_through(FilterKind::HighPass, 1_000.0, 8_000.0);
        let rejected = rms_through(FilterKind::HighPass, 1_000.0, 100.0);
        assert!(passed > 4.0 * rejected);
    }

    #[test]
    fn output_is_bounded_without_resonance() {
        let mut osc = Oscillator::new(SAMPLE_RATE, Waveform::Saw);
        let mut filter = SvFilter::new(SAMPLE_RATE, FilterKind::LowPass, 3_000.0, 0.0);
        for _ in 0..10_000 {
            let y = filter.next_sample(osc.next_sample(440.0));
            assert!(y.abs() < 2.0);
        }
    }
}
