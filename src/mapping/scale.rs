//! Horizontal position to pitch, vertical position to loudness.
//!
//! Pitch interpolation is deliberately *linear in frequency* between
//! adjacent scale steps, not logarithmic: dragging produces an audible
//! portamento-like glide rather than quantized steps, which is the whole
//! feel of the instrument.

use crate::mapping::midi_note_to_freq;

/// Two octaves of C-major pentatonic: C4 D4 E4 G4 A4 C5 D5 E5 G5 A5.
const SCALE_NOTES: [u8; 10] = [60, 62, 64, 67, 69, 72, 74, 76, 79, 81];

pub struct PentatonicScale {
    frequencies: [f32; SCALE_NOTES.len()],
}

impl Default for PentatonicScale {
    fn default() -> Self {
        let mut frequencies = [0.0; SCALE_NOTES.len()];
        for (slot, &note) in frequencies.iter_mut().zip(SCALE_NOTES.iter()) {
            *slot = midi_note_to_freq(note);
        }
        Self { frequencies }
    }
}

impl PentatonicScale {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Frequency for a horizontal position on a surface of `width` pixels.
    ///
    /// `index = clamp(x/width, 0, 1) * (N-1)`; the fractional part
    /// interpolates linearly between the two bracketing pitches.
    pub fn pitch_at(&self, x: f32, width: f32) -> f32 {
        let t = (x / width.max(1.0)).clamp(0.0, 1.0);
        let position = t * (self.frequencies.len() - 1) as f32;
        let lower = position.floor() as usize;
        let upper = (lower + 1).min(self.frequencies.len() - 1);
        let frac = position - lower as f32;

        let a = self.frequencies[lower];
        let b = self.frequencies[upper];
        a + (b - a) * frac
    }

    pub fn lowest(&self) -> f32 {
        self.frequencies[0]
    }

    pub fn highest(&self) -> f32 {
        self.frequencies[self.frequencies.len() - 1]
    }
}

/// Vertical position to loudness: top of the surface is loud, bottom quiet.
pub fn gain_at(y: f32, height: f32) -> f32 {
    let t = (y / height.max(1.0)).clamp(0.0, 1.0);
    (0.18 + (1.0 - t) * 0.5).clamp(0.12, 0.7)
}

/// Horizontal position to stereo pan in [-0.8, 0.8].
pub fn pan_at(x: f32, width: f32) -> f32 {
    let t = (x / width.max(1.0)).clamp(0.0, 1.0);
    (t * 2.0 - 1.0) * 0.8
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 600.0;

    #[test]
    fn pitch_is_monotone_nondecreasing() {
        let scale = PentatonicScale::default();
        let mut last = 0.0;
        for i in 0..=800 {
            let f = scale.pitch_at(i as f32, WIDTH);
            assert!(f >= last, "pitch decreased at x={i}");
            last = f;
        }
    }

    #[test]
    fn pitch_is_continuous_at_step_boundaries() {
        let scale = PentatonicScale::default();
        // Step boundaries fall at multiples of width / (N-1).
        let step = WIDTH / (scale.len() - 1) as f32;
        for k in 1..scale.len() {
            let x = k as f32 * step;
            let before = scale.pitch_at(x - 0.01, WIDTH);
            let after = scale.pitch_at(x + 0.01, WIDTH);
            assert!(
                (after - before).abs() < 0.5,
                "jump at boundary {k}: {before} -> {after}"
            );
        }
    }

    #[test]
    fn edges_hit_lowest_and_highest_pitch() {
        let scale = PentatonicScale::default();
        assert_eq!(scale.pitch_at(0.0, WIDTH), scale.lowest());
        assert_eq!(scale.pitch_at(WIDTH, WIDTH), scale.highest());
        // Out-of-range x clamps rather than extrapolating.
        assert_eq!(scale.pitch_at(-50.0, WIDTH), scale.lowest());
        assert_eq!(scale.pitch_at(WIDTH + 50.0, WIDTH), scale.highest());
    }

    #[test]
    fn gain_matches_reference_values() {
        // Mid-height: 0.18 + 0.5*0.5 = 0.43
        assert!((gain_at(HEIGHT / 2.0, HEIGHT) - 0.43).abs() < 1e-6);
        // Top: 0.18 + 0.5 = 0.68
        assert!((gain_at(0.0, HEIGHT) - 0.68).abs() < 1e-6);
        // Bottom clamps at 0.18, still above the floor of 0.12.
        assert!((gain_at(HEIGHT, HEIGHT) - 0.18).abs() < 1e-6);
    }

    #[test]
    fn pan_spans_left_to_right() {
        assert!((pan_at(0.0, WIDTH) + 0.8).abs() < 1e-6);
        assert!(pan_at(WIDTH / 2.0, WIDTH).abs() < 1e-6);
        assert!((pan_at(WIDTH, WIDTH) - 0.8).abs() < 1e-6);
    }
}
