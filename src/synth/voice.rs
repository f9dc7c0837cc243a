//! One sustained voice bound to one pointer.
//!
//! The voice owns its whole chain - oscillator, vibrato LFO, state-variable
//! filter, equal-power pan, envelope-scaled gain - and frees itself when
//! the release envelope reaches Idle. Teardown therefore never precedes
//! ramp completion, and always eventually happens.

use crate::dsp::{Envelope, Lfo, Oscillator, Smoothed, SvFilter};
use crate::instrument::InstrumentDefinition;

/// Ramp lengths for continuous parameter moves. Frequency uses the shorter
/// ramp so pitch tracking feels immediate; gain/pan/cutoff take the longer
/// one. Morphs retarget timbre parameters over the morph time.
const FREQ_RAMP_SECONDS: f32 = 0.03;
const PARAM_RAMP_SECONDS: f32 = 0.08;
const MORPH_SECONDS: f32 = 0.08;
const CUT_RELEASE_SECONDS: f32 = 0.012;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Sounding, gate high
    Releasing, // Gate low, envelope in release phase
}

pub struct Voice {
    sample_rate: f32,
    state: VoiceState,
    instrument: InstrumentDefinition,

    osc: Oscillator,
    /// Previous-waveform oscillator kept alive during a morph crossfade.
    morph_from: Option<Oscillator>,
    morph_mix: Smoothed,

    vibrato: Lfo,
    vibrato_depth: Smoothed, // cents
    detune: Smoothed,        // cents

    filter: SvFilter,
    cutoff: Smoothed,
    resonance: Smoothed,
    /// Set once a VoiceSet override arrives; from then on the vertical
    /// position, not the instrument default, owns the cutoff.
    cutoff_overridden: bool,

    frequency: Smoothed,
    gain: Smoothed,
    pan: Smoothed,
    /// Morph-ramped sustain target fed into the envelope sample by sample.
    sustain: Smoothed,

    env: Envelope,
}

impl Voice {
    pub fn new(sample_rate: f32, instrument: InstrumentDefinition) -> Self {
        Self {
            sample_rate,
            state: VoiceState::Free,
            osc: Oscillator::new(sample_rate, instrument.waveform),
            morph_from: None,
            morph_mix: Smoothed::new(1.0),
            vibrato: Lfo::new(
                sample_rate,
                instrument.vibrato.map(|v| v.rate_hz).unwrap_or(0.0),
            ),
            vibrato_depth: Smoothed::new(
                instrument.vibrato.map(|v| v.depth_cents).unwrap_or(0.0),
            ),
            detune: Smoothed::new(instrument.detune_cents),
            filter: SvFilter::new(
                sample_rate,
                instrument.filter.kind,
                instrument.filter.cutoff_hz,
                instrument.filter.resonance,
            ),
            cutoff: Smoothed::new(instrument.filter.cutoff_hz),
            resonance: Smoothed::new(instrument.filter.resonance),
            cutoff_overridden: false,
            frequency: Smoothed::new(440.0),
            gain: Smoothed::new(0.0),
            pan: Smoothed::new(0.0),
            sustain: Smoothed::new(instrument.sustain_level),
            env: Envelope::adsr(
                sample_rate,
                instrument.attack,
                0.1,
                instrument.sustain_level,
                instrument.release_seconds,
            ),
            instrument,
        }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn instrument(&self) -> &InstrumentDefinition {
        &self.instrument
    }

    /// Begin sounding. Parameters snap (there is no previous value worth
    /// gliding from) and the envelope ramps gain in over the attack.
    pub fn start(&mut self, instrument: InstrumentDefinition, frequency: f32, gain: f32, pan: f32) {
        self.instrument = instrument;
        self.osc = Oscillator::new(self.sample_rate, instrument.waveform);
        self.morph_from = None;
        self.morph_mix.snap(1.0);
        self.vibrato = Lfo::new(
            self.sample_rate,
            instrument.vibrato.map(|v| v.rate_hz).unwrap_or(0.0),
        );
        self.vibrato_depth
            .snap(instrument.vibrato.map(|v| v.depth_cents).unwrap_or(0.0));
        self.detune.snap(instrument.detune_cents);
        self.filter = SvFilter::new(
            self.sample_rate,
            instrument.filter.kind,
            instrument.filter.cutoff_hz,
            instrument.filter.resonance,
        );
        self.cutoff.snap(instrument.filter.cutoff_hz);
        self.resonance.snap(instrument.filter.resonance);
        self.cutoff_overridden = false;
        self.frequency.snap(frequency);
        self.gain.snap(gain);
        self.pan.snap(pan);
        self.sustain.snap(instrument.sustain_level);

        self.env = Envelope::adsr(
            self.sample_rate,
            instrument.attack,
            0.1,
            instrument.sustain_level,
            instrument.release_seconds,
        );
        self.env.note_on();
        self.state = VoiceState::Active;
    }

    /// Pointer moved: glide to the new targets instead of snapping. These
    /// ramps run on the audio clock, so control-thread jitter after the
    /// call cannot produce clicks.
    pub fn set_targets(&mut self, frequency: f32, gain: f32, pan: f32, cutoff_hz: Option<f32>) {
        if self.state != VoiceState::Active {
            return;
        }
        self.frequency
            .set_target(frequency, FREQ_RAMP_SECONDS, self.sample_rate);
        self.gain.set_target(gain, PARAM_RAMP_SECONDS, self.sample_rate);
        self.pan.set_target(pan, PARAM_RAMP_SECONDS, self.sample_rate);
        if let Some(hz) = cutoff_hz {
            self.cutoff_overridden = true;
            self.cutoff.set_target(hz, PARAM_RAMP_SECONDS, self.sample_rate);
        }
    }

    /// Change timbre mid-gesture without restarting the tone. Waveform
    /// crossfades from the previous oscillator (same phase), everything
    /// else ramps to the new instrument's values.
    pub fn morph(&mut self, instrument: InstrumentDefinition) {
        if self.state != VoiceState::Active {
            return;
        }

        if instrument.waveform != self.osc.waveform() {
            let previous = self.osc.clone();
            self.osc.set_waveform(instrument.waveform);
            self.morph_from = Some(previous);
            self.morph_mix.snap(0.0);
            self.morph_mix.set_target(1.0, MORPH_SECONDS, self.sample_rate);
        }

        self.detune
            .set_target(instrument.detune_cents, MORPH_SECONDS, self.sample_rate);
        self.filter.set_kind(instrument.filter.kind);
        if !self.cutoff_overridden {
            self.cutoff
                .set_target(instrument.filter.cutoff_hz, MORPH_SECONDS, self.sample_rate);
        }
        self.resonance
            .set_target(instrument.filter.resonance, MORPH_SECONDS, self.sample_rate);

        match instrument.vibrato {
            Some(v) => {
                self.vibrato.set_rate(v.rate_hz);
                self.vibrato_depth
                    .set_target(v.depth_cents, MORPH_SECONDS, self.sample_rate);
            }
            None => {
                self.vibrato_depth
                    .set_target(0.0, MORPH_SECONDS, self.sample_rate);
            }
        }

        // The envelope keeps its current level and its sustain target
        // glides rather than stepping; only the future shape (notably the
        // release) switches over at once.
        self.sustain
            .set_target(instrument.sustain_level, MORPH_SECONDS, self.sample_rate);
        let (attack, release) = (instrument.attack, instrument.release_seconds);
        self.env.set_shape(attack, 0.1, self.sustain.current(), release);

        self.instrument = instrument;
    }

    /// Gate off with the instrument's release envelope. The slot frees
    /// itself once the envelope reaches Idle.
    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.env.note_off();
            self.state = VoiceState::Releasing;
        }
    }

    /// Near-immediate fade used for taps. Still a ramp - never a hard stop.
    pub fn cut(&mut self) {
        if self.is_active() {
            let (attack, sustain) = (self.instrument.attack, self.sustain.current());
            self.env
                .set_shape(attack, 0.1, sustain, CUT_RELEASE_SECONDS);
            self.env.note_off();
            self.state = VoiceState::Releasing;
        }
    }

    /// Render one stereo sample and advance all ramps.
    pub fn next_sample(&mut self) -> (f32, f32) {
        if self.state == VoiceState::Free {
            return (0.0, 0.0);
        }

        if !self.sustain.is_settled() {
            self.env.set_sustain(self.sustain.next());
        }
        let env_level = self.env.next_sample();
        if self.state == VoiceState::Releasing && !self.env.is_active() {
            self.state = VoiceState::Free;
            return (0.0, 0.0);
        }

        let base = self.frequency.next();
        let detune_cents = self.detune.next() + self.vibrato_depth.next() * self.vibrato.next_sample();
        let freq = base * 2.0_f32.powf(detune_cents / 1_200.0);

        let mix = self.morph_mix.next();
        let mut raw = self.osc.next_sample(freq);
        if let Some(from) = self.morph_from.as_mut() {
            raw = from.next_sample(freq) * (1.0 - mix) + raw * mix;
            if self.morph_mix.is_settled() {
                self.morph_from = None;
            }
        }

        self.filter.cutoff_hz = self.cutoff.next();
        self.filter.resonance = self.resonance.next();
        let filtered = self.filter.next_sample(raw);

        let sample = filtered * env_level * self.gain.next();

        // Equal-power pan, -1 full left .. +1 full right.
        let pan = self.pan.next().clamp(-1.0, 1.0);
        let angle = (pan + 1.0) * std::f32::consts::FRAC_PI_4;
        (sample * angle.cos(), sample * angle.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn render(voice: &mut Voice, samples: usize) -> Vec<(f32, f32)> {
        (0..samples).map(|_| voice.next_sample()).collect()
    }

    fn peak(samples: &[(f32, f32)]) -> f32 {
        samples
            .iter()
            .map(|(l, r)| l.abs().max(r.abs()))
            .fold(0.0, f32::max)
    }

    #[test]
    fn voice_sounds_after_start_and_frees_after_release() {
        let mut voice = Voice::new(SAMPLE_RATE, instrument::lead());
        voice.start(instrument::lead(), 440.0, 0.5, 0.0);

        let body = render(&mut voice, 4_800);
        assert!(peak(&body) > 0.01, "voice should produce sound");
        assert_eq!(voice.state(), VoiceState::Active);

        voice.release();
        let release_samples =
            (instrument::lead().release_seconds * SAMPLE_RATE) as usize + 64;
        render(&mut voice, release_samples);

        assert_eq!(voice.state(), VoiceState::Free, "voice must self-dispose");
        assert_eq!(voice.next_sample(), (0.0, 0.0));
    }

    #[test]
    fn disposal_never_precedes_the_release_ramp() {
        let mut voice = Voice::new(SAMPLE_RATE, instrument::lead());
        voice.start(instrument::lead(), 440.0, 0.5, 0.0);
        render(&mut voice, 4_800);
        voice.release();

        // Halfway through the release the voice must still be alive.
        let half = (instrument::lead().release_seconds * SAMPLE_RATE) as usize / 2;
        render(&mut voice, half);
        assert_eq!(voice.state(), VoiceState::Releasing);
    }

    #[test]
    fn start_on_live_voice_restarts_from_zero() {
        let mut voice = Voice::new(SAMPLE_RATE, instrument::lead());
        voice.start(instrument::lead(), 440.0, 0.5, 0.0);
        render(&mut voice, 9_600);
        assert!(voice.env.level() > 0.5);

        // Restarting a sounding voice rebuilds it in place. The envelope
        // goes back to the attack foot, not on top of the old level.
        voice.start(instrument::pad(), 330.0, 0.5, 0.0);
        assert_eq!(voice.env.level(), 0.0);
        assert!(voice.is_active());
    }

    #[test]
    fn cut_silences_quickly() {
        let mut voice = Voice::new(SAMPLE_RATE, instrument::pad());
        voice.start(instrument::pad(), 330.0, 0.6, 0.0);
        render(&mut voice, 48_000);

        voice.cut();
        render(&mut voice, (0.02 * SAMPLE_RATE) as usize);
        assert_eq!(voice.state(), VoiceState::Free);
    }

    #[test]
    fn pan_splits_stereo_energy() {
        let mut voice = Voice::new(SAMPLE_RATE, instrument::lead());
        voice.start(instrument::lead(), 440.0, 0.5, -1.0);
        let samples = render(&mut voice, 4_800);

        let left: f32 = samples.iter().map(|(l, _)| l * l).sum();
        let right: f32 = samples.iter().map(|(_, r)| r * r).sum();
        assert!(left > 100.0 * right, "hard-left pan should starve the right channel");
    }

    #[test]
    fn morph_keeps_the_tone_continuous() {
        let mut voice = Voice::new(SAMPLE_RATE, instrument::lead());
        voice.start(instrument::lead(), 440.0, 0.5, 0.0);
        render(&mut voice, 9_600);

        let before = voice.next_sample();
        voice.morph(instrument::pad());
        let after = voice.next_sample();

        // No discontinuity at the morph boundary beyond one sample step.
        assert!(
            (after.0 - before.0).abs() < 0.05,
            "morph clicked: {} -> {}",
            before.0,
            after.0
        );
        assert_eq!(voice.instrument().id, instrument::pad().id);
    }

    #[test]
    fn morph_ramps_sustain_instead_of_stepping() {
        let mut voice = Voice::new(SAMPLE_RATE, instrument::lead());
        voice.start(instrument::lead(), 440.0, 0.5, 0.0);
        render(&mut voice, 9_600); // well into sustain

        fn rms(voice: &mut Voice, samples: usize) -> f32 {
            let mut acc = 0.0f32;
            for _ in 0..samples {
                let (l, r) = voice.next_sample();
                acc += l * l + r * r;
            }
            (acc / samples as f32).sqrt()
        }

        // Lead sustains at 0.6, pad at 0.8. The level must crawl between
        // them over the morph time, not jump the full ratio at once.
        let window = (0.010 * SAMPLE_RATE) as usize;
        let before = rms(&mut voice, window);
        voice.morph(instrument::pad());
        let after = rms(&mut voice, window);
        assert!(
            (after / before - 1.0).abs() < 0.1,
            "sustain stepped at the morph: rms {before} -> {after}"
        );

        // And the ramp does land on the new sustain level.
        render(&mut voice, (MORPH_SECONDS * SAMPLE_RATE) as usize + 8);
        assert!((voice.env.level() - instrument::pad().sustain_level).abs() < 0.02);
    }

    #[test]
    fn set_targets_glides_instead_of_snapping() {
        let mut voice = Voice::new(SAMPLE_RATE, instrument::lead());
        voice.start(instrument::lead(), 440.0, 0.5, 0.0);
        render(&mut voice, 4_800);

        voice.set_targets(880.0, 0.5, 0.0, None);
        // After a single sample the internal frequency must still be near
        // 440; the glide takes 30 ms.
        voice.next_sample();
        assert!(voice.frequency.current() < 460.0);

        render(&mut voice, (FREQ_RAMP_SECONDS * SAMPLE_RATE) as usize + 2);
        assert!((voice.frequency.current() - 880.0).abs() < 1e-3);
    }
}
