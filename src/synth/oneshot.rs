//! Fire-and-forget transient sounds.
//!
//! A one-shot shares no state with any sustained voice: it gets its own
//! oscillator, filter, and envelope, plays attack -> decay-to-sustain ->
//! release with no gate hold, and frees its pool slot the moment the
//! envelope reaches Idle. The shimmer arpeggio is just several of these
//! scheduled with staggered start delays, each self-disposing on its own.

use crate::dsp::{Envelope, Oscillator, SvFilter};
use crate::instrument::OneShotConfig;

/// Pool size. Exhaustion steals the oldest transient, so a flurry of taps
/// degrades gracefully instead of growing without bound.
const MAX_ONE_SHOTS: usize = 24;

/// Rising harmonic intervals of the shimmer arpeggio, in semitones.
const SHIMMER_SEMITONES: [f32; 4] = [0.0, 7.0, 12.0, 19.0];
/// Stagger between consecutive shimmer notes.
const SHIMMER_STAGGER_SECONDS: f32 = 0.055;

struct OneShotVoice {
    active: bool,
    age: u64,
    delay_frames: u32,
    /// Frames of gate-hold left before the release starts. One-shots have
    /// no pointer to release them, so the hold is baked in up front.
    hold_frames: u32,
    osc: Oscillator,
    filter: SvFilter,
    env: Envelope,
    detune_factor: f32,
    gain: f32,
    pan_l: f32,
    pan_r: f32,
    frequency: f32,
}

pub struct OneShotPlayer {
    sample_rate: f32,
    pool: Vec<OneShotVoice>,
    next_age: u64,
}

impl OneShotPlayer {
    pub fn new(sample_rate: f32) -> Self {
        let pool = (0..MAX_ONE_SHOTS)
            .map(|_| OneShotVoice {
                active: false,
                age: 0,
                delay_frames: 0,
                hold_frames: 0,
                osc: Oscillator::new(sample_rate, crate::dsp::Waveform::Sine),
                filter: SvFilter::new(
                    sample_rate,
                    crate::dsp::FilterKind::LowPass,
                    1_000.0,
                    0.0,
                ),
                env: Envelope::adsr(sample_rate, 0.01, 0.1, 0.0, 0.1),
                detune_factor: 1.0,
                gain: 0.0,
                pan_l: 0.0,
                pan_r: 0.0,
                frequency: 440.0,
            })
            .collect();

        Self {
            sample_rate,
            pool,
            next_age: 0,
        }
    }

    pub fn active_count(&self) -> usize {
        self.pool.iter().filter(|v| v.active).count()
    }

    /// Schedule one transient, starting after `delay_frames` frames.
    pub fn trigger(
        &mut self,
        config: OneShotConfig,
        base_frequency: f32,
        gain: f32,
        pan: f32,
        delay_frames: u32,
    ) {
        let slot = self.allocate();
        let sample_rate = self.sample_rate;
        let age = self.next_age;
        self.next_age += 1;
        let voice = &mut self.pool[slot];

        let octave = 2.0_f32.powi(config.octave_offset as i32);
        let detune = 2.0_f32.powf(config.detune_cents / 1_200.0);

        voice.active = true;
        voice.age = age;
        voice.delay_frames = delay_frames;
        voice.hold_frames = ((config.attack + config.decay) * sample_rate).round() as u32;
        voice.osc = Oscillator::new(sample_rate, config.waveform);
        voice.filter = SvFilter::new(
            sample_rate,
            config.filter.kind,
            config.filter.cutoff_hz,
            config.filter.resonance,
        );
        voice.env = Envelope::adsr(
            sample_rate,
            config.attack,
            config.decay,
            config.sustain_level,
            config.release,
        );
        voice.env.note_on();
        voice.detune_factor = detune;
        voice.frequency = base_frequency * octave;
        voice.gain = gain * config.gain;

        let p = (pan.clamp(-1.0, 1.0) + 1.0) * std::f32::consts::FRAC_PI_4;
        voice.pan_l = p.cos();
        voice.pan_r = p.sin();
    }

    /// Schedule the shimmer arpeggio: one transient per interval, each
    /// delayed one more stagger step than the last.
    pub fn shimmer(&mut self, config: OneShotConfig, base_frequency: f32, gain: f32, pan: f32) {
        let stagger = (SHIMMER_STAGGER_SECONDS * self.sample_rate).round() as u32;
        for (i, semitones) in SHIMMER_SEMITONES.iter().enumerate() {
            let freq = base_frequency * 2.0_f32.powf(semitones / 12.0);
            self.trigger(config, freq, gain, pan, stagger * i as u32);
        }
    }

    /// Mix one stereo sample of every live transient, advancing envelopes
    /// and expiring finished ones.
    pub fn next_sample(&mut self) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;

        for voice in &mut self.pool {
            if !voice.active {
                continue;
            }

            if voice.delay_frames > 0 {
                voice.delay_frames -= 1;
                continue;
            }

            if voice.hold_frames > 0 {
                voice.hold_frames -= 1;
                if voice.hold_frames == 0 {
                    voice.env.note_off();
                }
            }

            let level = voice.env.next_sample();
            if !voice.env.is_active() {
                // Natural end reached: self-dispose.
                voice.active = false;
                continue;
            }

            let raw = voice.osc.next_sample(voice.frequency * voice.detune_factor);
            let sample = voice.filter.next_sample(raw) * level * voice.gain;
            left += sample * voice.pan_l;
            right += sample * voice.pan_r;
        }

        (left, right)
    }

    pub fn all_off(&mut self) {
        for voice in &mut self.pool {
            if voice.active {
                voice.env.note_off();
                voice.delay_frames = 0;
                voice.hold_frames = 0;
            }
        }
    }

    fn allocate(&mut self) -> usize {
        if let Some(idx) = self.pool.iter().position(|v| !v.active) {
            return idx;
        }
        // Steal the oldest.
        self.pool
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age)
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn drain(player: &mut OneShotPlayer, samples: usize) -> f32 {
        let mut peak = 0.0f32;
        for _ in 0..samples {
            let (l, r) = player.next_sample();
            peak = peak.max(l.abs()).max(r.abs());
        }
        peak
    }

    #[test]
    fn one_shot_self_disposes_after_natural_end() {
        let mut player = OneShotPlayer::new(SAMPLE_RATE);
        let config = instrument::chime();
        player.trigger(config, 440.0, 0.6, 0.0, 0);
        assert_eq!(player.active_count(), 1);

        let total = config.attack + config.decay + config.release + 0.05;
        let peak = drain(&mut player, (total * SAMPLE_RATE) as usize);
        assert!(peak > 0.01, "transient should be audible");
        assert_eq!(player.active_count(), 0, "transient must free itself");
    }

    #[test]
    fn delayed_one_shot_stays_silent_until_its_start() {
        let mut player = OneShotPlayer::new(SAMPLE_RATE);
        let delay = 4_800;
        player.trigger(instrument::chime(), 440.0, 0.6, 0.0, delay);

        let early_peak = drain(&mut player, delay as usize - 10);
        assert_eq!(early_peak, 0.0);
        let late_peak = drain(&mut player, 2_000);
        assert!(late_peak > 0.0);
    }

    #[test]
    fn shimmer_schedules_four_staggered_notes() {
        let mut player = OneShotPlayer::new(SAMPLE_RATE);
        player.shimmer(instrument::shimmer(), 330.0, 0.5, 0.0);
        assert_eq!(player.active_count(), 4);
    }

    #[test]
    fn pool_exhaustion_steals_the_oldest() {
        let mut player = OneShotPlayer::new(SAMPLE_RATE);
        for _ in 0..MAX_ONE_SHOTS + 4 {
            player.trigger(instrument::chime(), 440.0, 0.3, 0.0, 0);
        }
        assert_eq!(player.active_count(), MAX_ONE_SHOTS);
    }
}
