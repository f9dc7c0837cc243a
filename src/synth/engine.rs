//! Voice manager: the audio-side owner of all sounding state.
//!
//! Messages from the control thread are drained at block boundaries, then
//! every live voice and one-shot is mixed into the stereo block. Slots are
//! a fixed arena indexed by the gesture layer's slot numbers - at most one
//! voice per slot, O(1) lookup, no allocation in the callback.

use tracing::warn;

use crate::instrument;
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::oneshot::OneShotPlayer;
use crate::synth::voice::{Voice, VoiceState};
use crate::MAX_POINTERS;

pub struct VoiceEngine<R: MessageReceiver> {
    sample_rate: f32,
    voices: Vec<Voice>,
    one_shots: OneShotPlayer,
    rx: R,
}

impl<R: MessageReceiver> VoiceEngine<R> {
    pub fn new(sample_rate: f32, rx: R) -> Self {
        let voices = (0..MAX_POINTERS)
            .map(|_| Voice::new(sample_rate, instrument::lead()))
            .collect();

        Self {
            sample_rate,
            voices,
            one_shots: OneShotPlayer::new(sample_rate),
            rx,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn sounding_voice_count(&self) -> usize {
        self.voices
            .iter()
            .filter(|v| v.state() == VoiceState::Active)
            .count()
    }

    pub fn active_one_shot_count(&self) -> usize {
        self.one_shots.active_count()
    }

    pub fn voice_state(&self, slot: usize) -> Option<VoiceState> {
        self.voices.get(slot).map(|v| v.state())
    }

    /// Drain pending messages and render one stereo block. Both output
    /// slices must be the same length.
    pub fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());

        while let Some(msg) = self.rx.pop() {
            self.apply(msg);
        }

        left.fill(0.0);
        right.fill(0.0);

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            for voice in &mut self.voices {
                if voice.is_active() {
                    let (vl, vr) = voice.next_sample();
                    *l += vl;
                    *r += vr;
                }
            }
            let (ol, or) = self.one_shots.next_sample();
            *l += ol;
            *r += or;
        }
    }

    fn apply(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::VoiceOn {
                slot,
                instrument: id,
                frequency,
                gain,
                pan,
            } => {
                let Some(voice) = self.voices.get_mut(slot) else {
                    warn!(slot, "voice-on for out-of-range slot");
                    return;
                };
                // One voice per slot. An on-message for a live slot means
                // the gesture layer restarted the pointer; start() hard-resets
                // the voice in place, so the old tone is replaced, never layered.
                voice.start(instrument::definition(id, frequency), frequency, gain, pan);
            }

            SynthMessage::VoiceSet {
                slot,
                frequency,
                gain,
                pan,
                cutoff_hz,
            } => {
                if let Some(voice) = self.voices.get_mut(slot) {
                    voice.set_targets(frequency, gain, pan, cutoff_hz);
                }
            }

            SynthMessage::VoiceMorph {
                slot,
                instrument: id,
                base_frequency,
            } => {
                if let Some(voice) = self.voices.get_mut(slot) {
                    voice.morph(instrument::definition(id, base_frequency));
                }
            }

            SynthMessage::VoiceOff { slot } => {
                if let Some(voice) = self.voices.get_mut(slot) {
                    voice.release();
                }
            }

            SynthMessage::VoiceCut { slot } => {
                if let Some(voice) = self.voices.get_mut(slot) {
                    voice.cut();
                }
            }

            SynthMessage::OneShot {
                config,
                frequency,
                gain,
                pan,
                delay_frames,
            } => {
                self.one_shots.trigger(config, frequency, gain, pan, delay_frames);
            }

            SynthMessage::Shimmer {
                frequency,
                gain,
                pan,
            } => {
                self.one_shots
                    .shimmer(instrument::shimmer(), frequency, gain, pan);
            }

            SynthMessage::AllOff => {
                for voice in &mut self.voices {
                    if voice.is_active() {
                        voice.release();
                    }
                }
                self.one_shots.all_off();
            }
        }
    }
}
