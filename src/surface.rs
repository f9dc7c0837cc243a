//! The playing surface: the single place where pointer events fan out to
//! both the synth and the visual field.
//!
//! Every audio decision and its matching visual decision are made here
//! from the same `(slot, x, y, frequency, color)` tuple, so the two can
//! never drift apart for a pointer. Audio messages go through the ring
//! buffer; if the audio side is missing (no device) or the queue is full,
//! the message is dropped silently and visuals carry on.

use tracing::{debug, warn};

use crate::gesture::{GestureAction, GestureClassifier, PointerEvent};
use crate::instrument::{self, InstrumentId};
use crate::mapping::color::hsl;
use crate::mapping::{gain_at, pan_at, PentatonicScale, Rgb, ToneGrid};
use crate::synth::message::{MessageSink, SynthMessage};
use crate::visual::{BurstKind, EmitterField};

/// Which mapper drives pitch, color, and timbre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperMode {
    /// Pentatonic strip: x is pitch, gesture orientation locks lead/pad.
    Scale,
    /// 5x5 tone grid: the primary cell owns the timbre, pitch and color
    /// blend continuously. Orientation locks are ignored (the grid owns
    /// the instrument); the diagonal flourish still works.
    Grid,
}

/// Cutoff span for timbres whose filter tracks the vertical position.
const CUTOFF_FLOOR_HZ: f32 = 600.0;
const CUTOFF_SPAN_HZ: f32 = 3_000.0;

pub struct Surface<S: MessageSink> {
    width: f32,
    height: f32,
    mode: MapperMode,
    scale: PentatonicScale,
    grid: ToneGrid,
    classifier: GestureClassifier,
    field: EmitterField,
    audio: Option<S>,
    audio_lost_reported: bool,
    /// Primary grid cell per slot, to detect cell-boundary crossings.
    slot_cells: [Option<u8>; crate::MAX_POINTERS],
    /// Instrument currently driving each slot's voice.
    slot_instruments: [InstrumentId; crate::MAX_POINTERS],
}

impl<S: MessageSink> Surface<S> {
    pub fn new(width: f32, height: f32, mode: MapperMode, audio: Option<S>) -> Self {
        Self {
            width,
            height,
            mode,
            scale: PentatonicScale::default(),
            grid: ToneGrid::default(),
            classifier: GestureClassifier::new(),
            field: EmitterField::new(width, height),
            audio,
            audio_lost_reported: false,
            slot_cells: [None; crate::MAX_POINTERS],
            slot_instruments: [InstrumentId::Lead; crate::MAX_POINTERS],
        }
    }

    pub fn mode(&self) -> MapperMode {
        self.mode
    }

    /// Switch mappers. Gestures already in flight keep their instrument
    /// until their next morph-triggering move.
    pub fn set_mode(&mut self, mode: MapperMode) {
        self.mode = mode;
    }

    pub fn field(&self) -> &EmitterField {
        &self.field
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.field.resize(width, height);
    }

    /// Advance the visual simulation; call once per rendered frame.
    pub fn update(&mut self, now: f64) {
        self.field.update(now);
    }

    /// Build this frame's display list.
    pub fn frame(&self, now: f64) -> crate::visual::FieldFrame {
        self.field.frame(now)
    }

    /// Release everything at once: every voice, every gesture, every
    /// emitter. Used on shutdown.
    pub fn all_off(&mut self, now: f64) {
        self.send(SynthMessage::AllOff);
        self.classifier = GestureClassifier::new();
        for slot in 0..crate::MAX_POINTERS {
            self.field.release(slot, now);
        }
    }

    /// Feed one pointer event through the whole pipeline.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: f64) {
        let action = self.classifier.handle(event, now);
        match action {
            GestureAction::Start { slot } => self.on_start(slot, event, now),
            GestureAction::Move { slot, lock } => self.on_move(slot, lock, event, now),
            GestureAction::Special { slot } => self.on_special(slot, event, now),
            GestureAction::Tap {
                slot,
                start_x,
                start_y,
            } => self.on_tap(slot, start_x, start_y, event, now),
            GestureAction::Release { slot } => self.on_release(slot, now),
            GestureAction::Cancel { slot } => self.on_release(slot, now),
            GestureAction::Ignored => {}
        }
    }

    fn on_start(&mut self, slot: usize, event: PointerEvent, now: f64) {
        let (frequency, color, instrument) = self.map(event.x, event.y);
        let gain = gain_at(event.y, self.height);
        let pan = pan_at(event.x, self.width);

        self.slot_instruments[slot] = instrument;
        self.slot_cells[slot] = match instrument {
            InstrumentId::Cell(cell) => Some(cell),
            _ => None,
        };

        self.send(SynthMessage::VoiceOn {
            slot,
            instrument,
            frequency,
            gain,
            pan,
        });
        self.field.touch(slot, event.x, event.y, frequency, color, now);
    }

    fn on_move(&mut self, slot: usize, lock: Option<InstrumentId>, event: PointerEvent, now: f64) {
        let (frequency, color, mapped_instrument) = self.map(event.x, event.y);
        let gain = gain_at(event.y, self.height);
        let pan = pan_at(event.x, self.width);

        match self.mode {
            MapperMode::Scale => {
                if let Some(locked) = lock {
                    self.slot_instruments[slot] = locked;
                    self.send(SynthMessage::VoiceMorph {
                        slot,
                        instrument: locked,
                        base_frequency: frequency,
                    });
                    self.field
                        .burst(BurstKind::DragTrail, event.x, event.y, color, now);
                }
            }
            MapperMode::Grid => {
                // The grid owns the timbre: morph on cell crossings, not
                // on orientation locks.
                if let InstrumentId::Cell(cell) = mapped_instrument {
                    if self.slot_cells[slot] != Some(cell) {
                        self.slot_cells[slot] = Some(cell);
                        self.slot_instruments[slot] = mapped_instrument;
                        self.send(SynthMessage::VoiceMorph {
                            slot,
                            instrument: mapped_instrument,
                            base_frequency: self.grid.cell_frequency(cell),
                        });
                    }
                }
            }
        }

        let cutoff_hz = self
            .cutoff_tracks_height(slot)
            .then(|| CUTOFF_FLOOR_HZ + (1.0 - event.y / self.height.max(1.0)).clamp(0.0, 1.0) * CUTOFF_SPAN_HZ);

        self.send(SynthMessage::VoiceSet {
            slot,
            frequency,
            gain,
            pan,
            cutoff_hz,
        });
        self.field.touch(slot, event.x, event.y, frequency, color, now);
    }

    fn on_special(&mut self, slot: usize, event: PointerEvent, now: f64) {
        let (frequency, color, _) = self.map(event.x, event.y);
        let gain = gain_at(event.y, self.height);
        let pan = pan_at(event.x, self.width);

        // The sustained tone ends here; the shimmer takes over.
        self.send(SynthMessage::VoiceOff { slot });
        self.send(SynthMessage::Shimmer {
            frequency,
            gain,
            pan,
        });

        self.field.release(slot, now);
        self.field.spawn_pulse(event.x, event.y, frequency, color, now);
        self.field
            .burst(BurstKind::ShimmerBloom, event.x, event.y, color, now);
    }

    fn on_tap(&mut self, slot: usize, start_x: f32, start_y: f32, event: PointerEvent, now: f64) {
        // Tap identity is fixed by where the gesture began: pitch and
        // loudness come from the start position, the visual pulse lands
        // at the release position.
        let (frequency, color, instrument) = self.map(start_x, start_y);
        let gain = gain_at(start_y, self.height);
        let pan = pan_at(start_x, self.width);

        self.send(SynthMessage::VoiceCut { slot });
        self.send(SynthMessage::OneShot {
            config: instrument::definition(instrument, frequency).one_shot,
            frequency,
            gain,
            pan,
            delay_frames: 0,
        });

        self.field.release(slot, now);
        self.field.spawn_pulse(event.x, event.y, frequency, color, now);
        self.field
            .burst(BurstKind::TapSpark, event.x, event.y, color, now);
    }

    fn on_release(&mut self, slot: usize, now: f64) {
        self.send(SynthMessage::VoiceOff { slot });
        self.field.release(slot, now);
    }

    /// (frequency, color, instrument) for a position, per the active mode.
    fn map(&self, x: f32, y: f32) -> (f32, Rgb, InstrumentId) {
        match self.mode {
            MapperMode::Scale => {
                let frequency = self.scale.pitch_at(x, self.width);
                // Hue follows pitch so the ripple color tracks the note.
                let t = (x / self.width.max(1.0)).clamp(0.0, 1.0);
                let color = hsl(210.0 - t * 180.0, 0.75, 0.55);
                (frequency, color, InstrumentId::Lead)
            }
            MapperMode::Grid => {
                let sample = self.grid.sample(x, y, self.width, self.height);
                (sample.frequency, sample.color, InstrumentId::Cell(sample.cell))
            }
        }
    }

    fn cutoff_tracks_height(&self, slot: usize) -> bool {
        match self.slot_instruments[slot] {
            InstrumentId::Pad => true,
            InstrumentId::Cell(cell) => instrument::cell_is_percussive(cell),
            InstrumentId::Lead => false,
        }
    }

    fn send(&mut self, msg: SynthMessage) {
        match self.audio.as_mut() {
            Some(sink) => {
                if sink.push(msg).is_err() {
                    debug!("synth queue full; dropping message");
                }
            }
            None => {
                if !self.audio_lost_reported {
                    self.audio_lost_reported = true;
                    warn!("audio unavailable; running visuals only");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{PointerEvent, PointerEventKind};
    use std::collections::VecDeque;

    const W: f32 = 800.0;
    const H: f32 = 600.0;

    fn surface(mode: MapperMode) -> Surface<VecDeque<SynthMessage>> {
        Surface::new(W, H, mode, Some(VecDeque::new()))
    }

    fn event(kind: PointerEventKind, id: u64, x: f32, y: f32) -> PointerEvent {
        PointerEvent { kind, id, x, y }
    }

    fn drain(s: &mut Surface<VecDeque<SynthMessage>>) -> Vec<SynthMessage> {
        s.audio.as_mut().unwrap().drain(..).collect()
    }

    #[test]
    fn down_starts_voice_and_emitter_together() {
        let mut s = surface(MapperMode::Scale);
        s.handle_pointer(event(PointerEventKind::Down, 1, 0.0, H / 2.0), 0.0);

        let msgs = drain(&mut s);
        assert_eq!(msgs.len(), 1);
        match msgs[0] {
            SynthMessage::VoiceOn {
                slot,
                frequency,
                gain,
                ..
            } => {
                assert_eq!(slot, 0);
                // Left edge, mid height: lowest scale pitch, gain 0.43.
                assert!((frequency - PentatonicScale::default().lowest()).abs() < 1e-3);
                assert!((gain - 0.43).abs() < 1e-6);
            }
            other => panic!("expected VoiceOn, got {other:?}"),
        }
        assert_eq!(s.field().active_emitter_count(), 1);
    }

    #[test]
    fn tap_uses_start_pitch_and_cuts_the_voice() {
        let mut s = surface(MapperMode::Scale);
        s.handle_pointer(event(PointerEventKind::Down, 1, W / 2.0, 0.0), 0.0);
        drain(&mut s);

        s.handle_pointer(event(PointerEventKind::Up, 1, W / 2.0 + 5.0, 4.0), 0.1);
        let msgs = drain(&mut s);
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0], SynthMessage::VoiceCut { slot: 0 }));
        match msgs[1] {
            SynthMessage::OneShot {
                frequency, gain, ..
            } => {
                let expected = PentatonicScale::default().pitch_at(W / 2.0, W);
                assert!((frequency - expected).abs() < 1e-3);
                // Top of surface: full gain 0.68.
                assert!((gain - 0.68).abs() < 1e-6);
            }
            other => panic!("expected OneShot, got {other:?}"),
        }

        // The tap also left a pulse and a spark burst behind.
        assert!(s.field().pulse_count() == 1);
        assert!(s.field().particle_count() > 0);
    }

    #[test]
    fn drag_release_sends_voice_off_only() {
        let mut s = surface(MapperMode::Scale);
        s.handle_pointer(event(PointerEventKind::Down, 1, 100.0, 100.0), 0.0);
        s.handle_pointer(event(PointerEventKind::Move, 1, 300.0, 110.0), 0.3);
        drain(&mut s);

        s.handle_pointer(event(PointerEventKind::Up, 1, 300.0, 110.0), 0.6);
        let msgs = drain(&mut s);
        assert_eq!(msgs.len(), 1);
        assert!(matches!(msgs[0], SynthMessage::VoiceOff { slot: 0 }));
    }

    #[test]
    fn cancel_never_triggers_a_one_shot() {
        let mut s = surface(MapperMode::Scale);
        // Fast, short gesture that would be a tap if it were an Up.
        s.handle_pointer(event(PointerEventKind::Down, 1, 100.0, 100.0), 0.0);
        drain(&mut s);

        s.handle_pointer(event(PointerEventKind::Cancel, 1, 100.0, 100.0), 0.05);
        let msgs = drain(&mut s);
        assert_eq!(msgs.len(), 1);
        assert!(matches!(msgs[0], SynthMessage::VoiceOff { slot: 0 }));
    }

    #[test]
    fn diagonal_gesture_swaps_voice_for_shimmer() {
        let mut s = surface(MapperMode::Scale);
        s.handle_pointer(event(PointerEventKind::Down, 1, 100.0, 100.0), 0.0);
        drain(&mut s);

        s.handle_pointer(event(PointerEventKind::Move, 1, 170.0, 170.0), 0.1);
        let msgs = drain(&mut s);
        assert!(matches!(msgs[0], SynthMessage::VoiceOff { slot: 0 }));
        assert!(matches!(msgs[1], SynthMessage::Shimmer { .. }));
        assert_eq!(s.field().pulse_count(), 1);
    }

    #[test]
    fn vertical_lock_morphs_to_pad_in_scale_mode() {
        let mut s = surface(MapperMode::Scale);
        s.handle_pointer(event(PointerEventKind::Down, 1, 100.0, 100.0), 0.0);
        drain(&mut s);

        s.handle_pointer(event(PointerEventKind::Move, 1, 104.0, 180.0), 0.1);
        let msgs = drain(&mut s);
        assert!(msgs.iter().any(|m| matches!(
            m,
            SynthMessage::VoiceMorph {
                instrument: InstrumentId::Pad,
                ..
            }
        )));
    }

    #[test]
    fn grid_mode_morphs_on_cell_crossing() {
        let mut s = surface(MapperMode::Grid);
        s.handle_pointer(event(PointerEventKind::Down, 1, 10.0, 10.0), 0.0);
        drain(&mut s);

        // Same cell: no morph.
        s.handle_pointer(event(PointerEventKind::Move, 1, 30.0, 12.0), 0.1);
        let msgs = drain(&mut s);
        assert!(!msgs.iter().any(|m| matches!(m, SynthMessage::VoiceMorph { .. })));

        // Crossing into column 1 (x > W/5): morph to the new cell.
        s.handle_pointer(event(PointerEventKind::Move, 1, W / 5.0 + 20.0, 12.0), 0.2);
        let msgs = drain(&mut s);
        assert!(msgs.iter().any(|m| matches!(
            m,
            SynthMessage::VoiceMorph {
                instrument: InstrumentId::Cell(1),
                ..
            }
        )));
    }

    #[test]
    fn no_audio_sink_still_runs_visuals() {
        let mut s: Surface<VecDeque<SynthMessage>> = Surface::new(W, H, MapperMode::Scale, None);
        s.handle_pointer(event(PointerEventKind::Down, 1, 200.0, 200.0), 0.0);
        assert_eq!(s.field().active_emitter_count(), 1);
    }
}
