//! End-to-end: pointer events through the surface, messages through the
//! ring buffer, audio out of the engine. The same data flow as the live
//! app, with both ends of the ring driven from the test thread.

use ripplepad::audio::output::RING_CAPACITY;
use ripplepad::gesture::{PointerEvent, PointerEventKind};
use ripplepad::instrument;
use ripplepad::surface::{MapperMode, Surface};
use ripplepad::synth::{SynthMessage, VoiceEngine, VoiceState};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 256;
const W: f32 = 800.0;
const H: f32 = 600.0;

struct Rig {
    surface: Surface<rtrb::Producer<SynthMessage>>,
    engine: VoiceEngine<rtrb::Consumer<SynthMessage>>,
}

impl Rig {
    fn new(mode: MapperMode) -> Self {
        let (tx, rx) = rtrb::RingBuffer::new(RING_CAPACITY);
        Self {
            surface: Surface::new(W, H, mode, Some(tx)),
            engine: VoiceEngine::new(SAMPLE_RATE, rx),
        }
    }

    fn pointer(&mut self, kind: PointerEventKind, x: f32, y: f32, now: f64) {
        let event = PointerEvent { kind, id: 7, x, y };
        self.surface.handle_pointer(event, now);
    }

    /// Render `seconds` of audio, returning the peak sample magnitude.
    fn render(&mut self, seconds: f32) -> f32 {
        let mut left = [0.0f32; BLOCK];
        let mut right = [0.0f32; BLOCK];
        let blocks = ((seconds * SAMPLE_RATE) as usize / BLOCK).max(1);
        let mut peak = 0.0f32;
        for _ in 0..blocks {
            self.engine.render_block(&mut left, &mut right);
            for (l, r) in left.iter().zip(right.iter()) {
                peak = peak.max(l.abs()).max(r.abs());
            }
        }
        peak
    }
}

#[test]
fn sustained_drag_sounds_until_release_then_fades_out() {
    let mut rig = Rig::new(MapperMode::Scale);

    rig.pointer(PointerEventKind::Down, 200.0, 300.0, 0.0);
    let held_peak = rig.render(0.1);
    assert!(held_peak > 0.01, "held voice must be audible");
    assert_eq!(rig.engine.sounding_voice_count(), 1);

    // Slow, short drags neither lock nor retrigger anything.
    rig.pointer(PointerEventKind::Move, 210.0, 305.0, 0.3);
    rig.render(0.05);
    assert_eq!(rig.engine.sounding_voice_count(), 1);

    rig.pointer(PointerEventKind::Up, 210.0, 305.0, 0.8);
    rig.render(instrument::lead().release_seconds + 0.1);
    assert_eq!(rig.engine.active_voice_count(), 0, "voice must dispose");
    let tail_peak = rig.render(0.05);
    assert!(tail_peak < 1e-3, "released voice must fall silent");
}

#[test]
fn tap_leaves_a_one_shot_and_no_sustained_voice() {
    let mut rig = Rig::new(MapperMode::Scale);

    rig.pointer(PointerEventKind::Down, 400.0, 100.0, 0.0);
    rig.pointer(PointerEventKind::Up, 403.0, 102.0, 0.1);

    rig.render(0.05);
    assert_eq!(rig.engine.active_one_shot_count(), 1);
    assert_eq!(rig.engine.sounding_voice_count(), 0);

    // The cut voice's 12 ms fade has already finished.
    assert_eq!(rig.engine.active_voice_count(), 0);

    // After the chime envelope runs out, everything is quiet again.
    rig.render(1.0);
    assert_eq!(rig.engine.active_one_shot_count(), 0);
}

#[test]
fn diagonal_flourish_trades_the_voice_for_a_shimmer() {
    let mut rig = Rig::new(MapperMode::Scale);

    rig.pointer(PointerEventKind::Down, 100.0, 100.0, 0.0);
    rig.render(0.05);
    assert_eq!(rig.engine.sounding_voice_count(), 1);

    rig.pointer(PointerEventKind::Move, 170.0, 170.0, 0.1);
    rig.render(0.01);
    assert_eq!(rig.engine.active_one_shot_count(), 4, "shimmer is 4 notes");
    assert_ne!(rig.engine.voice_state(0), Some(VoiceState::Active));

    // Later moves in the same gesture change nothing.
    rig.pointer(PointerEventKind::Move, 250.0, 250.0, 0.2);
    rig.render(0.01);
    assert_eq!(rig.engine.active_one_shot_count(), 4);
}

#[test]
fn two_pointers_play_two_independent_voices() {
    let mut rig = Rig::new(MapperMode::Scale);

    rig.surface.handle_pointer(
        PointerEvent {
            kind: PointerEventKind::Down,
            id: 1,
            x: 100.0,
            y: 300.0,
        },
        0.0,
    );
    rig.surface.handle_pointer(
        PointerEvent {
            kind: PointerEventKind::Down,
            id: 2,
            x: 700.0,
            y: 300.0,
        },
        0.0,
    );
    rig.render(0.05);
    assert_eq!(rig.engine.sounding_voice_count(), 2);

    // Releasing one leaves the other sounding.
    rig.surface.handle_pointer(
        PointerEvent {
            kind: PointerEventKind::Up,
            id: 1,
            x: 100.0,
            y: 300.0,
        },
        0.5,
    );
    rig.render(instrument::lead().release_seconds + 0.1);
    assert_eq!(rig.engine.sounding_voice_count(), 1);
}

#[test]
fn grid_cell_crossing_morphs_without_retriggering() {
    let mut rig = Rig::new(MapperMode::Grid);

    rig.pointer(PointerEventKind::Down, 10.0, 10.0, 0.0);
    rig.render(0.05);
    assert_eq!(rig.engine.sounding_voice_count(), 1);

    // Drag across a column boundary: still exactly one voice, morphed in
    // place rather than restarted.
    rig.pointer(PointerEventKind::Move, W / 5.0 + 30.0, 10.0, 0.3);
    rig.render(0.05);
    assert_eq!(rig.engine.sounding_voice_count(), 1);
    assert_eq!(rig.engine.voice_state(0), Some(VoiceState::Active));
}

#[test]
fn all_off_silences_every_layer() {
    let mut rig = Rig::new(MapperMode::Scale);

    rig.pointer(PointerEventKind::Down, 100.0, 300.0, 0.0);
    rig.surface.handle_pointer(
        PointerEvent {
            kind: PointerEventKind::Down,
            id: 8,
            x: 600.0,
            y: 300.0,
        },
        0.0,
    );
    rig.render(0.05);
    assert_eq!(rig.engine.sounding_voice_count(), 2);

    rig.surface.all_off(0.1);
    rig.render(1.0);
    assert_eq!(rig.engine.active_voice_count(), 0);
    let peak = rig.render(0.05);
    assert!(peak < 1e-3);
}
