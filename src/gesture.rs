//! Per-pointer gesture classification.
//!
//! Each active pointer owns one accumulator tracking displacement,
//! duration, and directional bias. The state machine is
//! `Idle -> Down -> {Tap, Drag, Special} -> Released`; classification
//! decisions are irreversible within a gesture: a diagonal flourish fires
//! at most once, and an instrument lock is never revisited.
//!
//! Threshold set (one consistent set, checked in this order on every move
//! while the gesture is unlocked):
//!   1. diagonal special:  |dx| > 60 and |dy| > 60 and ||dx|-|dy|| < 40
//!   2. pad lock:          |dy| > 50 and |dy| > 2*|dx|
//!   3. lead lock:         |dx| > 40
//! Tap on release: elapsed < 220 ms and travelled distance < 32 px and no
//! special fired. Tap pitch is taken from the gesture's *start* position -
//! tap identity is fixed by where the gesture began.

use crate::instrument::InstrumentId;
use crate::MAX_POINTERS;

pub type PointerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
}

const DIAGONAL_MIN_PX: f32 = 60.0;
const DIAGONAL_BALANCE_PX: f32 = 40.0;
const PAD_LOCK_MIN_DY_PX: f32 = 50.0;
const PAD_LOCK_RATIO: f32 = 2.0;
const LEAD_LOCK_MIN_DX_PX: f32 = 40.0;
const TAP_MAX_SECONDS: f64 = 0.22;
const TAP_MAX_DISTANCE_PX: f32 = 32.0;

/// What the classifier decided for one pointer event. Slot indices are
/// stable for the lifetime of the gesture and shared with the synth and
/// visual arenas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    /// New gesture: start a sustained voice at the down position.
    Start { slot: usize },
    /// Continuous drag update; `lock` is set on the single move event that
    /// resolves the gesture's instrument, `None` afterwards.
    Move {
        slot: usize,
        lock: Option<InstrumentId>,
    },
    /// Diagonal flourish: kill the voice, fire the shimmer. Emitted at
    /// most once per gesture; later moves for this pointer are inert.
    Special { slot: usize },
    /// Quick touch: cut the voice and trigger the one-shot using the
    /// gesture's start position.
    Tap {
        slot: usize,
        start_x: f32,
        start_y: f32,
    },
    /// Drag ended normally: release with the instrument's envelope.
    Release { slot: usize },
    /// Pointer cancelled: release, no one-shot. Idempotent with Up.
    Cancel { slot: usize },
    /// Event for an unknown pointer, or no free slot. Dropped defensively.
    Ignored,
}

/// Accumulated state for one in-flight gesture.
#[derive(Debug, Clone, Copy)]
struct PointerGesture {
    id: PointerId,
    start_x: f32,
    start_y: f32,
    last_x: f32,
    last_y: f32,
    total_distance: f32,
    start_time: f64,
    locked_instrument: Option<InstrumentId>,
    triggered_special: bool,
}

/// Slot arena of gesture accumulators, indexed by a stable integer slot
/// with explicit liveness, so the hot pointer-move path does no map churn.
#[derive(Default)]
pub struct GestureClassifier {
    slots: [Option<PointerGesture>; MAX_POINTERS],
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of gestures currently in flight.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Feed one pointer event; `now` is seconds on a monotonic clock.
    pub fn handle(&mut self, event: PointerEvent, now: f64) -> GestureAction {
        match event.kind {
            PointerEventKind::Down => self.on_down(event, now),
            PointerEventKind::Move => self.on_move(event),
            PointerEventKind::Up => self.on_up(event, now),
            PointerEventKind::Cancel => self.on_cancel(event),
        }
    }

    fn on_down(&mut self, event: PointerEvent, now: f64) -> GestureAction {
        // A down for an id we already track is a protocol violation from
        // the event source; restart the gesture in place.
        let slot = match self.find_slot(event.id).or_else(|| self.free_slot()) {
            Some(slot) => slot,
            None => return GestureAction::Ignored,
        };

        self.slots[slot] = Some(PointerGesture {
            id: event.id,
            start_x: event.x,
            start_y: event.y,
            last_x: event.x,
            last_y: event.y,
            total_distance: 0.0,
            start_time: now,
            locked_instrument: None,
            triggered_special: false,
        });

        GestureAction::Start { slot }
    }

    fn on_move(&mut self, event: PointerEvent) -> GestureAction {
        let slot = match self.find_slot(event.id) {
            Some(slot) => slot,
            None => return GestureAction::Ignored,
        };
        let gesture = self.slots[slot].as_mut().unwrap();

        let step = ((event.x - gesture.last_x).powi(2) + (event.y - gesture.last_y).powi(2)).sqrt();
        gesture.total_distance += step;
        gesture.last_x = event.x;
        gesture.last_y = event.y;

        // A resolved special gesture produces no further tone changes.
        if gesture.triggered_special {
            return GestureAction::Ignored;
        }

        if gesture.locked_instrument.is_none() {
            let dx = (event.x - gesture.start_x).abs();
            let dy = (event.y - gesture.start_y).abs();

            if dx > DIAGONAL_MIN_PX && dy > DIAGONAL_MIN_PX && (dx - dy).abs() < DIAGONAL_BALANCE_PX
            {
                gesture.triggered_special = true;
                return GestureAction::Special { slot };
            }

            if dy > PAD_LOCK_MIN_DY_PX && dy > PAD_LOCK_RATIO * dx {
                gesture.locked_instrument = Some(InstrumentId::Pad);
                return GestureAction::Move {
                    slot,
                    lock: Some(InstrumentId::Pad),
                };
            }

            if dx > LEAD_LOCK_MIN_DX_PX {
                gesture.locked_instrument = Some(InstrumentId::Lead);
                return GestureAction::Move {
                    slot,
                    lock: Some(InstrumentId::Lead),
                };
            }
        }

        GestureAction::Move { slot, lock: None }
    }

    fn on_up(&mut self, event: PointerEvent, now: f64) -> GestureAction {
        let slot = match self.find_slot(event.id) {
            Some(slot) => slot,
            None => return GestureAction::Ignored,
        };
        let gesture = self.slots[slot].take().unwrap();

        let elapsed = now - gesture.start_time;
        let is_tap = !gesture.triggered_special
            && elapsed < TAP_MAX_SECONDS
            && gesture.total_distance < TAP_MAX_DISTANCE_PX;

        if is_tap {
            GestureAction::Tap {
                slot,
                start_x: gesture.start_x,
                start_y: gesture.start_y,
            }
        } else {
            GestureAction::Release { slot }
        }
    }

    fn on_cancel(&mut self, event: PointerEvent) -> GestureAction {
        match self.find_slot(event.id) {
            Some(slot) => {
                self.slots[slot] = None;
                GestureAction::Cancel { slot }
            }
            // Cancel after up (or for an unknown id) is a no-op.
            None => GestureAction::Ignored,
        }
    }

    fn find_slot(&self, id: PointerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.map(|g| g.id) == Some(id))
    }

    fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_none())
    }
}
