//! Control-to-audio messages.
//!
//! The control thread never touches voices directly; it pushes these
//! through an SPSC ring buffer and the audio callback drains them at block
//! boundaries. Everything is `Copy` so the queue never allocates.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::instrument::{InstrumentId, OneShotConfig};

#[derive(Debug, Copy, Clone)]
pub enum SynthMessage {
    /// Start a sustained voice in `slot`. A message for an occupied slot
    /// is a protocol violation from the gesture layer; the engine handles
    /// it defensively by resetting the old voice first.
    VoiceOn {
        slot: usize,
        instrument: InstrumentId,
        frequency: f32,
        gain: f32,
        pan: f32,
    },
    /// Retarget frequency/gain/pan with short ramps. `cutoff_hz` overrides
    /// the instrument's filter cutoff for variants whose cutoff tracks the
    /// vertical position.
    VoiceSet {
        slot: usize,
        frequency: f32,
        gain: f32,
        pan: f32,
        cutoff_hz: Option<f32>,
    },
    /// Morph the voice's timbre in place (gesture lock or grid cell
    /// change). The tone must stay continuous through the switch.
    VoiceMorph {
        slot: usize,
        instrument: InstrumentId,
        base_frequency: f32,
    },
    /// Normal release with the instrument's envelope.
    VoiceOff { slot: usize },
    /// Fast kill (about 10 ms): used for taps and defensive restarts.
    VoiceCut { slot: usize },
    /// Fire-and-forget transient, optionally delayed by whole frames.
    OneShot {
        config: OneShotConfig,
        frequency: f32,
        gain: f32,
        pan: f32,
        delay_frames: u32,
    },
    /// Diagonal-flourish arpeggio: staggered one-shots at rising harmonic
    /// intervals, expanded by the engine.
    Shimmer { frequency: f32, gain: f32, pan: f32 },
    AllOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

/// Control-side half of the queue. Push failure means the ring is full;
/// the caller drops the message (a missed note beats a blocked input
/// pipeline).
pub trait MessageSink {
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageSink for rtrb::Producer<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage> {
        rtrb::Producer::push(self, msg).map_err(|rtrb::PushError::Full(m)| m)
    }
}

impl MessageSink for std::collections::VecDeque<SynthMessage> {
    fn push(&mut self, msg: SynthMessage) -> Result<(), SynthMessage> {
        self.push_back(msg);
        Ok(())
    }
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
