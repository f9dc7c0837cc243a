//! The visual half of the instrument: a per-pointer emitter/ripple field
//! plus a particle system for gesture bursts. Runs on the render thread,
//! decoupled from the audio clock; all timing is explicit (`now` in
//! seconds) so the math is deterministic under test.

pub mod field;
pub mod particles;

pub use field::{EmitterField, FieldFrame, Ring};
pub use particles::{BurstKind, ParticleSystem, Spark};
