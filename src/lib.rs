pub mod audio;
pub mod dsp; // Sample-level DSP primitives
pub mod error;
pub mod gesture; // Pointer gesture classification
pub mod instrument;
pub mod mapping; // Position -> pitch/gain/color
pub mod surface;
pub mod synth; // Voice management and polyphony
pub mod visual; // Emitter field and particles

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Maximum simultaneous pointers tracked by the gesture, synth, and visual
/// layers. Each pointer maps to one slot index in every arena.
pub const MAX_POINTERS: usize = 16;
