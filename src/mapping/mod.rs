//! Position-to-parameter mapping: the pure functions that turn a pointer
//! coordinate into pitch, loudness, pan, timbre, and color. Audio and
//! visuals both consume these outputs, which is what keeps them in sync.

pub mod color;
pub mod grid;
pub mod scale;

pub use color::Rgb;
pub use grid::{GridSample, ToneGrid, GRID_COLS, GRID_ROWS};
pub use scale::{gain_at, pan_at, PentatonicScale};

/// A4 = 440 Hz = MIDI note 69.
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
