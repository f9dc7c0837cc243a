//! Immutable instrument definitions.
//!
//! An `InstrumentDefinition` is read-only configuration shared by every
//! voice that uses the timbre; nothing here is mutated after construction.
//! The palette has two gesture-locked families (`lead`, `pad`) plus a 5x5
//! grid of cell instruments, a checkerboard subset of which are short
//! percussive variants derived procedurally from the cell index - same
//! index, same parameters, every time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{FilterKind, Waveform};
use crate::mapping::grid::{cell_col, cell_row, GRID_COLS, GRID_ROWS};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentId {
    /// Default sustained timbre, locked by a horizontal drag.
    Lead,
    /// Alternate sustained timbre, locked by a vertical drag.
    Pad,
    /// One of the 25 grid cells, by row-major index.
    Cell(u8),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct FilterConfig {
    pub kind: FilterKind,
    pub cutoff_hz: f32,
    pub resonance: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct VibratoConfig {
    pub rate_hz: f32,
    pub depth_cents: f32,
}

/// Envelope and tone settings for the fire-and-forget player.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct OneShotConfig {
    pub waveform: Waveform,
    pub octave_offset: i8,
    pub detune_cents: f32,
    pub attack: f32,
    pub decay: f32,
    pub sustain_level: f32,
    pub release: f32,
    pub gain: f32,
    pub filter: FilterConfig,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct InstrumentDefinition {
    pub id: InstrumentId,
    pub waveform: Waveform,
    pub detune_cents: f32,
    pub attack: f32,
    pub sustain_level: f32,
    pub release_seconds: f32,
    pub filter: FilterConfig,
    pub vibrato: Option<VibratoConfig>,
    pub one_shot: OneShotConfig,
}

/// Bright, cutting default: saw with a moderate low-pass, some sustain.
pub fn lead() -> InstrumentDefinition {
    InstrumentDefinition {
        id: InstrumentId::Lead,
        waveform: Waveform::Saw,
        detune_cents: 0.0,
        attack: 0.01,
        sustain_level: 0.6,
        release_seconds: 0.2,
        filter: FilterConfig {
            kind: FilterKind::LowPass,
            cutoff_hz: 2_500.0,
            resonance: 0.1,
        },
        vibrato: None,
        one_shot: chime(),
    }
}

/// Lush, sustained alternate: slow attack, long release, slight detune for
/// width, slow vibrato for movement.
pub fn pad() -> InstrumentDefinition {
    InstrumentDefinition {
        id: InstrumentId::Pad,
        waveform: Waveform::Saw,
        detune_cents: 8.0,
        attack: 0.3,
        sustain_level: 0.8,
        release_seconds: 0.5,
        filter: FilterConfig {
            kind: FilterKind::LowPass,
            cutoff_hz: 1_800.0,
            resonance: 0.0,
        },
        vibrato: Some(VibratoConfig {
            rate_hz: 4.5,
            depth_cents: 8.0,
        }),
        one_shot: chime(),
    }
}

/// Tap chime: a short triangle an octave up with a fast exponential-feel
/// decay. The tap player uses this when no grid cell is involved.
pub fn chime() -> OneShotConfig {
    OneShotConfig {
        waveform: Waveform::Triangle,
        octave_offset: 1,
        detune_cents: 0.0,
        attack: 0.004,
        decay: 0.12,
        sustain_level: 0.25,
        release: 0.25,
        gain: 1.0,
        filter: FilterConfig {
            kind: FilterKind::LowPass,
            cutoff_hz: 6_000.0,
            resonance: 0.0,
        },
    }
}

/// One note of the shimmer arpeggio triggered by a diagonal flourish.
pub fn shimmer() -> OneShotConfig {
    OneShotConfig {
        waveform: Waveform::Sine,
        octave_offset: 1,
        detune_cents: 0.0,
        attack: 0.006,
        decay: 0.1,
        sustain_level: 0.3,
        release: 0.45,
        gain: 0.8,
        filter: FilterConfig {
            kind: FilterKind::BandPass,
            cutoff_hz: 3_200.0,
            resonance: 0.35,
        },
    }
}

/// Whether a grid cell carries a percussive variant instead of the
/// sustained row default. Checkerboard over (row, col).
pub fn cell_is_percussive(index: u8) -> bool {
    (cell_row(index) + cell_col(index)) % 2 == 1
}

/// Instrument for a grid cell. `base_freq` is the cell's own pitch, which
/// parameterizes the percussive variants' filters.
pub fn for_cell(index: u8, base_freq: f32) -> InstrumentDefinition {
    let index = index.min((GRID_ROWS * GRID_COLS - 1) as u8);
    if cell_is_percussive(index) {
        percussive_variant(index, base_freq)
    } else {
        sustained_cell(index)
    }
}

const PERCUSSIVE_WAVEFORMS: [Waveform; 4] = [
    Waveform::Square,
    Waveform::Triangle,
    Waveform::Saw,
    Waveform::Sine,
];

/// Short-envelope variant, a pure function of the cell index: the waveform
/// rotates through a fixed list, detune and cutoff derive from the variant
/// number and the cell's base frequency.
pub fn percussive_variant(index: u8, base_freq: f32) -> InstrumentDefinition {
    let variant = (index as usize * 7) % 5;
    let waveform = PERCUSSIVE_WAVEFORMS[index as usize % PERCUSSIVE_WAVEFORMS.len()];
    let detune = variant as f32 * 3.0 - 6.0;
    let cutoff = base_freq * (2.0 + variant as f32);

    InstrumentDefinition {
        id: InstrumentId::Cell(index),
        waveform,
        detune_cents: detune,
        attack: 0.002,
        sustain_level: 0.0,
        release_seconds: 0.08,
        filter: FilterConfig {
            kind: FilterKind::LowPass,
            cutoff_hz: cutoff.clamp(300.0, 9_000.0),
            resonance: 0.2,
        },
        vibrato: None,
        one_shot: OneShotConfig {
            waveform,
            octave_offset: 0,
            detune_cents: detune,
            attack: 0.002,
            decay: 0.07,
            sustain_level: 0.1,
            release: 0.12,
            gain: 0.9,
            filter: FilterConfig {
                kind: FilterKind::LowPass,
                cutoff_hz: cutoff.clamp(300.0, 9_000.0),
                resonance: 0.2,
            },
        },
    }
}

/// Sustained cell timbre: rows alternate saw and triangle, upper rows get
/// gentle vibrato.
fn sustained_cell(index: u8) -> InstrumentDefinition {
    let row = cell_row(index);
    let waveform = if row % 2 == 0 {
        Waveform::Saw
    } else {
        Waveform::Triangle
    };
    let vibrato = (row >= 3).then_some(VibratoConfig {
        rate_hz: 5.0,
        depth_cents: 6.0,
    });

    InstrumentDefinition {
        id: InstrumentId::Cell(index),
        waveform,
        detune_cents: 0.0,
        attack: 0.015,
        sustain_level: 0.65,
        release_seconds: 0.25,
        filter: FilterConfig {
            kind: FilterKind::LowPass,
            cutoff_hz: 2_200.0 + 350.0 * row as f32,
            resonance: 0.1,
        },
        vibrato,
        one_shot: chime(),
    }
}

/// Resolve an id to its definition. `base_freq` only matters for
/// percussive grid cells.
pub fn definition(id: InstrumentId, base_freq: f32) -> InstrumentDefinition {
    match id {
        InstrumentId::Lead => lead(),
        InstrumentId::Pad => pad(),
        InstrumentId::Cell(index) => for_cell(index, base_freq),
    }
}
