//! 5x5 tone grid: the grid-variant mapper.
//!
//! Pitch and color blend *continuously* across the surface (bilinear over
//! the four nearest cells), while the instrument timbre is quantized to
//! the primary cell under the pointer. Both facts matter: the blend gives
//! the portamento/color-wash feel, the quantization makes timbre switches
//! land exactly on cell boundaries.

use crate::mapping::color::{hsl, Rgb};
use crate::mapping::midi_note_to_freq;

pub const GRID_ROWS: usize = 5;
pub const GRID_COLS: usize = 5;

/// Row of a row-major cell index.
pub fn cell_row(index: u8) -> usize {
    (index as usize / GRID_COLS).min(GRID_ROWS - 1)
}

/// Column of a row-major cell index.
pub fn cell_col(index: u8) -> usize {
    index as usize % GRID_COLS
}

/// Pentatonic degree offsets in semitones.
const DEGREE_SEMITONES: [u8; GRID_COLS] = [0, 2, 4, 7, 9];

/// What a surface position maps to in the grid variant.
#[derive(Debug, Clone, Copy)]
pub struct GridSample {
    /// Bilinearly blended frequency (Hz).
    pub frequency: f32,
    /// Bilinearly blended cell color.
    pub color: Rgb,
    /// Row-major index of the primary (non-interpolated) cell, used for
    /// instrument selection.
    pub cell: u8,
}

pub struct ToneGrid {
    frequencies: [[f32; GRID_COLS]; GRID_ROWS],
    colors: [[Rgb; GRID_COLS]; GRID_ROWS],
}

impl Default for ToneGrid {
    fn default() -> Self {
        let mut frequencies = [[0.0; GRID_COLS]; GRID_ROWS];
        let mut colors = [[Rgb::new(0, 0, 0); GRID_COLS]; GRID_ROWS];

        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                // Rows stack in fifths from C3 at the bottom; columns walk
                // the pentatonic degrees. Top row is highest.
                let note = 48 + ((GRID_ROWS - 1 - row) * 7) as u8 + DEGREE_SEMITONES[col];
                frequencies[row][col] = midi_note_to_freq(note);

                let hue = col as f32 * (360.0 / GRID_COLS as f32);
                let lightness = 0.65 - 0.07 * row as f32;
                colors[row][col] = hsl(hue, 0.8, lightness);
            }
        }

        Self {
            frequencies,
            colors,
        }
    }
}

impl ToneGrid {
    pub fn cell_frequency(&self, index: u8) -> f32 {
        self.frequencies[cell_row(index)][cell_col(index)]
    }

    pub fn cell_color(&self, index: u8) -> Rgb {
        self.colors[cell_row(index)][cell_col(index)]
    }

    /// Map a surface position to a blended frequency/color and the primary
    /// cell index.
    pub fn sample(&self, x: f32, y: f32, width: f32, height: f32) -> GridSample {
        let u = (x / width.max(1.0)).clamp(0.0, 1.0);
        let v = (y / height.max(1.0)).clamp(0.0, 1.0);

        // Continuous coordinates in cell-index space for the blend.
        let cu = u * (GRID_COLS - 1) as f32;
        let cv = v * (GRID_ROWS - 1) as f32;
        let c0 = cu.floor() as usize;
        let r0 = cv.floor() as usize;
        let c1 = (c0 + 1).min(GRID_COLS - 1);
        let r1 = (r0 + 1).min(GRID_ROWS - 1);
        let fu = cu - c0 as f32;
        let fv = cv - r0 as f32;

        let blend = |a: f32, b: f32, t: f32| a + (b - a) * t;
        let top = blend(self.frequencies[r0][c0], self.frequencies[r0][c1], fu);
        let bottom = blend(self.frequencies[r1][c0], self.frequencies[r1][c1], fu);
        let frequency = blend(top, bottom, fv);

        let top_color = self.colors[r0][c0].lerp(self.colors[r0][c1], fu);
        let bottom_color = self.colors[r1][c0].lerp(self.colors[r1][c1], fu);
        let color = top_color.lerp(bottom_color, fv);

        // Primary cell: the cell the point actually sits in.
        let pcol = ((u * GRID_COLS as f32) as usize).min(GRID_COLS - 1);
        let prow = ((v * GRID_ROWS as f32) as usize).min(GRID_ROWS - 1);
        let cell = (prow * GRID_COLS + pcol) as u8;

        GridSample {
            frequency,
            color,
            cell,
        }
    }
}
