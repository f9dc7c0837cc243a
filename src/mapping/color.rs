#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plain 8-bit RGB. Converted to a terminal color by the front-end.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Saturation-boosted, slightly darkened variant used for every other
    /// ring of a wavefront.
    pub fn boosted(self) -> Rgb {
        let (r, g, b) = (self.r as f32, self.g as f32, self.b as f32);
        let mean = (r + g + b) / 3.0;
        let push = |c: f32| ((mean + (c - mean) * 1.6) * 0.75).clamp(0.0, 255.0) as u8;
        Rgb::new(push(r), push(g), push(b))
    }

    /// Scale toward black by `intensity` in [0, 1]. Used for fade-out.
    pub fn dimmed(self, intensity: f32) -> Rgb {
        let k = intensity.clamp(0.0, 1.0);
        Rgb::new(
            (self.r as f32 * k) as u8,
            (self.g as f32 * k) as u8,
            (self.b as f32 * k) as u8,
        )
    }
}

/// Hue (degrees), saturation, lightness in [0, 1] to RGB. The grid palette
/// is built from evenly spaced hues, so this lives here rather than in the
/// front-end.
pub fn hsl(h: f32, s: f32, l: f32) -> Rgb {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r1, g1, b1) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb::new(
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    )
}
