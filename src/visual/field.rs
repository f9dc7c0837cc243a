//! The emitter field: persistent light ripples per active pointer plus
//! transient pulses, rendered as expanding ring wavefronts.
//!
//! Ring positions are computed analytically from elapsed time - there is
//! no per-ring state, so a frame is a pure function of
//! `(frequency, elapsed, band width)` and the per-frame cost is bounded by
//! the surface size. Emitters live in the same slot arena as voices;
//! visual and sonic state for a pointer can never diverge because both
//! consume the same `(slot, x, y, frequency, color)` tuples.

use crate::mapping::Rgb;
use crate::visual::particles::{BurstKind, ParticleSystem, Spark};
use crate::MAX_POINTERS;

/// Seconds an emitter's color takes to blend to a new target.
const COLOR_TRANSITION_SECONDS: f64 = 0.25;
/// Seconds from deactivation to full fade-out (and removal).
pub const EMITTER_RELEASE_SECONDS: f64 = 0.6;
/// Default pulse time-to-live.
pub const PULSE_TTL_SECONDS: f64 = 0.9;
/// Radial distance between consecutive wavefront rings.
const RING_BAND_PX: f32 = 14.0;

/// Ring expansion speed in px/s as a function of pitch: higher notes
/// ripple faster.
fn ring_speed(frequency: f32) -> f32 {
    40.0 + frequency * 0.08
}

struct ColorTransition {
    from: Rgb,
    to: Rgb,
    started: f64,
}

impl ColorTransition {
    fn fixed(color: Rgb) -> Self {
        Self {
            from: color,
            to: color,
            started: 0.0,
        }
    }

    fn at(&self, now: f64) -> Rgb {
        let t = ((now - self.started) / COLOR_TRANSITION_SECONDS).clamp(0.0, 1.0);
        self.from.lerp(self.to, t as f32)
    }

    fn retarget(&mut self, target: Rgb, now: f64) {
        if target == self.to {
            return;
        }
        self.from = self.at(now);
        self.to = target;
        self.started = now;
    }
}

struct Emitter {
    x: f32,
    y: f32,
    frequency: f32,
    color: ColorTransition,
    created_at: f64,
    /// Some(t) once released; drives the linear fade to zero.
    released_at: Option<f64>,
}

impl Emitter {
    /// 1.0 while active, linearly decaying to exactly 0.0 over the
    /// release duration, never increasing once released.
    fn intensity(&self, now: f64) -> f32 {
        match self.released_at {
            None => 1.0,
            Some(t) => {
                let fade = 1.0 - (now - t) / EMITTER_RELEASE_SECONDS;
                fade.clamp(0.0, 1.0) as f32
            }
        }
    }

    fn is_faded(&self, now: f64) -> bool {
        self.released_at
            .map(|t| now - t >= EMITTER_RELEASE_SECONDS)
            .unwrap_or(false)
    }
}

struct Pulse {
    x: f32,
    y: f32,
    frequency: f32,
    color: Rgb,
    created_at: f64,
    ttl: f64,
}

/// One renderable wavefront ring.
#[derive(Debug, Clone, Copy)]
pub struct Ring {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgb,
    /// 0..1 draw intensity.
    pub intensity: f32,
}

/// Everything to draw this frame.
#[derive(Default)]
pub struct FieldFrame {
    pub rings: Vec<Ring>,
    pub sparks: Vec<Spark>,
}

pub struct EmitterField {
    width: f32,
    height: f32,
    emitters: [Option<Emitter>; MAX_POINTERS],
    pulses: Vec<Pulse>,
    particles: ParticleSystem,
    last_update: Option<f64>,
}

impl EmitterField {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            emitters: Default::default(),
            pulses: Vec::new(),
            particles: ParticleSystem::default(),
            last_update: None,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn active_emitter_count(&self) -> usize {
        self.emitters.iter().filter(|e| e.is_some()).count()
    }

    pub fn pulse_count(&self) -> usize {
        self.pulses.len()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Create or refresh the emitter for `slot`. First call for a slot
    /// creates it; later calls move it and retarget frequency/color.
    pub fn touch(&mut self, slot: usize, x: f32, y: f32, frequency: f32, color: Rgb, now: f64) {
        let Some(entry) = self.emitters.get_mut(slot) else {
            return;
        };

        match entry {
            Some(emitter) => {
                emitter.x = x;
                emitter.y = y;
                emitter.frequency = frequency;
                emitter.color.retarget(color, now);
                // Touching a fading emitter revives it (same pointer slot
                // re-pressed before the fade finished).
                emitter.released_at = None;
            }
            None => {
                *entry = Some(Emitter {
                    x,
                    y,
                    frequency,
                    color: ColorTransition::fixed(color),
                    created_at: now,
                    released_at: None,
                });
            }
        }
    }

    /// Mark the emitter inactive. It keeps rendering while it fades and
    /// is garbage-collected by `update` once intensity reaches zero.
    /// Idempotent: releasing twice keeps the first fade timestamp.
    pub fn release(&mut self, slot: usize, now: f64) {
        if let Some(Some(emitter)) = self.emitters.get_mut(slot) {
            if emitter.released_at.is_none() {
                emitter.released_at = Some(now);
            }
        }
    }

    /// One-shot ripple burst, immutable once created.
    pub fn spawn_pulse(&mut self, x: f32, y: f32, frequency: f32, color: Rgb, now: f64) {
        self.pulses.push(Pulse {
            x,
            y,
            frequency,
            color,
            created_at: now,
            ttl: PULSE_TTL_SECONDS,
        });
    }

    /// Particle burst at a gesture trigger point.
    pub fn burst(&mut self, kind: BurstKind, x: f32, y: f32, color: Rgb, now: f64) {
        self.particles.burst(kind, x, y, color, now);
    }

    /// Advance the per-frame simulation: color transitions resolve lazily
    /// in `frame`, so this only garbage-collects faded emitters, expires
    /// pulses, and integrates particles.
    pub fn update(&mut self, now: f64) {
        for entry in &mut self.emitters {
            if entry.as_ref().map(|e| e.is_faded(now)).unwrap_or(false) {
                *entry = None;
            }
        }

        self.pulses.retain(|p| now - p.created_at < p.ttl);

        let dt = self
            .last_update
            .map(|t| (now - t) as f32)
            .unwrap_or(0.0);
        self.particles.step(dt, now);
        self.last_update = Some(now);
    }

    /// Intensity of the emitter in `slot`, if it exists. Test hook for the
    /// fade invariants.
    pub fn emitter_intensity(&self, slot: usize, now: f64) -> Option<f32> {
        self.emitters
            .get(slot)
            .and_then(|e| e.as_ref())
            .map(|e| e.intensity(now))
    }

    /// Build this frame's display list.
    pub fn frame(&self, now: f64) -> FieldFrame {
        let mut frame = FieldFrame::default();

        for emitter in self.emitters.iter().flatten() {
            let intensity = emitter.intensity(now);
            if intensity <= 0.0 {
                continue;
            }
            let color = emitter.color.at(now);
            let elapsed = (now - emitter.created_at) as f32;
            self.push_rings(
                &mut frame.rings,
                emitter.x,
                emitter.y,
                emitter.frequency,
                color,
                elapsed,
                intensity,
            );
        }

        for pulse in &self.pulses {
            let age = now - pulse.created_at;
            if age >= pulse.ttl {
                continue;
            }
            let intensity = (1.0 - age / pulse.ttl) as f32;
            self.push_rings(
                &mut frame.rings,
                pulse.x,
                pulse.y,
                pulse.frequency,
                pulse.color,
                age as f32,
                intensity,
            );
        }

        frame.sparks.extend(self.particles.sparks(now));
        frame
    }

    /// Concentric wavefronts expanding from (x, y). The innermost ring's
    /// radius is the expansion phase `(elapsed * speed) mod band`; the
    /// rest follow at band-width spacing out to the surface bounds,
    /// alternating the base color with its boosted variant.
    fn push_rings(
        &self,
        rings: &mut Vec<Ring>,
        x: f32,
        y: f32,
        frequency: f32,
        color: Rgb,
        elapsed: f32,
        intensity: f32,
    ) {
        // No ring can be seen beyond the farthest surface corner.
        let max_radius = {
            let dx = x.max(self.width - x);
            let dy = y.max(self.height - y);
            (dx * dx + dy * dy).sqrt()
        };

        let phase = (elapsed * ring_speed(frequency)).rem_euclid(RING_BAND_PX);
        let count = ((max_radius - phase) / RING_BAND_PX).ceil().max(0.0) as usize;

        for k in 0..count {
            let radius = phase + k as f32 * RING_BAND_PX;
            if radius < 0.5 {
                continue;
            }
            let ring_color = if k % 2 == 0 { color } else { color.boosted() };
            rings.push(Ring {
                x,
                y,
                radius,
                color: ring_color,
                intensity,
            });
        }
    }
}
