//! Gesture-triggered particle bursts.
//!
//! Each burst draws per-particle velocity, lifetime, size growth, and glow
//! from a named profile, then integrates simple velocity plus light
//! turbulence and drag each frame. A hard cap bounds memory and CPU; the
//! oldest particles go first when it is hit.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::mapping::Rgb;

/// Global particle budget across all bursts.
const MAX_PARTICLES: usize = 768;

const DRAG_PER_SECOND: f32 = 1.6;
const TURBULENCE: f32 = 18.0;

/// Visual flavor of a burst. Each maps to a distinct profile of count,
/// speed, lifetime, and alpha ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    /// Quick tap: small, fast, short-lived.
    TapSpark,
    /// Diagonal flourish: big slow bloom with long glow.
    ShimmerBloom,
    /// Continuous drag feedback: a few drifting motes.
    DragTrail,
}

struct BurstProfile {
    count: (usize, usize),
    speed: (f32, f32),
    lifetime: (f32, f32),
    size: (f32, f32),
    growth: (f32, f32),
    glow: (f32, f32),
    alpha: (f32, f32),
}

impl BurstKind {
    fn profile(self) -> BurstProfile {
        match self {
            BurstKind::TapSpark => BurstProfile {
                count: (10, 16),
                speed: (40.0, 110.0),
                lifetime: (0.25, 0.6),
                size: (0.6, 1.2),
                growth: (0.0, 1.5),
                glow: (1.0, 2.0),
                alpha: (0.7, 1.0),
            },
            BurstKind::ShimmerBloom => BurstProfile {
                count: (24, 36),
                speed: (15.0, 55.0),
                lifetime: (0.8, 1.6),
                size: (0.8, 1.8),
                growth: (1.0, 3.0),
                glow: (2.0, 4.0),
                alpha: (0.5, 0.9),
            },
            BurstKind::DragTrail => BurstProfile {
                count: (2, 4),
                speed: (5.0, 25.0),
                lifetime: (0.3, 0.8),
                size: (0.4, 0.9),
                growth: (0.0, 0.8),
                glow: (0.5, 1.5),
                alpha: (0.3, 0.6),
            },
        }
    }
}

struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    born: f64,
    lifetime: f32,
    size: f32,
    growth: f32,
    glow: f32,
    alpha: f32,
    color: Rgb,
}

/// One renderable particle.
#[derive(Debug, Clone, Copy)]
pub struct Spark {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub glow: f32,
    pub color: Rgb,
    /// 0..1, already faded by remaining lifetime.
    pub intensity: f32,
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: SmallRng,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            rng: SmallRng::seed_from_u64(0x5EED),
        }
    }
}

impl ParticleSystem {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Spawn one burst at a gesture trigger point.
    pub fn burst(&mut self, kind: BurstKind, x: f32, y: f32, color: Rgb, now: f64) {
        let profile = kind.profile();
        let count = self.rng.gen_range(profile.count.0..=profile.count.1);

        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.gen_range(profile.speed.0..profile.speed.1);

            let particle = Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                born: now,
                lifetime: self.rng.gen_range(profile.lifetime.0..profile.lifetime.1),
                size: self.rng.gen_range(profile.size.0..profile.size.1),
                growth: self.rng.gen_range(profile.growth.0..profile.growth.1),
                glow: self.rng.gen_range(profile.glow.0..profile.glow.1),
                alpha: self.rng.gen_range(profile.alpha.0..profile.alpha.1),
                color,
            };

            if self.particles.len() >= MAX_PARTICLES {
                // Oldest first: index 0 is always the longest-lived entry
                // because spawns push to the back.
                self.particles.remove(0);
            }
            self.particles.push(particle);
        }
    }

    /// Integrate one frame of `dt` seconds and cull expired particles.
    pub fn step(&mut self, dt: f32, now: f64) {
        let dt = dt.clamp(0.0, 0.1);
        let drag = (1.0 - DRAG_PER_SECOND * dt).max(0.0);

        let Self { particles, rng } = self;
        for p in particles.iter_mut() {
            p.vx += rng.gen_range(-TURBULENCE..TURBULENCE) * dt;
            p.vy += rng.gen_range(-TURBULENCE..TURBULENCE) * dt;
            p.vx *= drag;
            p.vy *= drag;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.size += p.growth * dt;
        }

        self.particles
            .retain(|p| (now - p.born) < p.lifetime as f64);
    }

    /// Current renderable sparks, intensity fading linearly with age.
    pub fn sparks(&self, now: f64) -> impl Iterator<Item = Spark> + '_ {
        self.particles.iter().filter_map(move |p| {
            let age = (now - p.born) as f32;
            if age >= p.lifetime {
                return None;
            }
            let fade = 1.0 - age / p.lifetime;
            Some(Spark {
                x: p.x,
                y: p.y,
                size: p.size,
                glow: p.glow,
                color: p.color,
                intensity: (p.alpha * fade).clamp(0.0, 1.0),
            })
        })
    }
}
