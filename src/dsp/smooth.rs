//! Scheduled linear parameter ramps.
//!
//! Every continuously-moved voice parameter (frequency, gain, pan, cutoff)
//! glides to its target over a fixed short ramp instead of snapping, so
//! pointer moves never produce clicks. The ramp is executed sample by
//! sample inside the audio callback, which decouples its timing from
//! control-thread jitter: once scheduled, "reach the target in 30 ms" is
//! honored on the audio clock.

use crate::MIN_TIME;

pub struct Smoothed {
    current: f32,
    target: f32,
    increment: f32,
    remaining: u32,
}

impl Smoothed {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            increment: 0.0,
            remaining: 0,
        }
    }

    /// Jump immediately, cancelling any ramp in flight. Used at voice
    /// start where there is no previous value to glide from.
    pub fn snap(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.remaining = 0;
    }

    /// Schedule a linear glide to `target` over `seconds`, replacing any
    /// ramp in flight (the glide restarts from the current value).
    pub fn set_target(&mut self, target: f32, seconds: f32, sample_rate: f32) {
        self.target = target;
        let samples = (seconds.max(MIN_TIME) * sample_rate).round().max(1.0) as u32;
        self.increment = (target - self.current) / samples as f32;
        self.remaining = samples;
    }

    pub fn next(&mut self) -> f32 {
        if self.remaining > 0 {
            self.current += self.increment;
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.remaining == 0
    }
}
