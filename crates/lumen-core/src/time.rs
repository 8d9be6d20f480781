//! Frame timing for the Lumen engine
//!
//! `Timestep` is the per-frame delta handed to every update entry point.
//! `FrameClock` turns raw wall-clock deltas into scaled, clamped timesteps and
//! fixed-step counts for unattended playback.

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// Elapsed time for one frame, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestep(f32);

impl Timestep {
    pub const ZERO: Timestep = Timestep(0.0);

    pub const fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    pub fn seconds(&self) -> f32 {
        self.0
    }

    pub fn millis(&self) -> f32 {
        self.0 * 1000.0
    }
}

impl From<f32> for Timestep {
    fn from(seconds: f32) -> Self {
        Self(seconds)
    }
}

impl From<Timestep> for f32 {
    fn from(ts: Timestep) -> Self {
        ts.0
    }
}

impl Add for Timestep {
    type Output = Timestep;

    fn add(self, rhs: Timestep) -> Timestep {
        Timestep(self.0 + rhs.0)
    }
}

impl Mul<f32> for Timestep {
    type Output = Timestep;

    fn mul(self, rhs: f32) -> Timestep {
        Timestep(self.0 * rhs)
    }
}

/// Configuration for the frame clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Fixed timestep (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

/// Frame time tracking
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    pub config: ClockConfig,
    /// Time since start in seconds
    pub total_time: f64,
    /// Delta for this frame (clamped and scaled)
    pub delta: Timestep,
    pub frame_count: u64,
    pub paused: bool,
    fixed_accumulator: f32,
}

impl FrameClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Advance the clock with the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        let clamped = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.frame_count += 1;

        if self.paused {
            self.delta = Timestep::ZERO;
            return;
        }

        self.delta = Timestep(clamped * self.config.time_scale);
        self.total_time += self.delta.seconds() as f64;
        self.fixed_accumulator += self.delta.seconds();
    }

    /// Number of fixed timesteps to process this frame
    pub fn fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.fixed_accumulator >= self.config.fixed_timestep {
            self.fixed_accumulator -= self.config.fixed_timestep;
            steps += 1;
        }
        steps
    }

    /// The configured fixed step as a timestep
    pub fn fixed_timestep(&self) -> Timestep {
        Timestep(self.config.fixed_timestep)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }
}
