//! Note spawning
//!
//! A fixed-interval timer launches notes upward from just below the bottom
//! edge. Both the interval and the launch speed ramp with score.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Note, SliceState};
use crate::rgb;
use crate::tuning::Tuning;

/// Note colors
pub const NOTE_PALETTE: [[f32; 4]; 5] = [
    rgb(0xFF6B6B),
    rgb(0xFFD93D),
    rgb(0x6BCB77),
    rgb(0x4D96FF),
    rgb(0xB27EFF),
];

/// Cap on timer fires per step, so a long stall doesn't dump a wall of notes
pub const MAX_FIRES_PER_STEP: u32 = 4;

/// Time between spawn ticks at the given score (ms)
pub fn spawn_interval_ms(score: u64, tuning: &Tuning) -> f32 {
    let reduction = (score as f32 / tuning.spawn_interval_score_divisor)
        .min(tuning.max_spawn_interval_reduction_ms);
    (tuning.spawn_interval_ms - reduction).max(tuning.min_spawn_interval_ms)
}

/// Probability that a spawn tick launches a second note
pub fn double_spawn_chance(score: u64, tuning: &Tuning) -> f32 {
    tuning.double_spawn_base_chance
        + (score as f32 / tuning.double_spawn_score_divisor).min(tuning.double_spawn_max_bonus)
}

/// Accumulating spawn timer driven by the simulation clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnTimer {
    /// Time since the last fire (ms)
    pub elapsed_ms: f32,
}

impl SpawnTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }

    /// Advance by `elapsed_ms`; returns how many times the timer fired
    pub fn advance(&mut self, elapsed_ms: f32, score: u64, tuning: &Tuning) -> u32 {
        let interval = spawn_interval_ms(score, tuning);
        if !(interval.is_finite() && interval > 0.0) {
            return 0;
        }
        self.elapsed_ms += elapsed_ms.max(0.0);

        let mut fires = 0;
        while self.elapsed_ms >= interval && fires < MAX_FIRES_PER_STEP {
            self.elapsed_ms -= interval;
            fires += 1;
        }
        if fires == MAX_FIRES_PER_STEP && self.elapsed_ms >= interval {
            log::debug!("Spawn timer behind by {:.0}ms, dropping backlog", self.elapsed_ms);
            self.elapsed_ms %= interval;
        }
        fires
    }
}

/// Build a freshly launched note
pub fn spawn_note<R: Rng>(
    rng: &mut R,
    id: u32,
    surface: Vec2,
    score: u64,
    tuning: &Tuning,
) -> Note {
    let (w, h) = (surface.x, surface.y);
    let score = score as f32;

    let x = rng.random::<f32>() * (w * 0.8) + w * 0.1;
    let y = h + tuning.spawn_depth;
    let vx = (rng.random::<f32>() - 0.5) * 6.0 * (1.0 + score / 400.0);
    let vy = -(8.0 + rng.random::<f32>() * 8.0) * (1.0 + score / 600.0);
    let size = tuning.note_min_size + rng.random::<f32>() * tuning.note_size_range;
    let color = NOTE_PALETTE[rng.random_range(0..NOTE_PALETTE.len())];

    Note {
        id,
        pos: Vec2::new(x, y),
        vel: Vec2::new(vx, vy),
        size,
        color,
        rotation: rng.random::<f32>() * TAU,
        rotation_speed: (rng.random::<f32>() - 0.5) * 0.06,
        slice: SliceState::Live,
    }
}
