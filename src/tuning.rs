//! Data-driven game balance
//!
//! Every number the simulation uses lives here so a run can be re-balanced
//! from JSON without touching code. Missing fields fall back to
//! [`crate::consts`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// A tuning value the simulation cannot run with
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidTuning {
    pub field: &'static str,
    pub value: f64,
    /// What the value has to be
    pub expected: &'static str,
}

impl fmt::Display for InvalidTuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} (must be {})", self.field, self.value, self.expected)
    }
}

impl std::error::Error for InvalidTuning {}

/// Balance knobs for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Reference frame length (ms)
    pub frame_ms: f32,
    /// Frame time clamp (ms)
    pub max_frame_ms: f32,
    pub gravity: f32,
    pub particle_gravity: f32,

    // === Spawning ===
    pub spawn_interval_ms: f32,
    pub min_spawn_interval_ms: f32,
    pub spawn_interval_score_divisor: f32,
    pub max_spawn_interval_reduction_ms: f32,
    pub double_spawn_base_chance: f32,
    pub double_spawn_max_bonus: f32,
    pub double_spawn_score_divisor: f32,
    pub spawn_depth: f32,
    pub note_min_size: f32,
    pub note_size_range: f32,

    // === Rules ===
    pub miss_margin: f32,
    pub initial_lives: u8,
    pub combo_timeout_ms: f64,
    pub combo_bonus: f32,

    // === Input ===
    pub max_trail: usize,
    pub trail_min_distance: f32,

    // === Effects ===
    pub slice_linger_ms: f64,
    pub particles_per_burst: usize,
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            frame_ms: FRAME_MS,
            max_frame_ms: MAX_FRAME_MS,
            gravity: GRAVITY,
            particle_gravity: PARTICLE_GRAVITY,

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,
            spawn_interval_score_divisor: SPAWN_INTERVAL_SCORE_DIVISOR,
            max_spawn_interval_reduction_ms: MAX_SPAWN_INTERVAL_REDUCTION_MS,
            double_spawn_base_chance: DOUBLE_SPAWN_BASE_CHANCE,
            double_spawn_max_bonus: DOUBLE_SPAWN_MAX_BONUS,
            double_spawn_score_divisor: DOUBLE_SPAWN_SCORE_DIVISOR,
            spawn_depth: SPAWN_DEPTH,
            note_min_size: NOTE_MIN_SIZE,
            note_size_range: NOTE_SIZE_RANGE,

            miss_margin: MISS_MARGIN,
            initial_lives: INITIAL_LIVES,
            combo_timeout_ms: COMBO_TIMEOUT_MS,
            combo_bonus: COMBO_BONUS,

            max_trail: MAX_TRAIL,
            trail_min_distance: TRAIL_MIN_DISTANCE,

            slice_linger_ms: SLICE_LINGER_MS,
            particles_per_burst: PARTICLES_PER_BURST,
            max_particles: MAX_PARTICLES,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse an override, logging and falling back to defaults when it is
    /// malformed or fails [`Tuning::validate`]
    pub fn from_json_or_default(json: &str) -> Self {
        let tuning = match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring invalid tuning JSON: {}", e);
                return Self::default();
            }
        };
        match tuning.validate() {
            Ok(()) => {
                log::info!("Loaded tuning override");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning override: {}", e);
                Self::default()
            }
        }
    }

    /// Reject values that would stall or poison the simulation: zero
    /// divisors, non-positive intervals and anything non-finite.
    pub fn validate(&self) -> Result<(), InvalidTuning> {
        let positive = [
            ("frame_ms", self.frame_ms),
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
            ("spawn_interval_score_divisor", self.spawn_interval_score_divisor),
            ("double_spawn_score_divisor", self.double_spawn_score_divisor),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(InvalidTuning {
                    field,
                    value: value.into(),
                    expected: "finite and > 0",
                });
            }
        }

        let non_negative = [
            ("max_frame_ms", f64::from(self.max_frame_ms)),
            (
                "max_spawn_interval_reduction_ms",
                f64::from(self.max_spawn_interval_reduction_ms),
            ),
            ("combo_timeout_ms", self.combo_timeout_ms),
            ("slice_linger_ms", self.slice_linger_ms),
            ("trail_min_distance", f64::from(self.trail_min_distance)),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(InvalidTuning {
                    field,
                    value,
                    expected: "finite and >= 0",
                });
            }
        }

        if self.initial_lives == 0 {
            return Err(InvalidTuning {
                field: "initial_lives",
                value: 0.0,
                expected: "at least 1",
            });
        }
        Ok(())
    }

    /// Convert elapsed wall time into physics steps of one reference frame
    #[inline]
    pub fn frame_dt(&self, elapsed_ms: f32) -> f32 {
        elapsed_ms.clamp(0.0, self.max_frame_ms) / self.frame_ms
    }
}
