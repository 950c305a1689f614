//! Note Slicer - swipe through falling notes before they drop out of sight
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, slicing, physics, game state)
//! - `renderer`: Scene tessellation and WebGPU pipeline
//! - `hud`: Counter text and overlay visibility
//! - `audio`: Procedural Web Audio sound effects (wasm only)
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod hud;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Reference frame length the physics constants were tuned for (ms)
    pub const FRAME_MS: f32 = 16.0;
    /// Longest frame the physics will integrate in one step (ms)
    pub const MAX_FRAME_MS: f32 = 40.0;

    /// Downward acceleration on notes, px per reference frame²
    pub const GRAVITY: f32 = 0.42;
    /// Downward acceleration on particles, px per reference frame²
    pub const PARTICLE_GRAVITY: f32 = 0.12;

    /// Spawn interval at score 0 (ms)
    pub const SPAWN_INTERVAL_MS: f32 = 800.0;
    /// Spawn interval never drops below this (ms)
    pub const MIN_SPAWN_INTERVAL_MS: f32 = 220.0;
    /// Interval shrinks by score / this, ms
    pub const SPAWN_INTERVAL_SCORE_DIVISOR: f32 = 6.0;
    /// Largest score-driven interval reduction (ms)
    pub const MAX_SPAWN_INTERVAL_REDUCTION_MS: f32 = 400.0;
    /// Chance of a second note on every spawn tick
    pub const DOUBLE_SPAWN_BASE_CHANCE: f32 = 0.35;
    /// Extra double-spawn chance at high score
    pub const DOUBLE_SPAWN_MAX_BONUS: f32 = 0.4;
    /// Double-spawn bonus grows by score / this
    pub const DOUBLE_SPAWN_SCORE_DIVISOR: f32 = 1200.0;

    /// Notes start this far below the bottom edge (px)
    pub const SPAWN_DEPTH: f32 = 30.0;
    /// An unsliced note is lost once its top edge is this far below the bottom edge (px)
    pub const MISS_MARGIN: f32 = 40.0;
    /// Note radius range (px)
    pub const NOTE_MIN_SIZE: f32 = 16.0;
    pub const NOTE_SIZE_RANGE: f32 = 22.0;

    pub const INITIAL_LIVES: u8 = 3;
    /// Combo resets after this long without a slice (ms)
    pub const COMBO_TIMEOUT_MS: f64 = 1200.0;
    /// Score multiplier added per combo step
    pub const COMBO_BONUS: f32 = 0.12;

    /// Trail length (points)
    pub const MAX_TRAIL: usize = 18;
    /// Pointer moves shorter than this are ignored (px)
    pub const TRAIL_MIN_DISTANCE: f32 = 4.0;

    /// Sliced notes stay visible this long before removal (ms)
    pub const SLICE_LINGER_MS: f64 = 10.0;
    /// Particles per slice or miss burst
    pub const PARTICLES_PER_BURST: usize = 12;
    /// Upper bound on live particles
    pub const MAX_PARTICLES: usize = 512;
}

/// Convert a `0xRRGGBB` literal to RGBA floats
#[inline]
pub const fn rgb(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

/// Same color with a different alpha
#[inline]
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}
