//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through [`tick`]
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod trail;

pub use collision::{Segment, segment_hits_circle, slice_segment};
pub use spawner::{NOTE_PALETTE, SpawnTimer, double_spawn_chance, spawn_interval_ms, spawn_note};
pub use state::{
    GameEvent, GamePhase, GameState, MISS_COLOR, Note, Particle, SliceState, slice_gain,
};
pub use tick::tick;
pub use trail::{Trail, TrailPoint};
