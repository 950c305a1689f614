//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameState`]; the platform layer only
//! feeds it pointer events and elapsed time, then reads it back to draw.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{self, Segment};
use super::spawner::{self, SpawnTimer};
use super::trail::Trail;
use crate::rgb;
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title menu
    Menu,
    /// Instructions, reached from the menu
    HowToPlay,
    /// Active run
    Playing,
    /// Run ended, waiting for restart
    GameOver,
}

/// Whether a note has been cut
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SliceState {
    Live,
    /// Cut at the given simulation time; still drawn until the linger delay passes
    Sliced { at_ms: f64 },
}

/// A note flying across the play surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radius (px)
    pub size: f32,
    pub color: [f32; 4],
    pub rotation: f32,
    /// Radians per reference frame
    pub rotation_speed: f32,
    pub slice: SliceState,
}

impl Note {
    #[inline]
    pub fn is_sliced(&self) -> bool {
        matches!(self.slice, SliceState::Sliced { .. })
    }

    /// Mark as cut. Only the first call has any effect.
    pub fn slice(&mut self, now_ms: f64) -> bool {
        if self.is_sliced() {
            return false;
        }
        self.slice = SliceState::Sliced { at_ms: now_ms };
        true
    }

    /// Gravity, motion and spin for `dt` reference frames
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.vel.y += gravity * dt;
        self.pos += self.vel * dt;
        self.rotation += self.rotation_speed * dt;
    }

    /// Top edge is more than `margin` below the bottom of the surface
    #[inline]
    pub fn has_dropped_out(&self, surface_height: f32, margin: f32) -> bool {
        self.pos.y - self.size > surface_height + margin
    }

    /// Sliced long enough ago to stop drawing
    pub fn linger_expired(&self, now_ms: f64, linger_ms: f64) -> bool {
        match self.slice {
            SliceState::Sliced { at_ms } => now_ms - at_ms >= linger_ms,
            SliceState::Live => false,
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: [f32; 4],
    pub size: f32,
    /// Simulation clock at creation (ms)
    pub born_ms: f64,
    /// Lifetime (ms)
    pub life_ms: f64,
}

impl Particle {
    #[inline]
    pub fn age(&self, now_ms: f64) -> f64 {
        now_ms - self.born_ms
    }

    #[inline]
    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.age(now_ms) > self.life_ms
    }

    /// Fade-out opacity, 1 at birth to 0 at end of life
    pub fn alpha(&self, now_ms: f64) -> f32 {
        (1.0 - self.age(now_ms) / self.life_ms).clamp(0.0, 1.0) as f32
    }
}

/// Miss burst color
pub const MISS_COLOR: [f32; 4] = rgb(0xFF4D6D);

/// Things that happened during a step, for the audio and HUD layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A note was cut
    Sliced {
        note_id: u32,
        gain: u64,
        combo: u32,
        /// Pluck pitch, rising left to right (Hz)
        frequency: f32,
    },
    /// A note fell out unsliced
    Missed { note_id: u32, lives: u8 },
    /// Last life lost
    GameOver { score: u64, best_combo: u32 },
}

/// Points for cutting a note of `size` at the current `combo`.
///
/// Smaller notes are worth more; each combo step adds `combo_bonus` to the
/// multiplier.
pub fn slice_gain(size: f32, combo: u32, combo_bonus: f32) -> u64 {
    let base = (10.0 + (30.0 - size) / 2.0).round();
    let gain = (base * (1.0 + combo as f32 * combo_bonus)).round();
    gain.max(0.0) as u64
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub combo: u32,
    pub best_combo: u32,
    pub lives: u8,
    /// Live and lingering notes, in spawn order
    pub notes: Vec<Note>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub trail: Trail,
    /// Simulation clock (ms since run start)
    pub clock_ms: f64,
    /// Clock of the last successful slice
    pub last_slice_ms: f64,
    pub spawner: SpawnTimer,
    /// Play surface size in CSS pixels
    pub surface: Vec2,
    pub tuning: Tuning,
    /// Pending events, drained by the platform each frame
    pub events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a game sitting at the menu
    pub fn new(seed: u64, surface: Vec2) -> Self {
        Self::with_tuning(seed, surface, Tuning::default())
    }

    pub fn with_tuning(seed: u64, surface: Vec2, tuning: Tuning) -> Self {
        Self {
            seed,
            phase: GamePhase::Menu,
            score: 0,
            combo: 0,
            best_combo: 0,
            lives: tuning.initial_lives,
            notes: Vec::new(),
            particles: Vec::new(),
            trail: Trail::new(tuning.max_trail, tuning.trail_min_distance),
            clock_ms: 0.0,
            last_slice_ms: 0.0,
            spawner: SpawnTimer::new(),
            surface,
            tuning,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface = Vec2::new(width.max(1.0), height.max(1.0));
    }

    // === Phase transitions ===

    pub fn show_how_to_play(&mut self) {
        if self.phase == GamePhase::Menu {
            self.phase = GamePhase::HowToPlay;
        }
    }

    pub fn back_to_menu(&mut self) {
        if self.phase == GamePhase::HowToPlay {
            self.phase = GamePhase::Menu;
        }
    }

    /// Start (from the menu) or restart (after game over) a fresh run
    pub fn start(&mut self) {
        if self.phase == GamePhase::Playing {
            return;
        }
        self.notes.clear();
        self.particles.clear();
        self.trail.pointer_up();
        self.events.clear();
        self.score = 0;
        self.combo = 0;
        self.best_combo = 0;
        self.lives = self.tuning.initial_lives;
        self.clock_ms = 0.0;
        self.last_slice_ms = 0.0;
        self.spawner.reset();
        self.phase = GamePhase::Playing;
        log::info!("Run started (seed {})", self.seed);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Pointer input ===

    pub fn pointer_down(&mut self, pos: Vec2) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.trail.pointer_down(pos, self.clock_ms);
    }

    /// Extend the trail and slice whatever the new segment crosses.
    /// Returns the number of notes cut.
    pub fn pointer_move(&mut self, pos: Vec2) -> usize {
        if self.phase != GamePhase::Playing {
            return 0;
        }
        match self.trail.pointer_move(pos, self.clock_ms) {
            Some(segment) => self.apply_segment(&segment),
            None => 0,
        }
    }

    pub fn pointer_up(&mut self) {
        self.trail.pointer_up();
    }

    /// Cut every live note crossed by `segment`
    pub fn apply_segment(&mut self, segment: &Segment) -> usize {
        let hits = collision::slice_segment(&mut self.notes, segment, self.clock_ms);
        for &index in &hits {
            self.register_slice(index);
        }
        hits.len()
    }

    // === Rules ===

    /// Score a note that was just cut
    fn register_slice(&mut self, index: usize) {
        let (id, pos, size, color) = {
            let note = &self.notes[index];
            (note.id, note.pos, note.size, note.color)
        };

        let gain = slice_gain(size, self.combo, self.tuning.combo_bonus);
        self.score += gain;
        self.combo += 1;
        self.best_combo = self.best_combo.max(self.combo);
        self.last_slice_ms = self.clock_ms;

        let frequency = 220.0 + (pos.x / self.surface.x) * 880.0;
        self.events.push(GameEvent::Sliced {
            note_id: id,
            gain,
            combo: self.combo,
            frequency,
        });
        self.spawn_burst(pos, color);

        log::debug!("Sliced note {} for {} (combo {})", id, gain, self.combo);
    }

    /// Charge a life for a note that dropped out. Returns true if that ended the run.
    pub(crate) fn register_miss(&mut self, note_id: u32) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.combo = 0;
        self.events.push(GameEvent::Missed {
            note_id,
            lives: self.lives,
        });

        let x = self.rng.random::<f32>() * self.surface.x;
        let origin = Vec2::new(x, self.surface.y - 20.0);
        self.spawn_burst(origin, MISS_COLOR);

        log::debug!("Missed note {} ({} lives left)", note_id, self.lives);

        if self.lives == 0 {
            self.end_run();
            return true;
        }
        false
    }

    fn end_run(&mut self) {
        self.phase = GamePhase::GameOver;
        self.trail.pointer_up();
        self.events.push(GameEvent::GameOver {
            score: self.score,
            best_combo: self.best_combo,
        });
        log::info!(
            "Game over: score {}, best combo {}",
            self.score,
            self.best_combo
        );
    }

    /// Launch one note from below the bottom edge
    pub fn spawn_note(&mut self) -> u32 {
        let id = self.next_entity_id();
        let note = spawner::spawn_note(&mut self.rng, id, self.surface, self.score, &self.tuning);
        log::debug!(
            "Spawned note {} at ({:.0}, {:.0}) size {:.1}",
            id,
            note.pos.x,
            note.pos.y,
            note.size
        );
        self.notes.push(note);
        id
    }

    /// Throw a ring of sparks from `origin`
    pub fn spawn_burst(&mut self, origin: Vec2, color: [f32; 4]) {
        let room = self
            .tuning
            .max_particles
            .saturating_sub(self.particles.len());
        let count = self.tuning.particles_per_burst.min(room);

        for _ in 0..count {
            let vx = (self.rng.random::<f32>() - 0.5) * 6.0;
            let vy = (self.rng.random::<f32>() - 1.5) * 6.0;
            let life_ms = 400.0 + self.rng.random::<f64>() * 500.0;
            let size = 2.0 + self.rng.random::<f32>() * 4.0;
            self.particles.push(Particle {
                pos: origin,
                vel: Vec2::new(vx, vy),
                color,
                size,
                born_ms: self.clock_ms,
                life_ms,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: u32, x: f32, y: f32, size: f32) -> Note {
        Note {
            id,
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            size,
            color: [1.0; 4],
            rotation: 0.0,
            rotation_speed: 0.0,
            slice: SliceState::Live,
        }
    }

    fn playing() -> GameState {
        let mut state = GameState::new(42, Vec2::new(400.0, 600.0));
        state.start();
        state
    }

    #[test]
    fn test_slice_gain_combo_multiplier() {
        assert_eq!(slice_gain(20.0, 0, 0.12), 15);
        assert_eq!(slice_gain(20.0, 1, 0.12), 17);
        assert_eq!(slice_gain(20.0, 2, 0.12), 19);
        // Smaller notes are worth more
        assert!(slice_gain(16.0, 0, 0.12) > slice_gain(38.0, 0, 0.12));
        assert_eq!(slice_gain(38.0, 0, 0.12), 6);
    }

    #[test]
    fn test_menu_navigation() {
        let mut state = GameState::new(1, Vec2::new(400.0, 600.0));
        assert_eq!(state.phase, GamePhase::Menu);
        state.show_how_to_play();
        assert_eq!(state.phase, GamePhase::HowToPlay);
        state.back_to_menu();
        assert_eq!(state.phase, GamePhase::Menu);
        state.start();
        assert_eq!(state.phase, GamePhase::Playing);
        // How-to-play is only reachable from the menu
        state.show_how_to_play();
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_swipe_scores_and_builds_combo() {
        let mut state = playing();
        let id_a = state.next_entity_id();
        let id_b = state.next_entity_id();
        let id_c = state.next_entity_id();
        state.notes.push(note(id_a, 100.0, 300.0, 20.0));
        state.notes.push(note(id_b, 200.0, 300.0, 20.0));
        state.notes.push(note(id_c, 300.0, 300.0, 20.0));

        state.pointer_down(Vec2::new(50.0, 300.0));
        assert_eq!(state.pointer_move(Vec2::new(150.0, 300.0)), 1);
        assert_eq!(state.score, 15);
        assert_eq!(state.pointer_move(Vec2::new(250.0, 300.0)), 1);
        assert_eq!(state.score, 15 + 17);
        assert_eq!(state.pointer_move(Vec2::new(350.0, 300.0)), 1);
        assert_eq!(state.score, 15 + 17 + 19);
        assert_eq!(state.combo, 3);
        assert_eq!(state.best_combo, 3);

        let events = state.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            GameEvent::Sliced { note_id, gain: 15, combo: 1, .. } if note_id == id_a
        ));
        assert_eq!(state.particles.len(), 36);
    }

    #[test]
    fn test_pluck_pitch_follows_x() {
        let mut state = playing();
        let id = state.next_entity_id();
        state.notes.push(note(id, 200.0, 300.0, 20.0));
        state.apply_segment(&Segment::new(Vec2::new(200.0, 250.0), Vec2::new(200.0, 350.0)));
        match &state.events[0] {
            GameEvent::Sliced { frequency, .. } => assert!((frequency - 660.0).abs() < 1e-3),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_input_ignored_outside_play() {
        let mut state = GameState::new(3, Vec2::new(400.0, 600.0));
        let id = state.next_entity_id();
        state.notes.push(note(id, 100.0, 100.0, 20.0));
        state.pointer_down(Vec2::new(50.0, 100.0));
        assert_eq!(state.pointer_move(Vec2::new(150.0, 100.0)), 0);
        assert!(state.trail.is_empty());
        assert!(!state.notes[0].is_sliced());
    }

    #[test]
    fn test_miss_costs_life_and_combo() {
        let mut state = playing();
        state.combo = 4;
        assert!(!state.register_miss(9));
        assert_eq!(state.lives, 2);
        assert_eq!(state.combo, 0);
        assert_eq!(state.events, vec![GameEvent::Missed { note_id: 9, lives: 2 }]);
    }

    #[test]
    fn test_last_miss_ends_run_once() {
        let mut state = playing();
        state.score = 120;
        state.best_combo = 7;
        state.register_miss(1);
        state.register_miss(2);
        assert!(state.register_miss(3));
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);

        let game_overs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(
            state.events.last(),
            Some(&GameEvent::GameOver { score: 120, best_combo: 7 })
        );
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = playing();
        let id = state.next_entity_id();
        state.notes.push(note(id, 100.0, 100.0, 20.0));
        state.score = 500;
        state.combo = 3;
        state.best_combo = 9;
        state.register_miss(1);
        state.register_miss(2);
        state.register_miss(3);
        assert_eq!(state.phase, GamePhase::GameOver);

        state.start();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert_eq!(state.best_combo, 0);
        assert_eq!(state.lives, 3);
        assert!(state.notes.is_empty());
        assert!(state.particles.is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_particle_cap() {
        let mut state = playing();
        state.tuning.max_particles = 20;
        state.spawn_burst(Vec2::ZERO, MISS_COLOR);
        state.spawn_burst(Vec2::ZERO, MISS_COLOR);
        assert_eq!(state.particles.len(), 20);
    }

    #[test]
    fn test_note_slices_once() {
        let mut n = note(1, 0.0, 0.0, 10.0);
        assert!(n.slice(5.0));
        assert!(!n.slice(8.0));
        assert_eq!(n.slice, SliceState::Sliced { at_ms: 5.0 });
        assert!(!n.linger_expired(14.0, 10.0));
        assert!(n.linger_expired(15.0, 10.0));
    }
}
