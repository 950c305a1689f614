//! Per-frame simulation step
//!
//! Advances notes and particles, charges misses, expires the combo and runs
//! the spawn timer. Only the clock passed in drives it, so a seeded state fed
//! the same frame times and pointer events always ends up in the same place.

use rand::Rng;

use super::spawner;
use super::state::{GamePhase, GameState};

/// Advance the game by one rendered frame of `elapsed_ms` wall time.
///
/// Evaluation order within a step:
/// 1. note physics, then misses (may end the run and stop the step)
/// 2. removal of sliced notes past their linger delay
/// 3. particle ageing and physics
/// 4. combo idle timeout
/// 5. spawn timer
pub fn tick(state: &mut GameState, elapsed_ms: f64) {
    if state.phase != GamePhase::Playing {
        return;
    }

    let elapsed_ms = elapsed_ms.max(0.0);
    state.clock_ms += elapsed_ms;
    let now = state.clock_ms;
    let dt = state.tuning.frame_dt(elapsed_ms as f32);

    // Notes
    let gravity = state.tuning.gravity;
    let floor = state.surface.y;
    let margin = state.tuning.miss_margin;
    let mut missed = Vec::new();
    for note in &mut state.notes {
        note.integrate(dt, gravity);
        if !note.is_sliced() && note.has_dropped_out(floor, margin) {
            missed.push(note.id);
        }
    }
    if !missed.is_empty() {
        state.notes.retain(|n| !missed.contains(&n.id));
        for id in missed {
            if state.register_miss(id) {
                return;
            }
        }
    }

    let linger = state.tuning.slice_linger_ms;
    state.notes.retain(|n| !n.linger_expired(now, linger));

    // Particles
    let particle_gravity = state.tuning.particle_gravity;
    state.particles.retain(|p| !p.is_expired(now));
    for particle in &mut state.particles {
        particle.vel.y += particle_gravity * dt;
        particle.pos += particle.vel * dt;
    }

    // Combo idle timeout
    if state.combo > 0 && now - state.last_slice_ms > state.tuning.combo_timeout_ms {
        log::debug!("Combo {} timed out", state.combo);
        state.combo = 0;
    }

    // Spawning
    let fires = state
        .spawner
        .advance(elapsed_ms as f32, state.score, &state.tuning);
    for _ in 0..fires {
        state.spawn_note();
        let chance = spawner::double_spawn_chance(state.score, &state.tuning);
        if state.rng().random::<f32>() < chance {
            state.spawn_note();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Segment;
    use crate::sim::state::{GameEvent, Note, SliceState};
    use glam::Vec2;

    const FRAME: f64 = 16.0;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Vec2::new(400.0, 600.0));
        state.start();
        state
    }

    fn still_note(state: &mut GameState, x: f32, y: f32) -> u32 {
        let id = state.next_entity_id();
        state.notes.push(Note {
            id,
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            size: 20.0,
            color: [1.0; 4],
            rotation: 0.0,
            rotation_speed: 0.0,
            slice: SliceState::Live,
        });
        id
    }

    /// Keep the spawner quiet so tests only see their own notes
    fn no_spawns(state: &mut GameState) {
        state.tuning.spawn_interval_ms = f32::MAX;
        state.tuning.min_spawn_interval_ms = f32::MAX;
    }

    #[test]
    fn test_tick_does_nothing_at_menu() {
        let mut state = GameState::new(1, Vec2::new(400.0, 600.0));
        tick(&mut state, 5000.0);
        assert_eq!(state.clock_ms, 0.0);
        assert!(state.notes.is_empty());
    }

    #[test]
    fn test_spawner_runs_while_playing() {
        let mut state = playing(5);
        tick(&mut state, 799.0);
        assert!(state.notes.is_empty());
        tick(&mut state, 1.0);
        assert!(!state.notes.is_empty() && state.notes.len() <= 2);
    }

    #[test]
    fn test_scoring_shortens_spawn_interval() {
        // 2400 points takes the full 400ms off the 800ms interval
        let mut fresh = playing(6);
        let mut scored = playing(6);
        scored.score = 2400;

        tick(&mut fresh, 399.0);
        tick(&mut scored, 399.0);
        assert!(fresh.notes.is_empty() && scored.notes.is_empty());

        tick(&mut fresh, 1.0);
        tick(&mut scored, 1.0);
        assert!(fresh.notes.is_empty(), "800ms interval has not elapsed");
        assert!(!scored.notes.is_empty(), "400ms interval has elapsed");
    }

    #[test]
    fn test_unsliced_note_is_missed_exactly_once() {
        let mut state = playing(7);
        no_spawns(&mut state);
        let id = state.next_entity_id();
        state.notes.push(Note {
            id,
            pos: Vec2::new(200.0, 630.0),
            vel: Vec2::new(0.0, -12.0),
            size: 20.0,
            color: [1.0; 4],
            rotation: 0.0,
            rotation_speed: 0.01,
            slice: SliceState::Live,
        });

        let mut rose = false;
        for _ in 0..600 {
            tick(&mut state, FRAME);
            if let Some(n) = state.notes.first() {
                rose |= n.pos.y < 600.0;
            }
            if state.notes.is_empty() {
                break;
            }
        }
        assert!(rose, "note should rise into view before falling");
        assert!(state.notes.is_empty());
        assert_eq!(state.lives, 2);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Missed { note_id: id, lives: 2 }]
        );
    }

    #[test]
    fn test_sliced_note_falling_out_is_not_a_miss() {
        let mut state = playing(8);
        no_spawns(&mut state);
        state.tuning.slice_linger_ms = 1.0e9;
        still_note(&mut state, 200.0, 300.0);
        state.apply_segment(&Segment::new(Vec2::new(150.0, 300.0), Vec2::new(250.0, 300.0)));
        for _ in 0..300 {
            tick(&mut state, FRAME);
        }
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_sliced_note_removed_after_linger() {
        let mut state = playing(9);
        no_spawns(&mut state);
        still_note(&mut state, 200.0, 300.0);
        state.apply_segment(&Segment::new(Vec2::new(150.0, 300.0), Vec2::new(250.0, 300.0)));
        assert_eq!(state.notes.len(), 1);

        tick(&mut state, 5.0);
        assert_eq!(state.notes.len(), 1, "still visible during linger");
        tick(&mut state, 5.0);
        assert!(state.notes.is_empty());
    }

    #[test]
    fn test_combo_times_out() {
        let mut state = playing(10);
        no_spawns(&mut state);
        still_note(&mut state, 200.0, 100.0);
        state.apply_segment(&Segment::new(Vec2::new(150.0, 100.0), Vec2::new(250.0, 100.0)));
        assert_eq!(state.combo, 1);

        tick(&mut state, 1200.0);
        assert_eq!(state.combo, 1, "exactly the timeout keeps the combo");
        tick(&mut state, 1.0);
        assert_eq!(state.combo, 0);
        assert_eq!(state.best_combo, 1);
    }

    #[test]
    fn test_game_over_stops_simulation() {
        let mut state = playing(11);
        no_spawns(&mut state);
        state.lives = 1;
        let id = state.next_entity_id();
        state.notes.push(Note {
            id,
            pos: Vec2::new(100.0, 700.0),
            vel: Vec2::new(0.0, 5.0),
            size: 20.0,
            color: [1.0; 4],
            rotation: 0.0,
            rotation_speed: 0.0,
            slice: SliceState::Live,
        });
        tick(&mut state, FRAME);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);

        let clock = state.clock_ms;
        tick(&mut state, FRAME);
        assert_eq!(state.clock_ms, clock);
    }

    #[test]
    fn test_simultaneous_misses_end_run_once() {
        let mut state = playing(12);
        no_spawns(&mut state);
        state.lives = 2;
        for x in [50.0, 150.0, 250.0] {
            let id = state.next_entity_id();
            state.notes.push(Note {
                id,
                pos: Vec2::new(x, 700.0),
                vel: Vec2::new(0.0, 5.0),
                size: 20.0,
                color: [1.0; 4],
                rotation: 0.0,
                rotation_speed: 0.0,
                slice: SliceState::Live,
            });
        }
        tick(&mut state, FRAME);
        assert_eq!(state.lives, 0);
        let events = state.drain_events();
        let misses = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Missed { .. }))
            .count();
        assert_eq!(misses, 2);
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_particles_expire() {
        let mut state = playing(13);
        no_spawns(&mut state);
        state.spawn_burst(Vec2::new(100.0, 100.0), [1.0; 4]);
        assert_eq!(state.particles.len(), 12);
        tick(&mut state, 300.0);
        assert_eq!(state.particles.len(), 12);
        tick(&mut state, 700.0);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_determinism() {
        let mut a = playing(99_999);
        let mut b = playing(99_999);
        let frames = [16.0, 17.0, 33.0, 16.0, 800.0, 16.0, 16.0, 1200.0, 16.0];
        for &f in &frames {
            tick(&mut a, f);
            tick(&mut b, f);
            a.pointer_down(Vec2::new(10.0, 500.0));
            b.pointer_down(Vec2::new(10.0, 500.0));
            a.pointer_move(Vec2::new(390.0, 300.0));
            b.pointer_move(Vec2::new(390.0, 300.0));
            a.pointer_up();
            b.pointer_up();
        }
        assert_eq!(a.notes.len(), b.notes.len());
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        for (na, nb) in a.notes.iter().zip(&b.notes) {
            assert_eq!(na.pos, nb.pos);
        }
    }
}
