//! Property tests for slicing and run bookkeeping

use glam::Vec2;
use proptest::prelude::*;

use note_slicer::sim::{GamePhase, GameState, Segment, segment_hits_circle, tick};

const SURFACE: Vec2 = Vec2::new(480.0, 800.0);

fn point() -> impl Strategy<Value = Vec2> {
    (0.0f32..480.0, 0.0f32..800.0).prop_map(|(x, y)| Vec2::new(x, y))
}

/// One frame of play: how long it took, and an optional swipe
#[derive(Debug, Clone)]
enum Action {
    Frame(f64),
    Swipe(Vec2, Vec2),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => (0.0f64..60.0).prop_map(Action::Frame),
        1 => (point(), point()).prop_map(|(a, b)| Action::Swipe(a, b)),
    ]
}

proptest! {
    #[test]
    fn segment_through_center_hits(
        center in point(),
        radius in 1.0f32..60.0,
        angle in 0.0f32..std::f32::consts::TAU,
        reach in 0.0f32..200.0,
    ) {
        let dir = Vec2::from_angle(angle);
        let segment = Segment::new(center - dir * reach, center + dir * reach);
        prop_assert!(segment_hits_circle(&segment, center, radius));
    }

    #[test]
    fn segment_outside_radius_misses(
        center in point(),
        radius in 1.0f32..60.0,
        gap in 0.5f32..100.0,
        half_len in 0.0f32..300.0,
    ) {
        // A horizontal segment passing above the circle, clear of the rim
        let y = center.y - radius - gap;
        let segment = Segment::new(
            Vec2::new(center.x - half_len, y),
            Vec2::new(center.x + half_len, y),
        );
        prop_assert!(!segment_hits_circle(&segment, center, radius));
    }

    #[test]
    fn closest_point_lies_on_segment(a in point(), b in point(), p in point()) {
        let segment = Segment::new(a, b);
        let q = segment.closest_point(p);
        let on_segment = (a.distance(q) + q.distance(b) - a.distance(b)).abs() < 1e-2;
        prop_assert!(on_segment);
        prop_assert!(q.distance(p) <= a.distance(p) + 1e-3);
        prop_assert!(q.distance(p) <= b.distance(p) + 1e-3);
    }

    #[test]
    fn run_bookkeeping_is_monotonic(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..300),
    ) {
        let mut state = GameState::new(seed, SURFACE);
        state.start();

        let mut last_score = state.score;
        let mut last_lives = state.lives;
        let mut game_overs = 0;

        for action in actions {
            let sliced_before: Vec<u32> = state
                .notes
                .iter()
                .filter(|n| n.is_sliced())
                .map(|n| n.id)
                .collect();

            match action {
                Action::Frame(ms) => tick(&mut state, ms),
                Action::Swipe(a, b) => {
                    state.pointer_down(a);
                    state.pointer_move(b);
                    state.pointer_up();
                }
            }

            prop_assert!(state.score >= last_score);
            prop_assert!(state.lives <= last_lives);
            prop_assert!(state.combo <= state.best_combo);

            // A sliced note never comes back to life
            for note in &state.notes {
                if sliced_before.contains(&note.id) {
                    prop_assert!(note.is_sliced());
                }
            }

            game_overs += state
                .drain_events()
                .iter()
                .filter(|e| matches!(e, note_slicer::sim::GameEvent::GameOver { .. }))
                .count();

            if state.lives == 0 {
                prop_assert_eq!(state.phase, GamePhase::GameOver);
            }

            last_score = state.score;
            last_lives = state.lives;
        }

        prop_assert!(game_overs <= 1);
    }

    #[test]
    fn same_seed_same_run(seed in any::<u64>(), frames in 1usize..400) {
        let mut a = GameState::new(seed, SURFACE);
        let mut b = GameState::new(seed, SURFACE);
        a.start();
        b.start();
        for _ in 0..frames {
            tick(&mut a, 16.0);
            tick(&mut b, 16.0);
        }
        prop_assert_eq!(a.notes.len(), b.notes.len());
        prop_assert_eq!(a.lives, b.lives);
        for (x, y) in a.notes.iter().zip(&b.notes) {
            prop_assert_eq!(x.pos, y.pos);
        }
    }
}
