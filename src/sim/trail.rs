//! Pointer trail
//!
//! Turns raw pointer/touch positions into a short, de-noised polyline. The
//! newest segment of the polyline is what gets tested against notes; the
//! whole polyline is drawn as a fading ribbon.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Segment;

/// A recorded pointer position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// Simulation clock when recorded (ms)
    pub time_ms: f64,
}

/// Bounded pointer trail (oldest first)
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    max_len: usize,
    min_distance: f32,
}

impl Trail {
    pub fn new(max_len: usize, min_distance: f32) -> Self {
        Self {
            points: VecDeque::with_capacity(max_len + 1),
            max_len: max_len.max(2),
            min_distance,
        }
    }

    /// Start a stroke
    pub fn pointer_down(&mut self, pos: Vec2, time_ms: f64) {
        self.push(TrailPoint { pos, time_ms });
    }

    /// Extend the stroke. Returns the new segment to test for slices, if the
    /// move was far enough to be recorded and there is a previous point.
    pub fn pointer_move(&mut self, pos: Vec2, time_ms: f64) -> Option<Segment> {
        let last = self.points.back().map(|p| p.pos);
        if let Some(last) = last {
            if pos.distance(last) <= self.min_distance {
                return None;
            }
        }

        self.push(TrailPoint { pos, time_ms });
        last.map(|a| Segment::new(a, pos))
    }

    /// End the stroke
    pub fn pointer_up(&mut self) {
        self.points.clear();
    }

    fn push(&mut self, point: TrailPoint) {
        self.points.push_back(point);
        while self.points.len() > self.max_len {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &VecDeque<TrailPoint> {
        &self.points
    }

    /// Consecutive point pairs, oldest first
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .map(|(a, b)| Segment::new(a.pos, b.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail() -> Trail {
        Trail::new(18, 4.0)
    }

    #[test]
    fn test_first_move_without_down_records_point() {
        let mut t = trail();
        assert!(t.pointer_move(Vec2::new(10.0, 10.0), 0.0).is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_short_moves_are_ignored() {
        let mut t = trail();
        t.pointer_down(Vec2::ZERO, 0.0);
        assert!(t.pointer_move(Vec2::new(3.0, 0.0), 1.0).is_none());
        // Exactly the threshold is still noise
        assert!(t.pointer_move(Vec2::new(4.0, 0.0), 2.0).is_none());
        assert_eq!(t.len(), 1);

        let seg = t.pointer_move(Vec2::new(4.5, 0.0), 3.0).unwrap();
        assert_eq!(seg.a, Vec2::ZERO);
        assert_eq!(seg.b, Vec2::new(4.5, 0.0));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_trail_keeps_newest_points() {
        let mut t = trail();
        t.pointer_down(Vec2::ZERO, 0.0);
        for i in 1..40 {
            t.pointer_move(Vec2::new(i as f32 * 10.0, 0.0), i as f64);
        }
        assert_eq!(t.len(), 18);
        assert_eq!(t.points().back().unwrap().pos.x, 390.0);
        assert_eq!(t.points().front().unwrap().pos.x, 220.0);
        assert_eq!(t.segments().count(), 17);
    }

    #[test]
    fn test_pointer_up_clears() {
        let mut t = trail();
        t.pointer_down(Vec2::ZERO, 0.0);
        t.pointer_move(Vec2::new(50.0, 0.0), 1.0);
        assert!(!t.is_empty());
        t.pointer_up();
        assert!(t.is_empty());
        assert!(t.is_empty());
    }
}
