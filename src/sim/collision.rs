//! Slice detection
//!
//! A swipe segment cuts a note when the segment passes within the note's
//! radius. Closest-point-on-segment against circle, exact and branch-light.

use glam::Vec2;

use super::state::Note;

/// A straight piece of the pointer trail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    /// Closest point on the segment to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let v = self.b - self.a;
        let c1 = v.dot(p - self.a);
        if c1 <= 0.0 {
            return self.a;
        }
        let c2 = v.length_squared();
        if c2 <= c1 {
            return self.b;
        }
        self.a + v * (c1 / c2)
    }
}

/// Does the segment touch the circle? Touching the rim counts.
#[inline]
pub fn segment_hits_circle(segment: &Segment, center: Vec2, radius: f32) -> bool {
    center.distance_squared(segment.closest_point(center)) <= radius * radius
}

/// Slice every live note the segment touches.
///
/// Notes are visited newest first and marked sliced on the spot, so a note
/// can only ever be reported once. Returns the indices of the notes cut by
/// this segment in visit order.
pub fn slice_segment(notes: &mut [Note], segment: &Segment, now_ms: f64) -> Vec<usize> {
    let mut hits = Vec::new();
    for (i, note) in notes.iter_mut().enumerate().rev() {
        if note.is_sliced() {
            continue;
        }
        if segment_hits_circle(segment, note.pos, note.size) {
            note.slice(now_ms);
            hits.push(i);
        }
    }
    hits
}
