//! Scene tessellation
//!
//! Turns a [`GameState`] snapshot into one triangle list, back to front:
//! background, backdrop circles, notes, particles, swipe ribbon. Reads the
//! state only; nothing here feeds back into the simulation.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::settings::Settings;
use crate::sim::{GameState, Note, Trail};
use crate::with_alpha;

/// Ribbon width (px)
pub const TRAIL_WIDTH: f32 = 8.0;
/// Opacity of a sliced note during its linger frames
const SLICED_ALPHA: f32 = 0.35;

/// Build the full frame
pub fn build(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let segments = settings.quality.circle_segments();
    let mut vertices = shapes::vertical_gradient(
        state.surface,
        colors::BACKGROUND_TOP,
        colors::BACKGROUND_BOTTOM,
    );

    if settings.quality.backdrop_enabled() {
        push_backdrop(&mut vertices, state.surface, segments * 2);
    }

    for note in &state.notes {
        push_note(&mut vertices, note, segments);
    }

    for particle in &state.particles {
        let alpha = particle.alpha(state.clock_ms);
        if alpha <= 0.0 {
            continue;
        }
        shapes::push_circle(
            &mut vertices,
            particle.pos,
            particle.size,
            with_alpha(particle.color, alpha),
            8,
        );
    }

    if settings.trails {
        push_trail(&mut vertices, &state.trail);
    }

    vertices
}

/// Three large, barely visible circles in the upper left
fn push_backdrop(out: &mut Vec<Vertex>, surface: Vec2, segments: u32) {
    for i in 0..3 {
        let fi = i as f32;
        let center = Vec2::new(surface.x * 0.18 + fi * 70.0, surface.y * 0.12 + fi * 40.0);
        let color = with_alpha(colors::BACKDROP_CIRCLE, 0.02 + fi * 0.01);
        shapes::push_circle(out, center, 160.0 + fi * 120.0, color, segments);
    }
}

/// Colored disc with a white eighth-note glyph spinning inside it
pub fn push_note(out: &mut Vec<Vertex>, note: &Note, segments: u32) {
    let fade = if note.is_sliced() { SLICED_ALPHA } else { 1.0 };
    let body = with_alpha(note.color, note.color[3] * fade);
    let glyph = with_alpha(colors::NOTE_GLYPH, colors::NOTE_GLYPH[3] * fade);

    shapes::push_circle(out, note.pos, note.size, body, segments);

    let rot = Vec2::from_angle(note.rotation);
    let local = |x: f32, y: f32| note.pos + rot.rotate(Vec2::new(x, y) * note.size);

    // Head, slightly tilted like printed notation
    let head = local(-0.12, 0.3);
    shapes::push_ellipse(
        out,
        head,
        Vec2::new(0.3, 0.21) * note.size,
        note.rotation - 0.35,
        glyph,
        segments / 2,
    );

    // Stem
    let stem_half = 0.06;
    shapes::push_quad(
        out,
        [
            local(0.18 - stem_half, 0.3),
            local(0.18 - stem_half, -0.55),
            local(0.18 + stem_half, -0.55),
            local(0.18 + stem_half, 0.3),
        ],
        glyph,
    );

    // Flag
    shapes::push_quad(
        out,
        [
            local(0.18, -0.55),
            local(0.45, -0.3),
            local(0.42, -0.15),
            local(0.18, -0.35),
        ],
        glyph,
    );
}

/// Fading ribbon, oldest segment faintest
pub fn push_trail(out: &mut Vec<Vertex>, trail: &Trail) {
    let n = trail.len();
    if n < 2 {
        return;
    }
    for (i, segment) in trail.segments().enumerate() {
        let alpha = (i + 1) as f32 / n as f32;
        let color = with_alpha(colors::TRAIL, 0.08 + 0.6 * alpha);
        shapes::push_line(out, segment.a, segment.b, TRAIL_WIDTH, color, 8);
    }
}
