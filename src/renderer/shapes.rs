//! Shape generation for 2D primitives
//!
//! All shapes are emitted as triangle lists in surface pixels (y down).

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// Append a filled circle to `out`
pub fn push_circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    let segments = segments.max(3);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Append an ellipse rotated by `rotation`
pub fn push_ellipse(
    out: &mut Vec<Vertex>,
    center: Vec2,
    radii: Vec2,
    rotation: f32,
    color: [f32; 4],
    segments: u32,
) {
    let segments = segments.max(3);
    let rot = Vec2::from_angle(rotation);
    let point = |i: u32| {
        let theta = (i as f32 / segments as f32) * TAU;
        center + rot.rotate(Vec2::new(radii.x * theta.cos(), radii.y * theta.sin()))
    };
    for i in 0..segments {
        let p1 = point(i);
        let p2 = point(i + 1);
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(p1.x, p1.y, color));
        out.push(Vertex::new(p2.x, p2.y, color));
    }
}

/// Append a quad given its four corners in winding order
pub fn push_quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], color: [f32; 4]) {
    let [a, b, c, d] = corners;
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));

    out.push(Vertex::new(c.x, c.y, color));
    out.push(Vertex::new(d.x, d.y, color));
    out.push(Vertex::new(a.x, a.y, color));
}

/// Append a thick line from `a` to `b` with a round cap at `b`
pub fn push_line(
    out: &mut Vec<Vertex>,
    a: Vec2,
    b: Vec2,
    width: f32,
    color: [f32; 4],
    cap_segments: u32,
) {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        push_circle(out, a, width / 2.0, color, cap_segments);
        return;
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    push_quad(out, [a + perp, b + perp, b - perp, a - perp], color);
    push_circle(out, b, width / 2.0, color, cap_segments);
}

/// Full-surface rectangle fading from `top` to `bottom`
pub fn vertical_gradient(size: Vec2, top: [f32; 4], bottom: [f32; 4]) -> Vec<Vertex> {
    let (w, h) = (size.x, size.y);
    vec![
        Vertex::new(0.0, 0.0, top),
        Vertex::new(w, 0.0, top),
        Vertex::new(w, h, bottom),
        Vertex::new(w, h, bottom),
        Vertex::new(0.0, h, bottom),
        Vertex::new(0.0, 0.0, top),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count() {
        let mut v = Vec::new();
        push_circle(&mut v, Vec2::new(10.0, 10.0), 5.0, [1.0; 4], 16);
        assert_eq!(v.len(), 48);
        // Every rim vertex lies on the circle
        for tri in v.chunks(3) {
            let rim = Vec2::from(tri[1].position);
            assert!((rim.distance(Vec2::new(10.0, 10.0)) - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_degenerate_line_draws_dot() {
        let mut v = Vec::new();
        push_line(&mut v, Vec2::ONE, Vec2::ONE, 8.0, [1.0; 4], 8);
        assert_eq!(v.len(), 24);
    }

    #[test]
    fn test_line_has_requested_width() {
        let mut v = Vec::new();
        push_line(&mut v, Vec2::ZERO, Vec2::new(10.0, 0.0), 8.0, [1.0; 4], 8);
        assert_eq!(v.len(), 6 + 24);
        let ys: Vec<f32> = v[..6].iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 4.0).abs() < 1e-5));
    }

    #[test]
    fn test_gradient_covers_surface() {
        let v = vertical_gradient(Vec2::new(300.0, 200.0), [1.0; 4], [0.0; 4]);
        assert_eq!(v.len(), 6);
        assert!(v.iter().any(|v| v.position == [300.0, 200.0]));
    }
}
