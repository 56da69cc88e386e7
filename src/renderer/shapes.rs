//! Shape generation for 2D primitives
//!
//! Everything is emitted as a triangle list in canvas pixel coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, with_alpha};

/// Filled circle as a triangle fan
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    radial(center, radius, color, color, segments)
}

fn radial(
    center: Vec2,
    radius: f32,
    inner: [f32; 4],
    outer: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, inner));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            outer,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            outer,
        ));
    }

    vertices
}

/// Soft halo with a bright core: centre, 40% stop, transparent edge
pub fn halo(center: Vec2, radius: f32, alpha: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mid_radius = radius * 0.4;
    let core = with_alpha(color, alpha * 0.8);
    let mid = with_alpha(color, alpha * 0.4);
    let edge = with_alpha(color, 0.0);

    let mut vertices = radial(center, mid_radius, core, mid, segments);
    vertices.extend(ring_gradient(center, mid_radius, radius, mid, edge, segments));
    vertices
}

/// Ring with separate inner and outer colours
fn ring_gradient(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    inner_color: [f32; 4],
    outer_color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    let at = |r: f32, theta: f32| center + Vec2::new(r * theta.cos(), r * theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = at(inner_radius, theta1);
        let outer1 = at(outer_radius, theta1);
        let inner2 = at(inner_radius, theta2);
        let outer2 = at(outer_radius, theta2);

        vertices.push(Vertex::new(inner1.x, inner1.y, inner_color));
        vertices.push(Vertex::new(outer1.x, outer1.y, outer_color));
        vertices.push(Vertex::new(inner2.x, inner2.y, inner_color));

        vertices.push(Vertex::new(inner2.x, inner2.y, inner_color));
        vertices.push(Vertex::new(outer1.x, outer1.y, outer_color));
        vertices.push(Vertex::new(outer2.x, outer2.y, outer_color));
    }

    vertices
}

/// Line segment `width` pixels thick
pub fn line(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);

    let a1 = a + perp;
    let a2 = a - perp;
    let b1 = b + perp;
    let b2 = b - perp;

    vec![
        Vertex::new(a1.x, a1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b2.x, b2.y, color),
    ]
}

/// Axis-aligned filled rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let max = min + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Rectangle outline drawn inside `min..min+size`
pub fn rect_outline(min: Vec2, size: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(24);
    vertices.extend(rect(min, Vec2::new(size.x, width), color));
    vertices.extend(rect(
        Vec2::new(min.x, min.y + size.y - width),
        Vec2::new(size.x, width),
        color,
    ));
    vertices.extend(rect(min, Vec2::new(width, size.y), color));
    vertices.extend(rect(
        Vec2::new(min.x + size.x - width, min.y),
        Vec2::new(width, size.y),
        color,
    ));
    vertices
}

/// Four-point sparkle: two thin crossed diamonds
pub fn star(center: Vec2, radius: f32, color: [f32; 4]) -> Vec<Vertex> {
    let waist = radius * 0.25;
    let mut vertices = Vec::with_capacity(12);
    for (long, short) in [(Vec2::X, Vec2::Y), (Vec2::Y, Vec2::X)] {
        let tip_a = center + long * radius;
        let tip_b = center - long * radius;
        let side_a = center + short * waist;
        let side_b = center - short * waist;
        vertices.push(Vertex::new(tip_a.x, tip_a.y, color));
        vertices.push(Vertex::new(side_a.x, side_a.y, color));
        vertices.push(Vertex::new(tip_b.x, tip_b.y, color));
        vertices.push(Vertex::new(tip_b.x, tip_b.y, color));
        vertices.push(Vertex::new(side_b.x, side_b.y, color));
        vertices.push(Vertex::new(tip_a.x, tip_a.y, color));
    }
    vertices
}
