//! Scene assembly: turns simulation state into one vertex list per canvas

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors, with_alpha};
use crate::consts::SNAKE_CELL_PX;
use crate::particles::{ParticleField, ParticleKind};
use crate::sim::{Cell, SnakeGame};

const CONNECTION_WIDTH: f32 = 0.5;
const DOT_SEGMENTS: u32 = 8;
const GLOW_SEGMENTS: u32 = 16;
/// Glow halo radius relative to particle size
const GLOW_SCALE: f32 = 3.0;

/// Background: connection lines first, particles on top
pub fn particle_field_vertices(field: &ParticleField) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    for connection in field.connections() {
        let a = field.particles[connection.a].pos;
        let b = field.particles[connection.b].pos;
        vertices.extend(shapes::line(
            a,
            b,
            CONNECTION_WIDTH,
            with_alpha(colors::PARTICLE, connection.alpha),
        ));
    }

    for p in &field.particles {
        let color = with_alpha(colors::PARTICLE, p.alpha);
        match p.kind {
            ParticleKind::Normal => {}
            ParticleKind::Glow => vertices.extend(shapes::halo(
                p.pos,
                p.radius * GLOW_SCALE,
                p.alpha,
                colors::PARTICLE,
                GLOW_SEGMENTS,
            )),
            ParticleKind::Star => vertices.extend(shapes::star(
                p.pos,
                p.radius * 2.0,
                with_alpha(color, p.alpha * 0.6),
            )),
        }
        vertices.extend(shapes::circle(p.pos, p.radius, color, DOT_SEGMENTS));
    }

    vertices
}

fn cell_origin(cell: Cell) -> Vec2 {
    Vec2::new(cell.x as f32, cell.y as f32) * SNAKE_CELL_PX
}

/// Filled square inset `inset` pixels into a cell
fn cell_square(cell: Cell, inset: f32, color: [f32; 4]) -> Vec<Vertex> {
    let size = SNAKE_CELL_PX - inset * 2.0;
    shapes::rect(cell_origin(cell) + Vec2::splat(inset), Vec2::splat(size), color)
}

/// Snake board: background, grid, food, body, head
pub fn snake_board_vertices(game: &SnakeGame) -> Vec<Vertex> {
    let grid = game.config.grid;
    let board_px = grid as f32 * SNAKE_CELL_PX;
    let mut vertices = shapes::rect(Vec2::ZERO, Vec2::splat(board_px), colors::BOARD);

    for x in 0..grid {
        for y in 0..grid {
            vertices.extend(shapes::rect_outline(
                cell_origin(Cell::new(x, y)),
                Vec2::splat(SNAKE_CELL_PX),
                0.5,
                colors::GRID_LINE,
            ));
        }
    }

    vertices.extend(cell_square(game.food, 1.0, colors::FOOD));
    vertices.extend(cell_square(game.food, 3.0, colors::FOOD_CORE));

    // Tail first so the head draws on top
    for (i, segment) in game.snake.iter().enumerate().rev() {
        let color = if i == 0 {
            colors::SNAKE_HEAD
        } else {
            colors::SNAKE_BODY
        };
        vertices.extend(cell_square(*segment, 1.0, color));
    }
    if let Some(head) = game.snake.first() {
        vertices.extend(cell_square(*head, 4.0, colors::SNAKE_EYE));
    }

    vertices
}
