//! Rendering
//!
//! Scenes are built as plain triangle lists in canvas pixels (`scene`,
//! `shapes`) and drawn by a single flat-colour WebGPU pipeline.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, pixel_to_ndc};
pub use scene::{particle_field_vertices, snake_board_vertices};
pub use vertex::Vertex;
