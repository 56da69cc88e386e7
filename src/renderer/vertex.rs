//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in canvas pixels with an RGBA colour
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// `0xRRGGBB` to linear-ish RGBA floats
pub const fn hex(rgb: u32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Same colour with a different alpha
pub const fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}

/// Page palette
pub mod colors {
    use super::hex;

    pub const PARTICLE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const PAGE_BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    pub const BOARD: [f32; 4] = hex(0x0a0a0f);
    pub const GRID_LINE: [f32; 4] = hex(0x18181b);
    pub const SNAKE_HEAD: [f32; 4] = hex(0x22c55e);
    pub const SNAKE_BODY: [f32; 4] = hex(0x16a34a);
    pub const SNAKE_EYE: [f32; 4] = hex(0x15803d);
    pub const FOOD: [f32; 4] = hex(0xef4444);
    pub const FOOD_CORE: [f32; 4] = hex(0xdc2626);
}
