//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
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

/// Colors for scene elements
pub mod colors {
    use crate::rgb;

    pub const BACKGROUND_TOP: [f32; 4] = rgb(0x2B0036);
    pub const BACKGROUND_BOTTOM: [f32; 4] = rgb(0x11021A);
    pub const BACKDROP_CIRCLE: [f32; 4] = [1.0, 1.0, 1.0, 0.02];
    pub const NOTE_GLYPH: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
    pub const TRAIL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
