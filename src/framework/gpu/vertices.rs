use std::mem::size_of;

use glam::{Vec2, Vec3};

/// A trait which each vertex type must implement.
pub trait Vertex: Copy + Clone + bytemuck::Pod + bytemuck::Zeroable {
    /// Describes how vertex puller reads this vertex type from a per vertex buffer
    fn vertex_layout<'a>() -> wgpu::VertexBufferLayout<'a>;
}

/// Mesh Vertex
/// A vertex of lit, textured triangle meshes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal:   Vec3,
    pub uv:       Vec2,
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2, // uv
    ];
}

impl Vertex for MeshVertex {
    fn vertex_layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode:    wgpu::VertexStepMode::Vertex,
            attributes:   &Self::ATTRIBUTES,
        }
    }
}

/// Color Vertex
/// A vertex type which contains position and color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: Vec3,
    pub color:    Vec3,
}

impl ColorVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // color
    ];

    /// Layout used when every vertex describes one instance of a sprite.
    pub fn instance_layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            step_mode: wgpu::VertexStepMode::Instance,
            ..Self::vertex_layout()
        }
    }
}

impl Vertex for ColorVertex {
    fn vertex_layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode:    wgpu::VertexStepMode::Vertex,
            attributes:   &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_strides_match_attribute_offsets() {
        assert_eq!(size_of::<MeshVertex>(), 32);
        assert_eq!(MeshVertex::ATTRIBUTES[2].offset, 24);
        assert_eq!(size_of::<ColorVertex>(), 24);
        assert_eq!(ColorVertex::instance_layout().step_mode, wgpu::VertexStepMode::Instance);
    }
}
