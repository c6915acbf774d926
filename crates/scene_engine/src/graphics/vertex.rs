//! Vertex formats

// The Pod and Zeroable derives expand to unsafe impls
#![allow(unsafe_code)]

use bytemuck::{Pod, Zeroable};

/// Vertex with position, packed colour and texture coordinate
///
/// `#[repr(C)]` and `Pod` so a backend can upload a slice of these as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct VertexPositionColorTexture {
    /// Position in model space
    pub position: [f32; 3],
    /// Colour packed as `0xAABBGGRR`
    pub color: u32,
    /// Texture coordinate
    pub texture_coordinate: [f32; 2],
}

impl VertexPositionColorTexture {
    /// Create a new vertex
    pub fn new(position: [f32; 3], color: u32, texture_coordinate: [f32; 2]) -> Self {
        Self { position, color, texture_coordinate }
    }
}
