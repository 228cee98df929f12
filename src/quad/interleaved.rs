//! Quad built from one stream of interleaved vertex records.
//!
//! Positions and normals stay `Float32`; tangents and texture coordinates
//! are packed as `Float16` to keep each record at 36 bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use half::f16;

use crate::error::MeshResult;
use crate::mesh::{
    MeshData, VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSemantic,
};

use super::{Schema, NORMAL, POSITIONS, TANGENT, UVS};

/// One interleaved quad vertex.
///
/// Field order and formats match [`schema`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: [f16; 4],
    pub tex_coord0: [f16; 2],
}

impl Vertex {
    /// Pack full-precision attributes into a vertex record.
    pub fn new(position: Vec3, normal: Vec3, tangent: Vec4, tex_coord0: Vec2) -> Self {
        Self {
            position,
            normal,
            tangent: tangent.to_array().map(f16::from_f32),
            tex_coord0: tex_coord0.to_array().map(f16::from_f32),
        }
    }
}

/// Attribute schema of the interleaved layout, all in stream 0.
pub fn schema() -> Schema {
    [
        VertexAttributeDescriptor::default(),
        VertexAttributeDescriptor::of(VertexAttributeSemantic::Normal),
        VertexAttributeDescriptor::new(
            VertexAttributeSemantic::Tangent,
            VertexAttributeFormat::Float16,
            4,
            0,
        ),
        VertexAttributeDescriptor::new(
            VertexAttributeSemantic::TexCoord0,
            VertexAttributeFormat::Float16,
            2,
            0,
        ),
    ]
}

/// Write the four quad vertices into stream 0 of allocated mesh data.
pub fn fill(data: &mut MeshData) -> MeshResult<()> {
    let mut stream = data.vertex_data_mut::<Vertex>(0)?;
    for (i, (&position, &uv)) in POSITIONS.iter().zip(UVS.iter()).enumerate() {
        stream.set(i, Vertex::new(position, NORMAL, TANGENT, uv))?;
    }
    Ok(())
}
