//! Quad built from separate per-attribute arrays.
//!
//! This is the simplest path: every attribute is handed to the mesh as its
//! own array and the mesh packs them as `Float32` data in stream 0.

use crate::error::MeshResult;
use crate::mesh::Mesh;

use super::{bounds, INDICES, MESH_NAME, NORMAL, POSITIONS, TANGENT, UVS};

/// Build the quad through the per-attribute setters.
pub fn build() -> MeshResult<Mesh> {
    let indices: Vec<u32> = INDICES.iter().map(|&i| i as u32).collect();

    let mut mesh = Mesh::new(MESH_NAME);
    mesh.set_vertices(&POSITIONS)?;
    mesh.set_normals(&[NORMAL; 4])?;
    mesh.set_tangents(&[TANGENT; 4])?;
    mesh.set_uvs(0, &UVS)?;
    mesh.set_triangles(&indices)?;
    mesh.set_bounds(bounds());
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mesh::{IndexFormat, VertexAttributeFormat, VertexAttributeSemantic};

    #[test]
    fn test_layout_is_float32_single_stream() {
        let mesh = build().unwrap();
        let layout = mesh.layout();

        assert_eq!(layout.buffer_count(), 1);
        // position + normal + tangent + uv0
        assert_eq!(layout.buffer_stride(0), 12 + 12 + 16 + 8);
        let formats: Vec<_> = layout.attributes.iter().map(|a| a.format).collect();
        assert_eq!(formats, vec![VertexAttributeFormat::Float32; 4]);
        assert!(layout.has_semantic(VertexAttributeSemantic::TexCoord0));
    }

    #[test]
    fn test_values() {
        let mesh = build().unwrap();
        assert_eq!(mesh.positions(), POSITIONS.to_vec());
        assert_eq!(mesh.normals(), vec![NORMAL; 4]);
        assert_eq!(mesh.tangents(), vec![TANGENT; 4]);
        assert_eq!(mesh.uvs(0), UVS.to_vec());
        assert_eq!(mesh.index_format(), IndexFormat::Uint16);
        assert_eq!(mesh.indices(), vec![0, 2, 1, 1, 2, 3]);
    }
}
