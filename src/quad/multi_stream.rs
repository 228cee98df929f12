//! Quad built with one vertex stream per attribute.
//!
//! | Stream | Attribute | Format      | Stride |
//! |--------|-----------|-------------|--------|
//! | 0      | position  | Float32 x 3 | 12     |
//! | 1      | normal    | Float32 x 3 | 12     |
//! | 2      | tangent   | Float16 x 4 | 8      |
//! | 3      | uv0       | Float16 x 2 | 4      |

use glam::Vec3;
use half::f16;

use crate::error::MeshResult;
use crate::mesh::{
    MeshData, VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSemantic,
};

use super::{Schema, NORMAL, POSITIONS, TANGENT, UVS};

/// Attribute schema of the multi-stream layout.
pub fn schema() -> Schema {
    [
        VertexAttributeDescriptor::default(),
        VertexAttributeDescriptor::new(
            VertexAttributeSemantic::Normal,
            VertexAttributeFormat::Float32,
            3,
            1,
        ),
        VertexAttributeDescriptor::new(
            VertexAttributeSemantic::Tangent,
            VertexAttributeFormat::Float16,
            4,
            2,
        ),
        VertexAttributeDescriptor::new(
            VertexAttributeSemantic::TexCoord0,
            VertexAttributeFormat::Float16,
            2,
            3,
        ),
    ]
}

fn to_half<const N: usize>(values: [f32; N]) -> [f16; N] {
    values.map(f16::from_f32)
}

/// Write every attribute stream of allocated mesh data.
pub fn fill(data: &mut MeshData) -> MeshResult<()> {
    let mut positions = data.vertex_data_mut::<Vec3>(0)?;
    positions.copy_from_slice(&POSITIONS)?;
    data.vertex_data_mut::<Vec3>(1)?.fill(NORMAL);
    let tangent = to_half(TANGENT.to_array());
    data.vertex_data_mut::<[f16; 4]>(2)?.fill(tangent);

    let mut uvs = data.vertex_data_mut::<[f16; 2]>(3)?;
    for (i, uv) in UVS.iter().enumerate() {
        uvs.set(i, to_half(uv.to_array()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::MeshError;
    use crate::mesh::VertexLayout;

    fn allocated() -> MeshData {
        let mut data = MeshData::new();
        data.set_vertex_buffer_params(4, &schema()).unwrap();
        data
    }

    #[test]
    fn test_stream_strides() {
        let layout = VertexLayout::from_descriptors(&schema()).unwrap();
        assert_eq!(layout.buffer_count(), 4);
        let strides: Vec<u32> = (0..4).map(|i| layout.buffer_stride(i)).collect();
        assert_eq!(strides, vec![12, 12, 8, 4]);
    }

    #[test]
    fn test_fill_writes_every_stream() {
        let mut data = allocated();
        fill(&mut data).unwrap();

        let positions = data.vertex_data::<Vec3>(0).unwrap();
        let normals = data.vertex_data::<Vec3>(1).unwrap();
        let uvs = data.vertex_data::<[f16; 2]>(3).unwrap();
        assert_eq!(positions.to_vec(), POSITIONS.to_vec());
        assert_eq!(normals.to_vec(), vec![NORMAL; 4]);
        assert_eq!(uvs.get(1), Some([f16::ONE, f16::ZERO]));
    }

    #[test]
    fn test_wrong_element_type() {
        let mut data = allocated();
        assert!(matches!(
            data.vertex_data_mut::<[f32; 4]>(2),
            Err(MeshError::InvalidLayout(_))
        ));
        assert!(matches!(
            data.vertex_data_mut::<Vec3>(4),
            Err(MeshError::StreamOutOfRange {
                stream: 4,
                count: 4,
            })
        ));
    }
}
