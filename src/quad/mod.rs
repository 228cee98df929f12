//! Unit quad mesh builders.
//!
//! The same four-vertex, two-triangle quad can be built in three memory
//! layouts, selected with [`MeshLayout`]:
//!
//! - [`MeshLayout::SeparateArrays`] - per-attribute arrays through the
//!   [`Mesh`] setters ([`separate`])
//! - [`MeshLayout::Interleaved`] - one stream of packed [`interleaved::Vertex`]
//!   records ([`interleaved`])
//! - [`MeshLayout::MultiStream`] - one stream per attribute ([`multi_stream`])
//!
//! The quad spans (0,0,0)..(1,1,0) in the XY plane and faces -Z.

pub mod interleaved;
pub mod multi_stream;
pub mod separate;

use glam::{Vec2, Vec3, Vec4};

use crate::bounds::Bounds;
use crate::error::MeshResult;
use crate::host::{MeshHandle, MeshHost};
use crate::mesh::{
    allocate_writable_mesh_data, apply_and_dispose_writable_mesh_data, IndexFormat, Mesh,
    MeshData, MeshUpdateFlags, SubMeshDescriptor, VertexAttributeDescriptor,
};

/// Name given to every built quad mesh.
pub const MESH_NAME: &str = "Procedural mesh";

/// Number of quad vertices.
pub const VERTEX_COUNT: u32 = 4;

/// Number of quad triangle indices.
pub const INDEX_COUNT: u32 = 6;

/// Corner positions.
pub const POSITIONS: [Vec3; 4] = [
    Vec3::ZERO,
    Vec3::X,
    Vec3::Y,
    Vec3::new(1.0, 1.0, 0.0),
];

/// Shared normal of all four vertices.
pub const NORMAL: Vec3 = Vec3::NEG_Z;

/// Shared tangent of all four vertices (w = -1 bitangent sign).
pub const TANGENT: Vec4 = Vec4::new(1.0, 0.0, 0.0, -1.0);

/// Texture coordinates, one per corner.
pub const UVS: [Vec2; 4] = [Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE];

/// Two triangles sharing the 1-2 diagonal.
pub const INDICES: [u16; 6] = [0, 2, 1, 1, 2, 3];

/// Known bounds of the quad.
pub fn bounds() -> Bounds {
    Bounds::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(1.0, 1.0, 0.0))
}

/// Memory layout used to build the quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeshLayout {
    /// One array per attribute, set through the high-level mesh API.
    SeparateArrays,
    /// One stream of interleaved vertex records.
    #[default]
    Interleaved,
    /// One stream per attribute.
    MultiStream,
}

impl MeshLayout {
    /// All layouts, from simplest to most specialised.
    pub const ALL: [MeshLayout; 3] = [
        MeshLayout::SeparateArrays,
        MeshLayout::Interleaved,
        MeshLayout::MultiStream,
    ];
}

/// Write the quad indices into allocated mesh data.
///
/// The index buffer must already be allocated as six `Uint16` indices.
fn fill_indices(data: &mut MeshData) -> MeshResult<()> {
    data.index_data_mut::<u16>()?.copy_from_slice(&INDICES)
}

/// Describe the single quad sub-mesh with its known bounds.
fn fill_sub_mesh(data: &mut MeshData) -> MeshResult<()> {
    data.set_sub_mesh_count(1);
    data.set_sub_mesh(
        0,
        SubMeshDescriptor::new(0, INDEX_COUNT)
            .with_bounds(bounds())
            .with_vertex_count(VERTEX_COUNT),
        MeshUpdateFlags::DONT_RECALCULATE_BOUNDS,
    )
}

/// Attribute schema of a writable quad layout.
pub type Schema = [VertexAttributeDescriptor; 4];

type FillFn = fn(&mut MeshData) -> MeshResult<()>;

/// Schema and vertex writer of a writable layout, `None` for separate arrays.
fn writable_parts(layout: MeshLayout) -> Option<(Schema, FillFn)> {
    match layout {
        MeshLayout::SeparateArrays => None,
        MeshLayout::Interleaved => Some((interleaved::schema(), interleaved::fill as FillFn)),
        MeshLayout::MultiStream => Some((multi_stream::schema(), multi_stream::fill as FillFn)),
    }
}

/// Build a standalone quad mesh in the given layout.
pub fn build(layout: MeshLayout) -> MeshResult<Mesh> {
    log::debug!("Building quad with {:?} layout", layout);
    let Some((schema, fill)) = writable_parts(layout) else {
        return separate::build();
    };

    let mut array = allocate_writable_mesh_data(1);
    let data = &mut array[0];
    data.set_vertex_buffer_params(VERTEX_COUNT, &schema)?;
    data.set_index_buffer_params(INDEX_COUNT, IndexFormat::Uint16);
    fill(data)?;
    fill_indices(data)?;
    fill_sub_mesh(data)?;

    let mut meshes = [Mesh::new(MESH_NAME)];
    apply_and_dispose_writable_mesh_data(array, &mut meshes)?;
    let [mut mesh] = meshes;
    mesh.set_bounds(bounds());
    Ok(mesh)
}

/// Build the quad through a host and return the host's handle.
///
/// The schema is only borrowed for the allocation; the host keeps the
/// resolved layout.
pub fn build_with<H: MeshHost + ?Sized>(
    host: &mut H,
    layout: MeshLayout,
) -> MeshResult<MeshHandle> {
    log::debug!("Building quad with {:?} layout through host", layout);
    let Some((schema, fill)) = writable_parts(layout) else {
        return Ok(host.submit(separate::build()?));
    };

    let mut data = host.allocate(VERTEX_COUNT, IndexFormat::Uint16, INDEX_COUNT, &schema)?;
    fill(&mut data)?;
    fill_indices(&mut data)?;
    host.commit(MESH_NAME, data, bounds())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_constants() {
        assert_eq!(POSITIONS.len(), VERTEX_COUNT as usize);
        assert_eq!(UVS.len(), VERTEX_COUNT as usize);
        assert_eq!(INDICES.len(), INDEX_COUNT as usize);
        assert!(INDICES.iter().all(|&i| (i as u32) < VERTEX_COUNT));
    }

    #[test]
    fn test_bounds_enclose_positions() {
        let bounds = bounds();
        assert_eq!(bounds.center, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(bounds.size(), Vec3::new(1.0, 1.0, 0.0));
        assert!(POSITIONS.iter().all(|&p| bounds.contains(p)));
        assert_eq!(Bounds::from_points(POSITIONS), Some(bounds));
    }

    #[test]
    fn test_winding_faces_negative_z() {
        for tri in INDICES.chunks_exact(3) {
            let [a, b, c] = [
                POSITIONS[tri[0] as usize],
                POSITIONS[tri[1] as usize],
                POSITIONS[tri[2] as usize],
            ];
            let normal = (b - a).cross(c - a).normalize();
            assert_eq!(normal, NORMAL);
        }
    }

    #[test]
    fn test_build_every_layout() {
        for layout in MeshLayout::ALL {
            let mesh = build(layout).unwrap();
            assert_eq!(mesh.name(), MESH_NAME);
            assert_eq!(mesh.vertex_count(), VERTEX_COUNT);
            assert_eq!(mesh.index_count(), INDEX_COUNT);
            assert_eq!(mesh.bounds(), bounds());
        }
    }
}
