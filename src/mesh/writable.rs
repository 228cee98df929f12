//! Writable mesh data.
//!
//! [`MeshData`] is the low-level path for filling mesh buffers: declare the
//! vertex layout and index format up front, write typed records straight into
//! the allocated streams, describe the sub-meshes, then move the data into a
//! [`Mesh`] with [`apply_and_dispose_writable_mesh_data`].
//!
//! ```
//! use glam::Vec3;
//! use procedural_mesh::mesh::{
//!     allocate_writable_mesh_data, apply_and_dispose_writable_mesh_data, IndexFormat, Mesh,
//!     MeshUpdateFlags, SubMeshDescriptor, VertexAttributeDescriptor,
//! };
//!
//! let mut array = allocate_writable_mesh_data(1);
//! let data = &mut array[0];
//! data.set_vertex_buffer_params(3, &[VertexAttributeDescriptor::default()]).unwrap();
//! data.vertex_data_mut::<Vec3>(0)
//!     .unwrap()
//!     .copy_from_slice(&[Vec3::ZERO, Vec3::Y, Vec3::X])
//!     .unwrap();
//! data.set_index_buffer_params(3, IndexFormat::Uint16);
//! data.index_data_mut::<u16>().unwrap().copy_from_slice(&[0, 1, 2]).unwrap();
//! data.set_sub_mesh_count(1);
//! data.set_sub_mesh(0, SubMeshDescriptor::new(0, 3), MeshUpdateFlags::empty()).unwrap();
//!
//! let mut meshes = [Mesh::new("triangle")];
//! apply_and_dispose_writable_mesh_data(array, &mut meshes).unwrap();
//! assert_eq!(meshes[0].indices(), vec![0, 1, 2]);
//! ```

use std::mem::size_of;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use bytemuck::Pod;
use glam::Vec3;

use crate::bounds::Bounds;
use crate::error::{MeshError, MeshResult};

use super::data::{IndexFormat, MeshUpdateFlags, SubMeshDescriptor};
use super::layout::{VertexAttributeDescriptor, VertexLayout};
use super::mesh::Mesh;
use super::storage::VertexStorage;
use super::stream::{VertexStream, VertexStreamMut};

/// Vertex, index and sub-mesh data of one mesh under construction.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub(crate) vertices: VertexStorage,
    pub(crate) index_format: IndexFormat,
    pub(crate) index_data: Vec<u8>,
    pub(crate) sub_meshes: Vec<SubMeshDescriptor>,
}

impl MeshData {
    /// Create empty mesh data (no vertices, no indices).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the vertex layout and allocate zeroed storage for `vertex_count` vertices.
    ///
    /// The descriptors are only read during this call; the resolved layout is
    /// kept instead.
    pub fn set_vertex_buffer_params(
        &mut self,
        vertex_count: u32,
        attributes: &[VertexAttributeDescriptor],
    ) -> MeshResult<()> {
        let layout = VertexLayout::from_descriptors(attributes)?;
        self.vertices = VertexStorage::allocate(layout, vertex_count);
        Ok(())
    }

    /// The resolved vertex layout.
    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.vertices.layout
    }

    /// Number of allocated vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.vertex_count
    }

    /// Number of vertex streams.
    pub fn vertex_buffer_count(&self) -> usize {
        self.vertices.buffers.len()
    }

    /// Typed read access to a vertex stream.
    ///
    /// Fails with [`MeshError::InvalidLayout`] if `T` is not exactly one
    /// vertex record of that stream.
    pub fn vertex_data<T: Pod>(&self, stream: usize) -> MeshResult<VertexStream<'_, T>> {
        self.vertices.stream(stream)
    }

    /// Typed write access to a vertex stream.
    ///
    /// Fails with [`MeshError::InvalidLayout`] if `T` is not exactly one
    /// vertex record of that stream.
    pub fn vertex_data_mut<T: Pod>(&mut self, stream: usize) -> MeshResult<VertexStreamMut<'_, T>> {
        self.vertices.stream_mut(stream)
    }

    /// Declare the index format and allocate zeroed storage for `index_count` indices.
    pub fn set_index_buffer_params(&mut self, index_count: u32, format: IndexFormat) {
        log::trace!(
            "Allocating index buffer: {} indices ({:?})",
            index_count,
            format
        );
        self.index_format = format;
        self.index_data = vec![0u8; index_count as usize * format.size()];
    }

    /// The declared index format.
    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    /// Number of allocated indices.
    pub fn index_count(&self) -> u32 {
        (self.index_data.len() / self.index_format.size()) as u32
    }

    fn check_index_type<T>(&self) -> MeshResult<()> {
        if size_of::<T>() != self.index_format.size() {
            return Err(MeshError::InvalidLayout(format!(
                "index buffer is {:?} but is accessed with {}-byte elements",
                self.index_format,
                size_of::<T>()
            )));
        }
        Ok(())
    }

    /// Typed read access to the index buffer.
    pub fn index_data<T: Pod>(&self) -> MeshResult<VertexStream<'_, T>> {
        self.check_index_type::<T>()?;
        Ok(VertexStream::new(&self.index_data))
    }

    /// Typed write access to the index buffer.
    pub fn index_data_mut<T: Pod>(&mut self) -> MeshResult<VertexStreamMut<'_, T>> {
        self.check_index_type::<T>()?;
        Ok(VertexStreamMut::new(&mut self.index_data))
    }

    /// Number of sub-mesh slots.
    pub fn sub_mesh_count(&self) -> usize {
        self.sub_meshes.len()
    }

    /// Resize the sub-mesh slots. New slots are empty triangle ranges.
    pub fn set_sub_mesh_count(&mut self, count: usize) {
        self.sub_meshes.resize(count, SubMeshDescriptor::new(0, 0));
    }

    /// Get a sub-mesh descriptor.
    pub fn sub_mesh(&self, index: usize) -> Option<&SubMeshDescriptor> {
        self.sub_meshes.get(index)
    }

    /// Describe sub-mesh `index`.
    ///
    /// The vertex range is computed from the referenced indices. Unless
    /// `DONT_VALIDATE_INDICES` is set every index must reference an allocated
    /// vertex. Unless `DONT_RECALCULATE_BOUNDS` is set the bounds are
    /// recomputed from the referenced positions.
    pub fn set_sub_mesh(
        &mut self,
        index: usize,
        desc: SubMeshDescriptor,
        flags: MeshUpdateFlags,
    ) -> MeshResult<()> {
        if index >= self.sub_meshes.len() {
            return Err(MeshError::SubMeshOutOfRange {
                index,
                count: self.sub_meshes.len(),
            });
        }
        let indices = self.index_format.decode(&self.index_data);
        let positions = if flags.contains(MeshUpdateFlags::DONT_RECALCULATE_BOUNDS) {
            None
        } else {
            self.vertices.positions()
        };
        let resolved = resolve_sub_mesh(
            desc,
            &indices,
            positions.as_deref(),
            self.vertices.vertex_count,
            flags,
        )?;
        log::debug!(
            "Sub-mesh {}: indices {}..{}, vertices {}+{}",
            index,
            resolved.index_start,
            resolved.index_end(),
            resolved.first_vertex,
            resolved.vertex_count
        );
        self.sub_meshes[index] = resolved;
        Ok(())
    }
}

/// Validate a sub-mesh against the index buffer and fill in its vertex range.
///
/// `positions` is `Some` when the bounds should be recomputed.
pub(crate) fn resolve_sub_mesh(
    mut desc: SubMeshDescriptor,
    indices: &[u32],
    positions: Option<&[Vec3]>,
    vertex_count: u32,
    flags: MeshUpdateFlags,
) -> MeshResult<SubMeshDescriptor> {
    let start = desc.index_start as usize;
    let end = match desc.index_start.checked_add(desc.index_count) {
        Some(end) if end as usize <= indices.len() => end as usize,
        _ => {
            return Err(MeshError::InvalidSubMesh(format!(
                "{} indices from {} exceed the index buffer of {}",
                desc.index_count,
                desc.index_start,
                indices.len()
            )));
        }
    };
    if let Some(per_primitive) = desc.topology.indices_per_primitive() {
        if desc.index_count % per_primitive != 0 {
            return Err(MeshError::InvalidSubMesh(format!(
                "{} indices do not form whole {:?} primitives",
                desc.index_count, desc.topology
            )));
        }
    }

    let range = &indices[start..end];
    let validate = !flags.contains(MeshUpdateFlags::DONT_VALIDATE_INDICES);
    let mut min = u32::MAX;
    let mut max = 0;
    for &i in range {
        let vertex = i.saturating_add(desc.base_vertex);
        if validate && vertex >= vertex_count {
            return Err(MeshError::IndexOutOfRange {
                index: vertex,
                vertex_count,
            });
        }
        min = min.min(vertex);
        max = max.max(vertex);
    }

    if range.is_empty() {
        desc.first_vertex = 0;
        desc.vertex_count = 0;
    } else {
        desc.first_vertex = min;
        if desc.vertex_count == 0 {
            desc.vertex_count = (max - min).saturating_add(1);
        }
    }

    if let Some(positions) = positions {
        let base_vertex = desc.base_vertex;
        let referenced = range.iter().filter_map(|&i| {
            let vertex = i.saturating_add(base_vertex) as usize;
            positions.get(vertex).copied()
        });
        desc.bounds = Bounds::from_points(referenced).unwrap_or_default();
    }
    Ok(desc)
}

/// A set of [`MeshData`] entries allocated together.
#[derive(Debug, Default)]
pub struct MeshDataArray {
    data: Vec<MeshData>,
}

impl MeshDataArray {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over entries mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MeshData> {
        self.data.iter_mut()
    }

    /// Move every entry into the corresponding mesh, consuming the array.
    pub fn apply_and_dispose(self, meshes: &mut [Mesh]) -> MeshResult<()> {
        if meshes.len() != self.data.len() {
            return Err(MeshError::MeshCountMismatch {
                expected: self.data.len(),
                actual: meshes.len(),
            });
        }
        for (data, mesh) in self.data.into_iter().zip(meshes.iter_mut()) {
            mesh.apply_mesh_data(data);
        }
        Ok(())
    }
}

impl From<Vec<MeshData>> for MeshDataArray {
    fn from(data: Vec<MeshData>) -> Self {
        Self { data }
    }
}

impl IntoIterator for MeshDataArray {
    type Item = MeshData;
    type IntoIter = std::vec::IntoIter<MeshData>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl Index<usize> for MeshDataArray {
    type Output = MeshData;

    fn index(&self, index: usize) -> &MeshData {
        &self.data[index]
    }
}

impl IndexMut<usize> for MeshDataArray {
    fn index_mut(&mut self, index: usize) -> &mut MeshData {
        &mut self.data[index]
    }
}

/// Allocate `count` empty writable mesh data entries.
pub fn allocate_writable_mesh_data(count: usize) -> MeshDataArray {
    log::trace!("Allocating {} writable mesh data entries", count);
    MeshDataArray {
        data: vec![MeshData::new(); count],
    }
}

/// Move every entry of `array` into the corresponding mesh.
///
/// The array is consumed, so its buffers cannot be written after handoff.
pub fn apply_and_dispose_writable_mesh_data(
    array: MeshDataArray,
    meshes: &mut [Mesh],
) -> MeshResult<()> {
    array.apply_and_dispose(meshes)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mesh::{PrimitiveTopology, VertexAttributeSemantic};

    fn triangle_data() -> MeshData {
        let mut data = MeshData::new();
        let position = [VertexAttributeDescriptor::default()];
        data.set_vertex_buffer_params(3, &position).unwrap();
        data.vertex_data_mut::<Vec3>(0)
            .unwrap()
            .copy_from_slice(&[Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), Vec3::X])
            .unwrap();
        data.set_index_buffer_params(3, IndexFormat::Uint16);
        data.index_data_mut::<u16>()
            .unwrap()
            .copy_from_slice(&[0, 1, 2])
            .unwrap();
        data.set_sub_mesh_count(1);
        data
    }

    #[test]
    fn test_buffer_params() {
        let data = triangle_data();
        assert_eq!(data.vertex_count(), 3);
        assert_eq!(data.vertex_buffer_count(), 1);
        assert_eq!(data.index_count(), 3);
        assert_eq!(data.index_format(), IndexFormat::Uint16);
        let layout = data.layout();
        assert!(layout.has_semantic(VertexAttributeSemantic::Position));
    }

    #[test]
    fn test_index_type_mismatch() {
        let mut data = triangle_data();
        assert!(matches!(
            data.index_data_mut::<u32>(),
            Err(MeshError::InvalidLayout(_))
        ));
        assert_eq!(data.index_data::<u16>().unwrap().to_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn test_set_sub_mesh_recalculates_bounds() {
        let mut data = triangle_data();
        let desc = SubMeshDescriptor::new(0, 3);
        let flags = MeshUpdateFlags::empty();
        data.set_sub_mesh(0, desc, flags).unwrap();

        let sub_mesh = data.sub_mesh(0).unwrap();
        assert_eq!(sub_mesh.first_vertex, 0);
        assert_eq!(sub_mesh.vertex_count, 3);
        assert_eq!(sub_mesh.bounds.min(), Vec3::ZERO);
        assert_eq!(sub_mesh.bounds.max(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_set_sub_mesh_keeps_supplied_bounds() {
        let mut data = triangle_data();
        let bounds = Bounds::new(Vec3::splat(5.0), Vec3::ONE);
        data.set_sub_mesh(
            0,
            SubMeshDescriptor::new(0, 3).with_bounds(bounds),
            MeshUpdateFlags::DONT_RECALCULATE_BOUNDS,
        )
        .unwrap();
        assert_eq!(data.sub_mesh(0).unwrap().bounds, bounds);
    }

    #[test]
    fn test_set_sub_mesh_validation() {
        let mut data = triangle_data();
        assert_eq!(
            data.set_sub_mesh(1, SubMeshDescriptor::new(0, 3), MeshUpdateFlags::empty()),
            Err(MeshError::SubMeshOutOfRange {
                index: 1,
                count: 1,
            })
        );
        assert!(matches!(
            data.set_sub_mesh(0, SubMeshDescriptor::new(0, 6), MeshUpdateFlags::empty()),
            Err(MeshError::InvalidSubMesh(_))
        ));
        assert!(matches!(
            data.set_sub_mesh(0, SubMeshDescriptor::new(0, 2), MeshUpdateFlags::empty()),
            Err(MeshError::InvalidSubMesh(_))
        ));
        let lines = SubMeshDescriptor::new(0, 2).with_topology(PrimitiveTopology::Lines);
        let result = data.set_sub_mesh(0, lines, MeshUpdateFlags::empty());
        assert!(result.is_ok());

        data.index_data_mut::<u16>().unwrap().set(2, 7).unwrap();
        assert_eq!(
            data.set_sub_mesh(0, SubMeshDescriptor::new(0, 3), MeshUpdateFlags::empty()),
            Err(MeshError::IndexOutOfRange {
                index: 7,
                vertex_count: 3,
            })
        );
        let unchecked = MeshUpdateFlags::DONT_VALIDATE_INDICES;
        let result = data.set_sub_mesh(0, SubMeshDescriptor::new(0, 3), unchecked);
        assert!(result.is_ok());
    }

    #[test]
    fn test_set_sub_mesh_rejects_overflowing_range() {
        let mut data = triangle_data();
        let desc = SubMeshDescriptor::new(u32::MAX, 3);
        assert!(matches!(
            data.set_sub_mesh(0, desc, MeshUpdateFlags::empty()),
            Err(MeshError::InvalidSubMesh(_))
        ));
        assert_eq!(data.sub_mesh(0), Some(&SubMeshDescriptor::new(0, 0)));
    }

    #[test]
    fn test_unvalidated_max_index_saturates_vertex_count() {
        let mut data = MeshData::new();
        let position = [VertexAttributeDescriptor::default()];
        data.set_vertex_buffer_params(3, &position).unwrap();
        data.set_index_buffer_params(3, IndexFormat::Uint32);
        data.index_data_mut::<u32>()
            .unwrap()
            .copy_from_slice(&[0, 1, u32::MAX])
            .unwrap();
        data.set_sub_mesh_count(1);

        let desc = SubMeshDescriptor::new(0, 3);
        let unchecked = MeshUpdateFlags::DONT_VALIDATE_INDICES;
        data.set_sub_mesh(0, desc, unchecked).unwrap();

        let sub_mesh = data.sub_mesh(0).unwrap();
        assert_eq!(sub_mesh.first_vertex, 0);
        assert_eq!(sub_mesh.vertex_count, u32::MAX);
    }

    #[test]
    fn test_apply_count_mismatch() {
        let array = allocate_writable_mesh_data(2);
        let mut meshes = [Mesh::new("only one")];
        assert_eq!(
            apply_and_dispose_writable_mesh_data(array, &mut meshes),
            Err(MeshError::MeshCountMismatch {
                expected: 2,
                actual: 1,
            })
        );
    }
}
