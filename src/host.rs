//! Mesh hosts.
//!
//! A host owns finished meshes and hands out [`MeshHandle`]s for them. Quad
//! builders talk to it through [`MeshHost`]: allocate writable buffers for a
//! schema, fill them, then commit them under a name together with their bounds.

use crate::bounds::Bounds;
use crate::error::MeshResult;
use crate::mesh::{
    apply_and_dispose_writable_mesh_data, IndexFormat, Mesh, MeshData, MeshDataArray,
    MeshUpdateFlags, SubMeshDescriptor, VertexAttributeDescriptor,
};

/// Opaque reference to a mesh owned by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub usize);

/// Collaborator that allocates mesh buffers and takes ownership of finished meshes.
pub trait MeshHost {
    /// Allocate zeroed vertex and index storage for `schema`.
    fn allocate(
        &mut self,
        vertex_count: u32,
        index_format: IndexFormat,
        index_count: u32,
        schema: &[VertexAttributeDescriptor],
    ) -> MeshResult<MeshData>;

    /// Take ownership of filled mesh data and publish it as `name` with `bounds`.
    fn commit(&mut self, name: &str, data: MeshData, bounds: Bounds) -> MeshResult<MeshHandle>;

    /// Take ownership of an already built mesh.
    fn submit(&mut self, mesh: Mesh) -> MeshHandle;
}

/// Host that keeps meshes in memory without any GPU upload.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    meshes: Vec<Mesh>,
}

impl HeadlessHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a committed mesh.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    /// Number of committed meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Check if no mesh has been committed.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl MeshHost for HeadlessHost {
    fn allocate(
        &mut self,
        vertex_count: u32,
        index_format: IndexFormat,
        index_count: u32,
        schema: &[VertexAttributeDescriptor],
    ) -> MeshResult<MeshData> {
        log::trace!(
            "HeadlessHost: allocating {} vertices, {} {:?} indices, {} attributes",
            vertex_count,
            index_count,
            index_format,
            schema.len()
        );
        let mut data = MeshData::new();
        data.set_vertex_buffer_params(vertex_count, schema)?;
        data.set_index_buffer_params(index_count, index_format);
        Ok(data)
    }

    /// Commits `data` as a single triangle-list sub-mesh over every index,
    /// carrying `bounds`.
    fn commit(
        &mut self,
        name: &str,
        mut data: MeshData,
        bounds: Bounds,
    ) -> MeshResult<MeshHandle> {
        let index_count = data.index_count();
        data.set_sub_mesh_count(1);
        data.set_sub_mesh(
            0,
            SubMeshDescriptor::new(0, index_count).with_bounds(bounds),
            MeshUpdateFlags::DONT_RECALCULATE_BOUNDS,
        )?;
        let mut meshes = [Mesh::new(name)];
        let array = MeshDataArray::from(vec![data]);
        apply_and_dispose_writable_mesh_data(array, &mut meshes)?;
        let [mut mesh] = meshes;
        mesh.set_bounds(bounds);
        Ok(self.submit(mesh))
    }

    fn submit(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len());
        log::debug!(
            "HeadlessHost: committed {:?} as {:?} ({} vertices, {} streams)",
            mesh.name(),
            handle,
            mesh.vertex_count(),
            mesh.buffer_count()
        );
        self.meshes.push(mesh);
        handle
    }
}
