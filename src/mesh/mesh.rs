//! The finished, renderable mesh.
//!
//! A [`Mesh`] owns raw vertex bytes per stream, index bytes, sub-mesh ranges
//! and bounds; this is what a renderer uploads. It can be filled two ways:
//!
//! - through [`MeshData`] (see [`super::writable`]), which writes records in
//!   a layout chosen up front;
//! - through the per-attribute setters ([`Mesh::set_vertices`],
//!   [`Mesh::set_normals`], ...), which add `Float32` attributes to stream 0
//!   as they are first set.

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::bounds::Bounds;
use crate::error::{MeshError, MeshResult};

use super::data::{
    IndexFormat, MeshDescriptor, MeshUpdateFlags, PrimitiveTopology, SubMeshDescriptor,
};
use super::layout::{VertexAttributeDescriptor, VertexAttributeSemantic, VertexLayout};
use super::storage::VertexStorage;
use super::writable::{resolve_sub_mesh, MeshData};

/// A mesh with vertex streams, an index buffer and sub-meshes.
#[derive(Clone)]
pub struct Mesh {
    name: String,
    vertices: VertexStorage,
    index_format: IndexFormat,
    index_data: Vec<u8>,
    sub_meshes: Vec<SubMeshDescriptor>,
    bounds: Bounds,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: VertexStorage::default(),
            index_format: IndexFormat::Uint16,
            index_data: Vec::new(),
            sub_meshes: Vec::new(),
            bounds: Bounds::default(),
        }
    }

    /// Get the mesh name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the mesh name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the vertex layout.
    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.vertices.layout
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.vertex_count
    }

    /// Get the number of vertex buffers.
    pub fn buffer_count(&self) -> usize {
        self.vertices.buffers.len()
    }

    /// Get raw vertex data for a specific stream.
    pub fn vertex_buffer_data(&self, stream: usize) -> Option<&[u8]> {
        self.vertices.buffers.get(stream).map(|v| v.as_slice())
    }

    /// Get the index format.
    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    /// Change the index format, re-encoding existing indices.
    pub fn set_index_format(&mut self, format: IndexFormat) -> MeshResult<()> {
        let indices = self.indices();
        if let Some(&index) = indices.iter().find(|&&i| i > format.max_index()) {
            return Err(MeshError::IndexFormatOverflow { index, format });
        }
        self.index_data = format.encode(&indices);
        self.index_format = format;
        Ok(())
    }

    /// Get the number of indices.
    pub fn index_count(&self) -> u32 {
        (self.index_data.len() / self.index_format.size()) as u32
    }

    /// Get the raw index data.
    pub fn index_data(&self) -> &[u8] {
        &self.index_data
    }

    /// Get the sub-mesh descriptors.
    pub fn sub_meshes(&self) -> &[SubMeshDescriptor] {
        &self.sub_meshes
    }

    /// Get the bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Override the bounds.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Create a [`MeshDescriptor`] matching this mesh.
    pub fn to_descriptor(&self) -> MeshDescriptor {
        let mut desc = MeshDescriptor::new(self.vertices.layout.clone())
            .with_vertex_count(self.vertex_count())
            .with_label(self.name.clone());
        if !self.index_data.is_empty() {
            desc = desc.with_indices(self.index_format, self.index_count());
        }
        desc
    }

    /// Take over the buffers of `data`.
    ///
    /// Mesh bounds become the union of the sub-mesh bounds, or are
    /// recomputed from positions when there are no sub-meshes.
    pub(crate) fn apply_mesh_data(&mut self, data: MeshData) {
        self.vertices = data.vertices;
        self.index_format = data.index_format;
        self.index_data = data.index_data;
        self.sub_meshes = data.sub_meshes;

        let mut sub_bounds = self.sub_meshes.iter().map(|s| s.bounds);
        self.bounds = match sub_bounds.next() {
            Some(first) => sub_bounds.fold(first, |acc, b| acc.union(&b)),
            None => self.position_bounds(),
        };
        log::debug!(
            "Applied mesh data to {:?}: {} vertices, {} indices, {} streams",
            self.name,
            self.vertex_count(),
            self.index_count(),
            self.buffer_count()
        );
    }

    fn position_bounds(&self) -> Bounds {
        self.vertices
            .positions()
            .and_then(|positions| Bounds::from_points(positions))
            .unwrap_or_default()
    }

    // ============================================================================
    // Per-attribute API
    // ============================================================================

    /// Add `semantic` as a `Float32` attribute in stream 0 unless the layout has it.
    fn ensure_attribute(
        &mut self,
        semantic: VertexAttributeSemantic,
        dimension: u32,
    ) -> MeshResult<()> {
        if self.vertices.layout.has_semantic(semantic) {
            return Ok(());
        }
        let mut added = VertexAttributeDescriptor::of(semantic);
        added.dimension = dimension;
        let mut descriptors = self.vertices.layout.descriptors();
        descriptors.push(added);
        descriptors.sort_by_key(|d| (d.stream, d.semantic));
        self.vertices.relayout(&descriptors)
    }

    fn set_attribute(
        &mut self,
        semantic: VertexAttributeSemantic,
        dimension: u32,
        values: impl ExactSizeIterator<Item = Vec4>,
    ) -> MeshResult<()> {
        if values.len() != self.vertex_count() as usize {
            return Err(MeshError::VertexCountMismatch {
                expected: self.vertex_count() as usize,
                actual: values.len(),
            });
        }
        self.ensure_attribute(semantic, dimension)?;
        self.vertices.write_attribute(semantic, values)
    }

    /// Highest vertex referenced by the sub-meshes, or by the raw indices
    /// when there are no sub-meshes.
    fn max_referenced_vertex(&self) -> Option<u32> {
        let indices = self.indices();
        if self.sub_meshes.is_empty() {
            return indices.into_iter().max();
        }
        let mut max = None;
        for sub_mesh in &self.sub_meshes {
            let end = (sub_mesh.index_end() as usize).min(indices.len());
            let start = (sub_mesh.index_start as usize).min(end);
            for &i in &indices[start..end] {
                max = max.max(Some(i.saturating_add(sub_mesh.base_vertex)));
            }
        }
        max
    }

    /// Set vertex positions.
    ///
    /// When the count differs from the current vertex count, every other
    /// attribute is truncated or zero-extended to match. Bounds are recomputed.
    ///
    /// Shrinking below a vertex that an index still references fails with
    /// [`MeshError::IndexOutOfRange`] and leaves the mesh unchanged.
    pub fn set_vertices(&mut self, positions: &[Vec3]) -> MeshResult<()> {
        let count = positions.len() as u32;
        if count < self.vertex_count() {
            if let Some(index) = self.max_referenced_vertex().filter(|&i| i >= count) {
                return Err(MeshError::IndexOutOfRange {
                    index,
                    vertex_count: count,
                });
            }
        }
        if count != self.vertex_count() {
            if self.vertices.layout.attributes.len() > 1 {
                log::warn!(
                    "Mesh {:?}: vertex count changed from {} to {}, resizing other attributes",
                    self.name,
                    self.vertex_count(),
                    count
                );
            }
            self.vertices.resize(count);
        }
        self.set_attribute(
            VertexAttributeSemantic::Position,
            3,
            positions.iter().map(|p| p.extend(0.0)),
        )?;
        self.recalculate_bounds();
        Ok(())
    }

    /// Set vertex normals. One per vertex.
    pub fn set_normals(&mut self, normals: &[Vec3]) -> MeshResult<()> {
        self.set_attribute(
            VertexAttributeSemantic::Normal,
            3,
            normals.iter().map(|n| n.extend(0.0)),
        )
    }

    /// Set vertex tangents (w = bitangent sign). One per vertex.
    pub fn set_tangents(&mut self, tangents: &[Vec4]) -> MeshResult<()> {
        self.set_attribute(
            VertexAttributeSemantic::Tangent,
            4,
            tangents.iter().copied(),
        )
    }

    /// Set texture coordinates of UV channel `channel` (0..=3). One per vertex.
    pub fn set_uvs(&mut self, channel: usize, uvs: &[Vec2]) -> MeshResult<()> {
        let semantic = VertexAttributeSemantic::tex_coord(channel).ok_or_else(|| {
            MeshError::InvalidLayout(format!("UV channel {} is not supported", channel))
        })?;
        let values = uvs.iter().map(|uv| uv.extend(0.0).extend(0.0));
        self.set_attribute(semantic, 2, values)
    }

    /// Set the triangle list as a single sub-mesh.
    ///
    /// Every index must reference an existing vertex and fit the index format.
    pub fn set_triangles(&mut self, indices: &[u32]) -> MeshResult<()> {
        let vertex_count = self.vertex_count();
        for &index in indices {
            if index >= vertex_count {
                return Err(MeshError::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
            if index > self.index_format.max_index() {
                return Err(MeshError::IndexFormatOverflow {
                    index,
                    format: self.index_format,
                });
            }
        }
        let positions = self.vertices.positions();
        let sub_mesh = resolve_sub_mesh(
            SubMeshDescriptor::new(0, indices.len() as u32),
            indices,
            positions.as_deref(),
            vertex_count,
            MeshUpdateFlags::empty(),
        )?;
        self.index_data = self.index_format.encode(indices);
        self.sub_meshes = vec![sub_mesh];
        Ok(())
    }

    /// Recompute mesh and sub-mesh bounds from vertex positions.
    pub fn recalculate_bounds(&mut self) {
        self.bounds = self.position_bounds();
        let Some(positions) = self.vertices.positions() else {
            return;
        };
        let indices = self.indices();
        for sub_mesh in &mut self.sub_meshes {
            let start = sub_mesh.index_start as usize;
            let end = (sub_mesh.index_end() as usize).min(indices.len());
            let base = sub_mesh.base_vertex;
            let range = &indices[start.min(end)..end];
            let referenced = range.iter().filter_map(|&i| {
                let vertex = i.saturating_add(base) as usize;
                positions.get(vertex).copied()
            });
            sub_mesh.bounds = Bounds::from_points(referenced).unwrap_or_default();
        }
    }

    // ============================================================================
    // Readback
    // ============================================================================

    /// Decode every value of an attribute as `Vec4` (missing components are zero).
    pub fn attribute_values(&self, semantic: VertexAttributeSemantic) -> Option<Vec<Vec4>> {
        self.vertices.attribute_values(semantic)
    }

    /// Decoded positions (empty if the mesh has none).
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.positions().unwrap_or_default()
    }

    /// Decoded normals (empty if the mesh has none).
    pub fn normals(&self) -> Vec<Vec3> {
        self.attribute_values(VertexAttributeSemantic::Normal)
            .map(|values| values.into_iter().map(|v| v.truncate()).collect())
            .unwrap_or_default()
    }

    /// Decoded tangents (empty if the mesh has none).
    pub fn tangents(&self) -> Vec<Vec4> {
        self.attribute_values(VertexAttributeSemantic::Tangent)
            .unwrap_or_default()
    }

    /// Decoded texture coordinates of UV channel `channel` (empty if absent).
    pub fn uvs(&self, channel: usize) -> Vec<Vec2> {
        VertexAttributeSemantic::tex_coord(channel)
            .and_then(|semantic| self.attribute_values(semantic))
            .map(|values| values.iter().map(|v| v.xy()).collect())
            .unwrap_or_default()
    }

    /// Decoded index buffer.
    pub fn indices(&self) -> Vec<u32> {
        self.index_format.decode(&self.index_data)
    }

    /// Triangles of every triangle sub-mesh, with base vertex applied.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        let indices = self.indices();
        self.sub_meshes
            .iter()
            .filter(|s| s.topology == PrimitiveTopology::Triangles)
            .flat_map(|s| {
                let end = (s.index_end() as usize).min(indices.len());
                let start = (s.index_start as usize).min(end);
                let base = s.base_vertex;
                indices[start..end]
                    .chunks_exact(3)
                    .map(|t| [t[0], t[1], t[2]].map(|i| i.saturating_add(base)))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("name", &self.name)
            .field("vertex_count", &self.vertex_count())
            .field("buffer_count", &self.buffer_count())
            .field("index_format", &self.index_format)
            .field("index_count", &self.index_count())
            .field("sub_meshes", &self.sub_meshes.len())
            .field("bounds", &self.bounds)
            .finish()
    }
}
