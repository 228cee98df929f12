//! Mesh data descriptors.
//!
//! This module provides:
//! - [`PrimitiveTopology`] - How indices are assembled into primitives
//! - [`IndexFormat`] - Index data format (u16 or u32)
//! - [`SubMeshDescriptor`] - A range of the index buffer drawn as one part
//! - [`MeshUpdateFlags`] - Checks to skip when setting sub-meshes
//! - [`MeshDescriptor`] - Buffer sizes a renderer needs to allocate for a mesh

use std::sync::Arc;

use bitflags::bitflags;

use crate::bounds::Bounds;

use super::layout::VertexLayout;

/// Primitive topology describing how indices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each index is a separate point.
    Points,
    /// Every two indices form a line.
    Lines,
    /// Indices form a connected strip of lines.
    LineStrip,
    /// Every three indices form a triangle.
    #[default]
    Triangles,
    /// Every four indices form a quad.
    Quads,
}

impl PrimitiveTopology {
    /// Get the number of indices per primitive (for non-strip topologies).
    pub fn indices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::Points => Some(1),
            Self::Lines => Some(2),
            Self::Triangles => Some(3),
            Self::Quads => Some(4),
            Self::LineStrip => None,
        }
    }
}

/// Index format for indexed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit unsigned integers (max 65535 vertices).
    #[default]
    Uint16,
    /// 32-bit unsigned integers (max ~4 billion vertices).
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }

    /// Largest index value this format can store.
    pub fn max_index(&self) -> u32 {
        match self {
            Self::Uint16 => u16::MAX as u32,
            Self::Uint32 => u32::MAX,
        }
    }

    /// Decode index bytes of this format into `u32` values.
    pub(crate) fn decode(&self, bytes: &[u8]) -> Vec<u32> {
        match self {
            Self::Uint16 => bytes
                .chunks_exact(2)
                .map(|c| u16::from_ne_bytes([c[0], c[1]]) as u32)
                .collect(),
            Self::Uint32 => bytes
                .chunks_exact(4)
                .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        }
    }

    /// Encode `u32` indices into bytes of this format.
    ///
    /// Values must already fit the format.
    pub(crate) fn encode(&self, indices: &[u32]) -> Vec<u8> {
        match self {
            Self::Uint16 => indices
                .iter()
                .flat_map(|&i| (i as u16).to_ne_bytes())
                .collect(),
            Self::Uint32 => indices.iter().flat_map(|&i| i.to_ne_bytes()).collect(),
        }
    }
}

bitflags! {
    /// Checks and recomputations to skip when a sub-mesh is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MeshUpdateFlags: u32 {
        /// Do not check that indices reference existing vertices.
        const DONT_VALIDATE_INDICES = 1 << 0;
        /// Do not recompute sub-mesh bounds from vertex positions.
        const DONT_RECALCULATE_BOUNDS = 1 << 1;
    }
}

impl Default for MeshUpdateFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A range of the index buffer rendered as one part of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubMeshDescriptor {
    /// First index of the range.
    pub index_start: u32,
    /// Number of indices in the range.
    pub index_count: u32,
    /// Primitive topology of the range.
    pub topology: PrimitiveTopology,
    /// Value added to each index before fetching vertices.
    pub base_vertex: u32,
    /// Lowest vertex referenced (after `base_vertex`). Computed on set.
    pub first_vertex: u32,
    /// Number of vertices referenced. Computed on set unless supplied.
    pub vertex_count: u32,
    /// Bounds of the referenced vertices.
    pub bounds: Bounds,
}

impl SubMeshDescriptor {
    /// Create a triangle sub-mesh over `index_count` indices starting at `index_start`.
    pub fn new(index_start: u32, index_count: u32) -> Self {
        Self {
            index_start,
            index_count,
            topology: PrimitiveTopology::Triangles,
            base_vertex: 0,
            first_vertex: 0,
            vertex_count: 0,
            bounds: Bounds::default(),
        }
    }

    /// Set the primitive topology.
    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Set the bounds (kept when `DONT_RECALCULATE_BOUNDS` is used).
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the referenced vertex count.
    pub fn with_vertex_count(mut self, vertex_count: u32) -> Self {
        self.vertex_count = vertex_count;
        self
    }

    /// Set the base vertex.
    pub fn with_base_vertex(mut self, base_vertex: u32) -> Self {
        self.base_vertex = base_vertex;
        self
    }

    /// One past the last index of the range, saturating at `u32::MAX`.
    pub fn index_end(&self) -> u32 {
        self.index_start.saturating_add(self.index_count)
    }
}

/// Buffer sizes a renderer needs to allocate for a mesh.
///
/// # Example - Interleaved
///
/// ```
/// use procedural_mesh::mesh::{
///     IndexFormat, MeshDescriptor, VertexAttributeDescriptor, VertexAttributeFormat,
///     VertexAttributeSemantic, VertexLayout,
/// };
///
/// let layout = VertexLayout::from_descriptors(&[
///     VertexAttributeDescriptor::default(),
///     VertexAttributeDescriptor::of(VertexAttributeSemantic::Normal),
///     VertexAttributeDescriptor::new(
///         VertexAttributeSemantic::Tangent,
///         VertexAttributeFormat::Float16,
///         4,
///         0,
///     ),
///     VertexAttributeDescriptor::new(
///         VertexAttributeSemantic::TexCoord0,
///         VertexAttributeFormat::Float16,
///         2,
///         0,
///     ),
/// ])
/// .unwrap();
///
/// let desc = MeshDescriptor::new(layout)
///     .with_vertex_count(4)
///     .with_indices(IndexFormat::Uint16, 6)
///     .with_label("quad");
/// assert_eq!(desc.vertex_buffer_size(0), 4 * 36);
/// ```
#[derive(Debug)]
pub struct MeshDescriptor {
    /// Vertex layout (shared via Arc).
    pub layout: Arc<VertexLayout>,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Index format (None for non-indexed).
    pub index_format: Option<IndexFormat>,
    /// Number of indices (0 for non-indexed).
    pub index_count: u32,
    /// Optional label for debugging.
    pub label: Option<String>,
}

impl MeshDescriptor {
    /// Create a new mesh descriptor with the given layout.
    pub fn new(layout: Arc<VertexLayout>) -> Self {
        Self {
            layout,
            vertex_count: 0,
            index_format: None,
            index_count: 0,
            label: None,
        }
    }

    /// Set the vertex count.
    pub fn with_vertex_count(mut self, count: u32) -> Self {
        self.vertex_count = count;
        self
    }

    /// Set indexed drawing with the given format and count.
    pub fn with_indices(mut self, format: IndexFormat, count: u32) -> Self {
        self.index_format = Some(format);
        self.index_count = count;
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Check if this mesh uses indexed drawing.
    pub fn is_indexed(&self) -> bool {
        self.index_format.is_some() && self.index_count > 0
    }

    /// Compute the required size for a specific vertex buffer.
    pub fn vertex_buffer_size(&self, buffer_index: usize) -> u64 {
        let stride = self.layout.buffer_stride(buffer_index);
        self.vertex_count as u64 * stride as u64
    }

    /// Compute the required index buffer size in bytes.
    pub fn index_buffer_size(&self) -> u64 {
        if let Some(format) = self.index_format {
            self.index_count as u64 * format.size() as u64
        } else {
            0
        }
    }

    /// Get the number of vertex buffers needed.
    pub fn buffer_count(&self) -> usize {
        self.layout.buffer_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mesh::{VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSemantic};

    #[test]
    fn test_primitive_topology_indices() {
        assert_eq!(PrimitiveTopology::Points.indices_per_primitive(), Some(1));
        assert_eq!(PrimitiveTopology::Lines.indices_per_primitive(), Some(2));
        assert_eq!(
            PrimitiveTopology::Triangles.indices_per_primitive(),
            Some(3)
        );
        assert_eq!(PrimitiveTopology::LineStrip.indices_per_primitive(), None);
    }

    #[test]
    fn test_index_format() {
        assert_eq!(IndexFormat::Uint16.size(), 2);
        assert_eq!(IndexFormat::Uint32.size(), 4);
        assert_eq!(IndexFormat::Uint16.max_index(), 65535);

        let indices = [0, 2, 1, 1, 2, 3];
        for format in [IndexFormat::Uint16, IndexFormat::Uint32] {
            let bytes = format.encode(&indices);
            assert_eq!(bytes.len(), 6 * format.size());
            assert_eq!(format.decode(&bytes), indices.to_vec());
        }
    }

    #[test]
    fn test_update_flags_default_empty() {
        let flags = MeshUpdateFlags::default();
        assert!(flags.is_empty());
        assert!(!flags.contains(MeshUpdateFlags::DONT_RECALCULATE_BOUNDS));
    }

    #[test]
    fn test_index_end_saturates() {
        assert_eq!(SubMeshDescriptor::new(3, 6).index_end(), 9);
        assert_eq!(SubMeshDescriptor::new(u32::MAX, 3).index_end(), u32::MAX);
    }

    #[test]
    fn test_mesh_descriptor_sizes() {
        let layout = VertexLayout::from_descriptors(&[
            VertexAttributeDescriptor::default(),
            VertexAttributeDescriptor::new(
                VertexAttributeSemantic::TexCoord0,
                VertexAttributeFormat::Float16,
                2,
                1,
            ),
        ])
        .unwrap();
        let desc = MeshDescriptor::new(layout)
            .with_vertex_count(4)
            .with_indices(IndexFormat::Uint16, 6)
            .with_label("quad");

        assert!(desc.is_indexed());
        assert_eq!(desc.buffer_count(), 2);
        assert_eq!(desc.vertex_buffer_size(0), 4 * 12);
        assert_eq!(desc.vertex_buffer_size(1), 4 * 4);
        assert_eq!(desc.index_buffer_size(), 6 * 2);
    }

    #[test]
    fn test_mesh_descriptor_non_indexed() {
        let position = VertexAttributeDescriptor::default();
        let layout = VertexLayout::from_descriptors(&[position]).unwrap();
        let desc = MeshDescriptor::new(layout).with_vertex_count(100);

        assert!(!desc.is_indexed());
        assert_eq!(desc.index_buffer_size(), 0);
    }
}
