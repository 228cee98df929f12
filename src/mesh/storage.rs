//! Raw per-stream vertex storage shared by writable mesh data and meshes.

use std::mem::size_of;
use std::sync::Arc;

use bytemuck::Pod;
use glam::{Vec3, Vec4};

use crate::error::{MeshError, MeshResult};

use super::layout::{VertexAttributeDescriptor, VertexAttributeSemantic, VertexLayout};
use super::stream::{VertexStream, VertexStreamMut};

/// Vertex bytes for every stream of a layout.
#[derive(Debug, Clone, Default)]
pub(crate) struct VertexStorage {
    pub layout: Arc<VertexLayout>,
    pub vertex_count: u32,
    pub buffers: Vec<Vec<u8>>,
}

impl VertexStorage {
    /// Allocate zeroed storage for `vertex_count` vertices.
    pub fn allocate(layout: Arc<VertexLayout>, vertex_count: u32) -> Self {
        let buffers = layout
            .buffers
            .iter()
            .map(|b| {
                log::trace!(
                    "Allocating vertex stream: {} vertices x {} bytes",
                    vertex_count,
                    b.stride
                );
                vec![0u8; vertex_count as usize * b.stride as usize]
            })
            .collect();
        Self {
            layout,
            vertex_count,
            buffers,
        }
    }

    fn check_stream<T>(&self, stream: usize) -> MeshResult<()> {
        if stream >= self.buffers.len() {
            return Err(MeshError::StreamOutOfRange {
                stream,
                count: self.buffers.len(),
            });
        }
        let stride = self.layout.buffer_stride(stream) as usize;
        if size_of::<T>() != stride {
            return Err(MeshError::InvalidLayout(format!(
                "stream {} has a stride of {} bytes but is accessed with {}-byte elements",
                stream,
                stride,
                size_of::<T>()
            )));
        }
        Ok(())
    }

    /// Typed read access to one stream.
    pub fn stream<T: Pod>(&self, stream: usize) -> MeshResult<VertexStream<'_, T>> {
        self.check_stream::<T>(stream)?;
        Ok(VertexStream::new(&self.buffers[stream]))
    }

    /// Typed write access to one stream.
    pub fn stream_mut<T: Pod>(&mut self, stream: usize) -> MeshResult<VertexStreamMut<'_, T>> {
        self.check_stream::<T>(stream)?;
        Ok(VertexStreamMut::new(&mut self.buffers[stream]))
    }

    /// Decode every value of an attribute as `Vec4`.
    pub fn attribute_values(&self, semantic: VertexAttributeSemantic) -> Option<Vec<Vec4>> {
        let attr = self.layout.get_attribute(semantic)?;
        let stride = self.layout.buffer_stride(attr.buffer_index as usize) as usize;
        let buffer = &self.buffers[attr.buffer_index as usize];
        let values = (0..self.vertex_count as usize)
            .map(|v| attr.read_vertex(buffer, stride, v))
            .collect();
        Some(values)
    }

    /// Decoded positions, if the layout has them.
    pub fn positions(&self) -> Option<Vec<Vec3>> {
        self.attribute_values(VertexAttributeSemantic::Position)
            .map(|values| values.into_iter().map(|v| v.truncate()).collect())
    }

    /// Encode `values` into an existing attribute.
    pub fn write_attribute(
        &mut self,
        semantic: VertexAttributeSemantic,
        values: impl ExactSizeIterator<Item = Vec4>,
    ) -> MeshResult<()> {
        if values.len() != self.vertex_count as usize {
            return Err(MeshError::VertexCountMismatch {
                expected: self.vertex_count as usize,
                actual: values.len(),
            });
        }
        let attr = self.layout.get_attribute(semantic).cloned();
        let attr = attr.ok_or_else(|| {
            MeshError::InvalidLayout(format!("layout has no {:?} attribute", semantic))
        })?;
        let stride = self.layout.buffer_stride(attr.buffer_index as usize) as usize;
        let buffer = &mut self.buffers[attr.buffer_index as usize];
        for (v, value) in values.enumerate() {
            attr.write_vertex(buffer, stride, v, value);
        }
        Ok(())
    }

    /// Switch to a new layout, carrying over every attribute both layouts share.
    pub fn relayout(&mut self, descriptors: &[VertexAttributeDescriptor]) -> MeshResult<()> {
        let layout = VertexLayout::from_descriptors(descriptors)?;
        let mut next = Self::allocate(layout, self.vertex_count);
        for attr in &self.layout.attributes {
            if next.layout.has_semantic(attr.semantic) {
                if let Some(values) = self.attribute_values(attr.semantic) {
                    next.write_attribute(attr.semantic, values.into_iter())?;
                }
            }
        }
        *self = next;
        Ok(())
    }

    /// Change the vertex count, truncating or zero-extending every stream.
    pub fn resize(&mut self, vertex_count: u32) {
        if vertex_count == self.vertex_count {
            return;
        }
        for (buffer, layout) in self.buffers.iter_mut().zip(&self.layout.buffers) {
            buffer.resize(vertex_count as usize * layout.stride as usize, 0);
        }
        self.vertex_count = vertex_count;
    }
}
