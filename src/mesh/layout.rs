//! Vertex layout definitions for meshes.
//!
//! A layout is declared as a list of [`VertexAttributeDescriptor`]s, each
//! naming a semantic, a numeric format, a dimension and the stream (vertex
//! buffer) it lives in. [`VertexLayout::from_descriptors`] resolves the list
//! into per-stream strides and per-attribute byte offsets. Offsets are
//! assigned in declaration order, so a stream's stride is the sum of the
//! sizes of its attributes.
//!
//! Layouts are shared via `Arc` since there are typically only a few
//! combinations across many meshes.
//!
//! # Example
//!
//! ```
//! use procedural_mesh::mesh::{
//!     VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSemantic, VertexLayout,
//! };
//!
//! // Position and normal in stream 0, half precision UVs in stream 1.
//! let layout = VertexLayout::from_descriptors(&[
//!     VertexAttributeDescriptor::default(),
//!     VertexAttributeDescriptor::of(VertexAttributeSemantic::Normal),
//!     VertexAttributeDescriptor::of(VertexAttributeSemantic::TexCoord0)
//!         .with_format(VertexAttributeFormat::Float16)
//!         .with_dimension(2)
//!         .at_stream(1),
//! ])
//! .unwrap();
//!
//! assert_eq!(layout.buffer_stride(0), 24);
//! assert_eq!(layout.buffer_stride(1), 4);
//! ```

use std::sync::Arc;

use glam::Vec4;
use half::f16;

use crate::error::{MeshError, MeshResult};

/// Maximum number of vertex streams a layout may declare.
pub const MAX_VERTEX_STREAMS: usize = 4;

/// Semantic meaning of a vertex attribute.
///
/// Within a stream, attributes must be declared in the order of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexAttributeSemantic {
    /// Vertex position.
    Position,
    /// Vertex normal.
    Normal,
    /// Vertex tangent (w = bitangent sign).
    Tangent,
    /// Vertex color.
    Color,
    /// Texture coordinates set 0.
    TexCoord0,
    /// Texture coordinates set 1.
    TexCoord1,
    /// Texture coordinates set 2.
    TexCoord2,
    /// Texture coordinates set 3.
    TexCoord3,
    /// Skinning weights.
    BlendWeight,
    /// Skinning bone indices.
    BlendIndices,
}

impl VertexAttributeSemantic {
    /// Texture coordinate semantic for a UV channel (0..=3).
    pub fn tex_coord(channel: usize) -> Option<Self> {
        match channel {
            0 => Some(Self::TexCoord0),
            1 => Some(Self::TexCoord1),
            2 => Some(Self::TexCoord2),
            3 => Some(Self::TexCoord3),
            _ => None,
        }
    }
}

/// Numeric format of a single attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexAttributeFormat {
    /// 32-bit float.
    #[default]
    Float32,
    /// 16-bit half precision float.
    Float16,
    /// 8-bit unsigned, normalized to 0.0..=1.0.
    UNorm8,
    /// 8-bit signed, normalized to -1.0..=1.0.
    SNorm8,
    /// 16-bit unsigned, normalized to 0.0..=1.0.
    UNorm16,
    /// 16-bit signed, normalized to -1.0..=1.0.
    SNorm16,
    /// 8-bit unsigned integer.
    UInt8,
    /// 8-bit signed integer.
    SInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 16-bit signed integer.
    SInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 32-bit signed integer.
    SInt32,
}

impl VertexAttributeFormat {
    /// Get the size in bytes of one component.
    pub fn size(&self) -> usize {
        match self {
            Self::Float32 | Self::UInt32 | Self::SInt32 => 4,
            Self::Float16 | Self::UNorm16 | Self::SNorm16 | Self::UInt16 | Self::SInt16 => 2,
            Self::UNorm8 | Self::SNorm8 | Self::UInt8 | Self::SInt8 => 1,
        }
    }

    /// Encode one component into `out` (native byte order).
    ///
    /// `out` must be exactly [`size`](Self::size) bytes long. Normalized
    /// formats clamp to their range, integer formats round.
    pub fn write_component(&self, value: f32, out: &mut [u8]) {
        match self {
            Self::Float32 => out.copy_from_slice(&value.to_ne_bytes()),
            Self::Float16 => out.copy_from_slice(&f16::from_f32(value).to_ne_bytes()),
            Self::UNorm8 => out[0] = (value.clamp(0.0, 1.0) * 255.0).round() as u8,
            Self::SNorm8 => out[0] = ((value.clamp(-1.0, 1.0) * 127.0).round() as i8) as u8,
            Self::UNorm16 => {
                let bits = (value.clamp(0.0, 1.0) * 65535.0).round() as u16;
                out.copy_from_slice(&bits.to_ne_bytes());
            }
            Self::SNorm16 => {
                let bits = (value.clamp(-1.0, 1.0) * 32767.0).round() as i16;
                out.copy_from_slice(&bits.to_ne_bytes());
            }
            Self::UInt8 => out[0] = value.round() as u8,
            Self::SInt8 => out[0] = (value.round() as i8) as u8,
            Self::UInt16 => out.copy_from_slice(&(value.round() as u16).to_ne_bytes()),
            Self::SInt16 => out.copy_from_slice(&(value.round() as i16).to_ne_bytes()),
            Self::UInt32 => out.copy_from_slice(&(value.round() as u32).to_ne_bytes()),
            Self::SInt32 => out.copy_from_slice(&(value.round() as i32).to_ne_bytes()),
        }
    }

    /// Decode one component from `bytes` (native byte order).
    pub fn read_component(&self, bytes: &[u8]) -> f32 {
        let b2 = || [bytes[0], bytes[1]];
        let b4 = || [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            Self::Float32 => f32::from_ne_bytes(b4()),
            Self::Float16 => f16::from_ne_bytes(b2()).to_f32(),
            Self::UNorm8 => bytes[0] as f32 / 255.0,
            Self::SNorm8 => (bytes[0] as i8 as f32 / 127.0).max(-1.0),
            Self::UNorm16 => u16::from_ne_bytes(b2()) as f32 / 65535.0,
            Self::SNorm16 => (i16::from_ne_bytes(b2()) as f32 / 32767.0).max(-1.0),
            Self::UInt8 => bytes[0] as f32,
            Self::SInt8 => bytes[0] as i8 as f32,
            Self::UInt16 => u16::from_ne_bytes(b2()) as f32,
            Self::SInt16 => i16::from_ne_bytes(b2()) as f32,
            Self::UInt32 => u32::from_ne_bytes(b4()) as f32,
            Self::SInt32 => i32::from_ne_bytes(b4()) as f32,
        }
    }
}

/// Declares one vertex attribute before any vertex data is written.
///
/// The default descriptor is a 3-component `Float32` position in stream 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeDescriptor {
    /// Semantic meaning of this attribute.
    pub semantic: VertexAttributeSemantic,
    /// Component format.
    pub format: VertexAttributeFormat,
    /// Number of components (1..=4).
    pub dimension: u32,
    /// Stream (vertex buffer) index.
    pub stream: u32,
}

impl Default for VertexAttributeDescriptor {
    fn default() -> Self {
        Self {
            semantic: VertexAttributeSemantic::Position,
            format: VertexAttributeFormat::Float32,
            dimension: 3,
            stream: 0,
        }
    }
}

impl VertexAttributeDescriptor {
    /// Create a new attribute descriptor.
    pub fn new(
        semantic: VertexAttributeSemantic,
        format: VertexAttributeFormat,
        dimension: u32,
        stream: u32,
    ) -> Self {
        Self {
            semantic,
            format,
            dimension,
            stream,
        }
    }

    /// Create a descriptor for `semantic` with default format, dimension and stream.
    pub fn of(semantic: VertexAttributeSemantic) -> Self {
        Self {
            semantic,
            ..Default::default()
        }
    }

    /// Set the component format.
    pub fn with_format(mut self, format: VertexAttributeFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the number of components.
    pub fn with_dimension(mut self, dimension: u32) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the stream index for this attribute.
    pub fn at_stream(mut self, stream: u32) -> Self {
        self.stream = stream;
        self
    }

    /// Size in bytes of one element of this attribute.
    pub fn byte_size(&self) -> usize {
        self.format.size() * self.dimension as usize
    }
}

/// Describes a single vertex buffer binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayout {
    /// Stride in bytes between consecutive vertices.
    pub stride: u32,
}

impl VertexBufferLayout {
    /// Create a new vertex buffer layout with the given stride.
    pub fn new(stride: u32) -> Self {
        Self { stride }
    }
}

/// A resolved vertex attribute: its descriptor plus its byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Semantic meaning of this attribute.
    pub semantic: VertexAttributeSemantic,
    /// Component format.
    pub format: VertexAttributeFormat,
    /// Number of components.
    pub dimension: u32,
    /// Byte offset within a vertex of its stream.
    pub offset: u32,
    /// Index of the vertex buffer this attribute lives in.
    pub buffer_index: u32,
}

impl VertexAttribute {
    /// The descriptor this attribute was resolved from.
    pub fn descriptor(&self) -> VertexAttributeDescriptor {
        VertexAttributeDescriptor::new(
            self.semantic,
            self.format,
            self.dimension,
            self.buffer_index,
        )
    }

    /// Decode this attribute of `vertex` from its stream bytes.
    ///
    /// Components beyond the attribute dimension read as zero.
    pub(crate) fn read_vertex(&self, buffer: &[u8], stride: usize, vertex: usize) -> Vec4 {
        let mut out = [0.0f32; 4];
        let size = self.format.size();
        let base = vertex * stride + self.offset as usize;
        for (c, slot) in out.iter_mut().enumerate().take(self.dimension as usize) {
            let start = base + c * size;
            *slot = self.format.read_component(&buffer[start..start + size]);
        }
        Vec4::from_array(out)
    }

    /// Encode the first `dimension` components of `value` into the stream bytes of `vertex`.
    pub(crate) fn write_vertex(
        &self,
        buffer: &mut [u8],
        stride: usize,
        vertex: usize,
        value: Vec4,
    ) {
        let size = self.format.size();
        let base = vertex * stride + self.offset as usize;
        let dimension = self.dimension as usize;
        for (c, component) in value.to_array().into_iter().take(dimension).enumerate() {
            let start = base + c * size;
            self.format
                .write_component(component, &mut buffer[start..start + size]);
        }
    }
}

/// Describes the layout of vertex data across one or more streams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    /// Descriptions of each vertex buffer binding.
    pub buffers: Vec<VertexBufferLayout>,
    /// The vertex attributes, each referencing a buffer by index.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Resolve attribute descriptors into a layout.
    ///
    /// Fails with [`MeshError::InvalidLayout`] when a descriptor has an
    /// unsupported dimension or size, when a semantic is declared twice,
    /// when streams are out of range or left empty, or when attributes of a
    /// stream are not in canonical semantic order.
    pub fn from_descriptors(descriptors: &[VertexAttributeDescriptor]) -> MeshResult<Arc<Self>> {
        let mut buffers: Vec<VertexBufferLayout> = Vec::new();
        let mut attributes = Vec::with_capacity(descriptors.len());

        for (i, desc) in descriptors.iter().enumerate() {
            if !(1..=4).contains(&desc.dimension) {
                return Err(MeshError::InvalidLayout(format!(
                    "attribute {:?} has dimension {}, expected 1..=4",
                    desc.semantic, desc.dimension
                )));
            }
            if desc.byte_size() % 4 != 0 {
                return Err(MeshError::InvalidLayout(format!(
                    "attribute {:?} is {} bytes, attribute sizes must be a multiple of 4",
                    desc.semantic,
                    desc.byte_size()
                )));
            }
            let stream = desc.stream as usize;
            if stream >= MAX_VERTEX_STREAMS {
                return Err(MeshError::InvalidLayout(format!(
                    "attribute {:?} uses stream {}, at most {} streams are supported",
                    desc.semantic, desc.stream, MAX_VERTEX_STREAMS
                )));
            }
            let seen = &descriptors[..i];
            if seen.iter().any(|d| d.semantic == desc.semantic) {
                return Err(MeshError::InvalidLayout(format!(
                    "attribute {:?} is declared more than once",
                    desc.semantic
                )));
            }
            if let Some(prev) = seen.iter().rev().find(|d| d.stream == desc.stream) {
                if prev.semantic > desc.semantic {
                    return Err(MeshError::InvalidLayout(format!(
                        "attribute {:?} must be declared before {:?} in stream {}",
                        desc.semantic, prev.semantic, desc.stream
                    )));
                }
            }

            if buffers.len() <= stream {
                buffers.resize(stream + 1, VertexBufferLayout::new(0));
            }
            let offset = buffers[stream].stride;
            buffers[stream].stride += desc.byte_size() as u32;
            attributes.push(VertexAttribute {
                semantic: desc.semantic,
                format: desc.format,
                dimension: desc.dimension,
                offset,
                buffer_index: desc.stream,
            });
        }

        if let Some(empty) = buffers.iter().position(|b| b.stride == 0) {
            return Err(MeshError::InvalidLayout(format!(
                "stream {} has no attributes",
                empty
            )));
        }

        let layout = Self {
            buffers,
            attributes,
        };
        log::debug!(
            "Resolved vertex layout: {} attributes across {} streams (strides {:?})",
            layout.attributes.len(),
            layout.buffers.len(),
            layout.buffers.iter().map(|b| b.stride).collect::<Vec<_>>()
        );
        Ok(Arc::new(layout))
    }

    /// Get the number of vertex buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Get the stride for a specific buffer.
    pub fn buffer_stride(&self, buffer_index: usize) -> u32 {
        self.buffers.get(buffer_index).map_or(0, |b| b.stride)
    }

    /// Check if this layout has a specific semantic.
    pub fn has_semantic(&self, semantic: VertexAttributeSemantic) -> bool {
        self.attributes.iter().any(|a| a.semantic == semantic)
    }

    /// Get an attribute by semantic.
    pub fn get_attribute(&self, semantic: VertexAttributeSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }

    /// Get all attributes for a specific buffer.
    pub fn attributes_for_buffer(
        &self,
        buffer_index: u32,
    ) -> impl Iterator<Item = &VertexAttribute> {
        self.attributes
            .iter()
            .filter(move |attr| attr.buffer_index == buffer_index)
    }

    /// The descriptors this layout was resolved from, in declaration order.
    pub fn descriptors(&self) -> Vec<VertexAttributeDescriptor> {
        self.attributes
            .iter()
            .map(VertexAttribute::descriptor)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use VertexAttributeFormat as F;
    use VertexAttributeSemantic as S;

    #[test]
    fn test_vertex_attribute_format_size() {
        assert_eq!(F::Float32.size(), 4);
        assert_eq!(F::Float16.size(), 2);
        assert_eq!(F::UNorm8.size(), 1);
        assert_eq!(F::SInt32.size(), 4);
    }

    #[test]
    fn test_default_descriptor_is_position() {
        let desc = VertexAttributeDescriptor::default();
        assert_eq!(desc.semantic, S::Position);
        assert_eq!(desc.format, F::Float32);
        assert_eq!(desc.dimension, 3);
        assert_eq!(desc.stream, 0);
        assert_eq!(desc.byte_size(), 12);
    }

    #[test]
    fn test_vertex_layout_single_stream() {
        let layout = VertexLayout::from_descriptors(&[
            VertexAttributeDescriptor::default(),
            VertexAttributeDescriptor::of(S::Normal),
            VertexAttributeDescriptor::new(S::Tangent, F::Float16, 4, 0),
            VertexAttributeDescriptor::new(S::TexCoord0, F::Float16, 2, 0),
        ])
        .unwrap();

        assert_eq!(layout.buffer_count(), 1);
        assert_eq!(layout.buffer_stride(0), 36);
        assert_eq!(layout.get_attribute(S::Tangent).unwrap().offset, 24);
        assert_eq!(layout.get_attribute(S::TexCoord0).unwrap().offset, 32);
        assert!(!layout.has_semantic(S::Color));
    }

    #[test]
    fn test_vertex_layout_multi_stream() {
        let layout = VertexLayout::from_descriptors(&[
            VertexAttributeDescriptor::default(),
            VertexAttributeDescriptor::of(S::Normal).at_stream(1),
            VertexAttributeDescriptor::new(S::Tangent, F::Float16, 4, 2),
            VertexAttributeDescriptor::new(S::TexCoord0, F::Float16, 2, 3),
        ])
        .unwrap();

        assert_eq!(layout.buffer_count(), 4);
        assert_eq!(layout.buffer_stride(0), 12);
        assert_eq!(layout.buffer_stride(1), 12);
        assert_eq!(layout.buffer_stride(2), 8);
        assert_eq!(layout.buffer_stride(3), 4);
        assert_eq!(layout.buffer_stride(4), 0);

        let stream2: Vec<_> = layout.attributes_for_buffer(2).collect();
        assert_eq!(stream2.len(), 1);
        assert_eq!(stream2[0].semantic, S::Tangent);
        assert_eq!(stream2[0].offset, 0);
    }

    #[test]
    fn test_descriptors_round_trip() {
        let descriptors = [
            VertexAttributeDescriptor::default(),
            VertexAttributeDescriptor::new(S::TexCoord0, F::Float16, 2, 1),
        ];
        let layout = VertexLayout::from_descriptors(&descriptors).unwrap();
        assert_eq!(layout.descriptors(), descriptors.to_vec());
    }

    #[test]
    fn test_rejects_bad_dimension() {
        let descriptor = VertexAttributeDescriptor::default().with_dimension(5);
        let err = VertexLayout::from_descriptors(&[descriptor]).unwrap_err();
        assert!(matches!(err, MeshError::InvalidLayout(_)));
    }

    #[test]
    fn test_rejects_unaligned_attribute_size() {
        // 3 half floats = 6 bytes
        let descriptor = VertexAttributeDescriptor::new(S::Position, F::Float16, 3, 0);
        let err = VertexLayout::from_descriptors(&[descriptor]).unwrap_err();
        assert!(matches!(err, MeshError::InvalidLayout(_)));
    }

    #[test]
    fn test_rejects_duplicate_semantic() {
        let err = VertexLayout::from_descriptors(&[
            VertexAttributeDescriptor::default(),
            VertexAttributeDescriptor::default().at_stream(1),
        ])
        .unwrap_err();
        assert!(matches!(err, MeshError::InvalidLayout(_)));
    }

    #[test]
    fn test_rejects_out_of_order_and_gaps() {
        let out_of_order = VertexLayout::from_descriptors(&[
            VertexAttributeDescriptor::of(S::Normal),
            VertexAttributeDescriptor::default(),
        ]);
        assert!(out_of_order.is_err());

        // Stream 1 is skipped
        let gap = VertexLayout::from_descriptors(&[
            VertexAttributeDescriptor::default(),
            VertexAttributeDescriptor::of(S::Normal).at_stream(2),
        ]);
        assert!(gap.is_err());

        let stream = MAX_VERTEX_STREAMS as u32;
        let descriptor = VertexAttributeDescriptor::new(S::Position, F::Float32, 3, stream);
        assert!(VertexLayout::from_descriptors(&[descriptor]).is_err());
    }

    #[test]
    fn test_component_encoding() {
        let mut buf = [0u8; 4];
        for (format, value) in [
            (F::Float32, -0.25),
            (F::Float16, 0.5),
            (F::UNorm8, 1.0),
            (F::SNorm8, -1.0),
            (F::UNorm16, 0.0),
            (F::SNorm16, 1.0),
            (F::UInt16, 42.0),
            (F::SInt32, -7.0),
        ] {
            let bytes = &mut buf[..format.size()];
            format.write_component(value, bytes);
            assert_eq!(format.read_component(bytes), value, "{format:?}");
        }

        // Normalized formats clamp
        let bytes = &mut buf[..1];
        F::UNorm8.write_component(3.0, bytes);
        assert_eq!(F::UNorm8.read_component(bytes), 1.0);
    }
}
