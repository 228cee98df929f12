//! CPU-side mesh types.
//!
//! This module provides GPU-agnostic mesh data structures:
//!
//! - [`VertexAttributeDescriptor`] / [`VertexLayout`] - Attribute schema across up to four streams
//! - [`MeshData`] - Writable mesh data filled in a layout chosen up front
//! - [`Mesh`] - Finished mesh (vertex bytes, index bytes, sub-meshes, bounds)
//! - [`MeshDescriptor`] - Buffer sizes a renderer allocates for a mesh

mod data;
mod layout;
#[allow(clippy::module_inception)]
mod mesh;
mod storage;
mod stream;
mod writable;

pub use data::{IndexFormat, MeshDescriptor, MeshUpdateFlags, PrimitiveTopology, SubMeshDescriptor};
pub use layout::{
    VertexAttribute, VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSemantic,
    VertexBufferLayout, VertexLayout, MAX_VERTEX_STREAMS,
};
pub use mesh::Mesh;
pub use stream::{VertexStream, VertexStreamMut};
pub use writable::{
    allocate_writable_mesh_data, apply_and_dispose_writable_mesh_data, MeshData, MeshDataArray,
};
