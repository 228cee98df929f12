//! Mesh construction error types.

use thiserror::Error;

use crate::mesh::IndexFormat;

/// Errors that can occur while declaring or filling mesh buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The attribute schema is malformed, or a record size does not match
    /// the declared stride of the stream it is written to.
    #[error("invalid vertex layout: {0}")]
    InvalidLayout(String),
    /// A vertex stream that was never declared was accessed.
    #[error("vertex stream {stream} is out of range ({count} streams declared)")]
    StreamOutOfRange { stream: usize, count: usize },
    /// A vertex element outside the allocated vertex count was accessed.
    #[error("vertex {index} is out of range ({count} vertices allocated)")]
    VertexIndexOutOfRange { index: usize, count: usize },
    /// An attribute array does not match the mesh vertex count.
    #[error("expected {expected} attribute values, got {actual}")]
    VertexCountMismatch { expected: usize, actual: usize },
    /// A triangle index references a vertex that does not exist.
    #[error("index {index} references a vertex outside of {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: u32 },
    /// A triangle index does not fit into the mesh index format.
    #[error("index {index} does not fit into {format:?}")]
    IndexFormatOverflow { index: u32, format: IndexFormat },
    /// A sub-mesh slot that was never declared was accessed.
    #[error("sub-mesh {index} is out of range ({count} sub-meshes declared)")]
    SubMeshOutOfRange { index: usize, count: usize },
    /// A sub-mesh descriptor does not fit the index buffer.
    #[error("invalid sub-mesh: {0}")]
    InvalidSubMesh(String),
    /// Apply was called with a different number of meshes than mesh data entries.
    #[error("expected {expected} meshes, got {actual}")]
    MeshCountMismatch { expected: usize, actual: usize },
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::InvalidLayout("stride 36 != 32".to_string());
        assert_eq!(err.to_string(), "invalid vertex layout: stride 36 != 32");

        let err = MeshError::StreamOutOfRange {
            stream: 4,
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "vertex stream 4 is out of range (2 streams declared)"
        );
    }
}
