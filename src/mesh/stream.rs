//! Typed views over raw vertex and index bytes.
//!
//! Stream storage is a plain byte buffer with no alignment guarantee, so the
//! views copy elements in and out instead of handing out references.

use std::marker::PhantomData;
use std::mem::size_of;

use bytemuck::Pod;

use crate::error::{MeshError, MeshResult};

/// Read-only view of a stream as a sequence of `T`.
#[derive(Clone, Copy)]
pub struct VertexStream<'a, T> {
    bytes: &'a [u8],
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> VertexStream<'a, T> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len() % size_of::<T>(), 0);
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.bytes.len() / size_of::<T>()
    }

    /// Check if the stream holds no elements.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        let size = size_of::<T>();
        let start = index.checked_mul(size)?;
        let end = start.checked_add(size)?;
        let bytes = self.bytes.get(start..end)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// Iterate over all elements.
    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        self.bytes
            .chunks_exact(size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
    }

    /// Copy all elements into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

/// Writable view of a stream as a sequence of `T`.
pub struct VertexStreamMut<'a, T> {
    bytes: &'a mut [u8],
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> VertexStreamMut<'a, T> {
    pub(crate) fn new(bytes: &'a mut [u8]) -> Self {
        debug_assert_eq!(bytes.len() % size_of::<T>(), 0);
        Self {
            bytes,
            _marker: PhantomData,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.bytes.len() / size_of::<T>()
    }

    /// Check if the stream holds no elements.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.as_stream().get(index)
    }

    /// Write `value` at `index`.
    pub fn set(&mut self, index: usize, value: T) -> MeshResult<()> {
        let count = self.len();
        let size = size_of::<T>();
        let slot = index
            .checked_mul(size)
            .and_then(|start| Some(start..start.checked_add(size)?))
            .and_then(|range| self.bytes.get_mut(range))
            .ok_or(MeshError::VertexIndexOutOfRange { index, count })?;
        slot.copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    /// Write `value` to every element.
    pub fn fill(&mut self, value: T) {
        for slot in self.bytes.chunks_exact_mut(size_of::<T>()) {
            slot.copy_from_slice(bytemuck::bytes_of(&value));
        }
    }

    /// Write `values` starting at element 0.
    ///
    /// The number of values must equal the stream length.
    pub fn copy_from_slice(&mut self, values: &[T]) -> MeshResult<()> {
        if values.len() != self.len() {
            return Err(MeshError::VertexCountMismatch {
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.bytes.copy_from_slice(bytemuck::cast_slice(values));
        Ok(())
    }

    /// Borrow as a read-only view.
    pub fn as_stream(&self) -> VertexStream<'_, T> {
        VertexStream::new(self.bytes)
    }

    /// Copy all elements into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_stream().to_vec()
    }
}
