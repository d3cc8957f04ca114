//! A growable byte buffer used for line assembly and buffered writes.
//!
//! Storage is a [`BytesMut`]; the buffer adds the bounds-checked, index based
//! operations the head and chunk parsers need, and a growth policy that at
//! least doubles the capacity every time it has to expand.

use std::cmp;

use bytes::BytesMut;
use thiserror::Error;

use crate::ensure;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("offset {offset} and length {length} out of range for a source of {size} bytes")]
    OutOfRange { offset: usize, length: usize, size: usize },

    #[error("index {index} out of bounds, the bound is {bound}")]
    IndexOutOfBounds { index: usize, bound: usize },
}

/// Contiguous, index addressable byte storage with amortized O(1) append.
///
/// `capacity()` never shrinks: `clear()` only resets the length, and bytes past
/// the length are never exposed by any accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    inner: BytesMut,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { inner: BytesMut::with_capacity(capacity) }
    }

    /// Appends `data[offset..offset + length]`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] if the range does not fit in `data`.
    /// The buffer itself never fails for lack of capacity.
    pub fn append(&mut self, data: &[u8], offset: usize, length: usize) -> Result<(), BufferError> {
        let end = offset.checked_add(length);
        ensure!(
            end.is_some_and(|end| end <= data.len()),
            BufferError::OutOfRange { offset, length, size: data.len() }
        );

        self.append_slice(&data[offset..offset + length]);
        Ok(())
    }

    pub fn append_slice(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let new_len = self.inner.len() + data.len();
        if new_len > self.inner.capacity() {
            self.expand(new_len);
        }
        self.inner.extend_from_slice(data);
    }

    fn expand(&mut self, required: usize) {
        let new_capacity = cmp::max(self.inner.capacity().saturating_mul(2), required);
        self.inner.reserve(new_capacity - self.inner.len());
    }

    /// # Errors
    ///
    /// Returns [`BufferError::IndexOutOfBounds`] if `index >= len()`.
    pub fn byte_at(&self, index: usize) -> Result<u8, BufferError> {
        self.inner.get(index).copied().ok_or(BufferError::IndexOutOfBounds { index, bound: self.inner.len() })
    }

    /// Sets the logical length. Growing inside the capacity exposes zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexOutOfBounds`] if `len > capacity()`.
    pub fn set_length(&mut self, len: usize) -> Result<(), BufferError> {
        let bound = self.inner.capacity();
        ensure!(len <= bound, BufferError::IndexOutOfBounds { index: len, bound });

        if len <= self.inner.len() {
            self.inner.truncate(len);
        } else {
            self.inner.resize(len, 0);
        }
        Ok(())
    }

    /// Finds the first `byte` in `from..to`.
    ///
    /// `to` is clamped to `len()`; an empty or inverted range finds nothing.
    pub fn index_of(&self, byte: u8, from: usize, to: usize) -> Option<usize> {
        let to = cmp::min(to, self.inner.len());
        if from >= to {
            return None;
        }
        self.inner[from..to].iter().position(|b| *b == byte).map(|pos| pos + from)
    }

    /// Returns `begin..end` with leading and trailing ASCII whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexOutOfBounds`] for a range outside `0..len()`.
    pub fn trimmed(&self, begin: usize, end: usize) -> Result<&[u8], BufferError> {
        ensure!(end <= self.inner.len(), BufferError::IndexOutOfBounds { index: end, bound: self.inner.len() });
        ensure!(begin <= end, BufferError::IndexOutOfBounds { index: begin, bound: end });
        Ok(self.inner[begin..end].trim_ascii())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Raw storage for encoders that frame straight into the buffer.
    pub(crate) fn as_bytes_mut(&mut self) -> &mut BytesMut {
        &mut self.inner
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(data: &[u8]) -> Self {
        let mut buffer = ByteBuffer::with_capacity(data.len());
        buffer.append_slice(data);
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_grows_without_losing_data() {
        let mut buffer = ByteBuffer::with_capacity(4);
        let mut expected = Vec::new();
        let mut last_capacity = buffer.capacity();

        for size in 1..=64usize {
            let chunk: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            buffer.append(&chunk, 0, chunk.len()).unwrap();
            expected.extend_from_slice(&chunk);

            assert!(buffer.capacity() >= last_capacity);
            assert!(buffer.capacity() >= buffer.len());
            last_capacity = buffer.capacity();
        }

        assert_eq!(buffer.as_slice(), &expected[..]);
    }

    #[test]
    fn growth_at_least_doubles() {
        let mut buffer = ByteBuffer::with_capacity(4);
        let before = buffer.capacity();
        buffer.append_slice(b"12345");
        assert!(buffer.capacity() >= before * 2);
    }

    #[test]
    fn append_rejects_bad_range() {
        let mut buffer = ByteBuffer::new();
        assert_eq!(
            buffer.append(b"abc", 2, 2),
            Err(BufferError::OutOfRange { offset: 2, length: 2, size: 3 })
        );
        assert!(buffer.append(b"abc", usize::MAX, 2).is_err());
        assert!(buffer.is_empty());

        buffer.append(b"abc", 1, 2).unwrap();
        assert_eq!(buffer.as_slice(), b"bc");
    }

    #[test]
    fn byte_at_is_bounds_checked() {
        let buffer = ByteBuffer::from(&b"xy"[..]);
        assert_eq!(buffer.byte_at(1), Ok(b'y'));
        assert_eq!(buffer.byte_at(2), Err(BufferError::IndexOutOfBounds { index: 2, bound: 2 }));
    }

    #[test]
    fn index_of_clamps_range() {
        let buffer = ByteBuffer::from(&b"Host: example"[..]);
        assert_eq!(buffer.index_of(b':', 0, usize::MAX), Some(4));
        assert_eq!(buffer.index_of(b':', 5, usize::MAX), None);
        assert_eq!(buffer.index_of(b'H', 0, 0), None);
        assert_eq!(buffer.index_of(b'e', 7, 3), None);
    }

    #[test]
    fn set_length_and_clear_keep_capacity() {
        let mut buffer = ByteBuffer::with_capacity(16);
        buffer.append_slice(b"hello world");
        let capacity = buffer.capacity();

        buffer.set_length(5).unwrap();
        assert_eq!(buffer.as_slice(), b"hello");

        assert!(buffer.set_length(capacity + 1).is_err());

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn trimmed_strips_whitespace() {
        let buffer = ByteBuffer::from(&b"Name:  value \t"[..]);
        assert_eq!(buffer.trimmed(5, buffer.len()).unwrap(), b"value");
        assert!(buffer.trimmed(3, 2).is_err());
        assert!(buffer.trimmed(0, 99).is_err());
    }
}
