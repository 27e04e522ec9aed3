//! Zero-copy view over a packed RQ record.

use crate::error::{Error, Result};

use super::encoder::encoded_size;
use super::metadata::RqMetadata;

/// Borrowed view of a `[codes][metadata]` record produced by
/// [`RqEncoder`](super::RqEncoder).
///
/// Downstream code that only needs the codes or a metadata field can read them
/// here without re-encoding.
#[derive(Debug, Clone, Copy)]
pub struct PackedVector<'a> {
    bytes: &'a [u8],
    dimension: usize,
}

impl<'a> PackedVector<'a> {
    /// Wraps `bytes`, which must be exactly `dimension + 16` long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] on any other length.
    pub fn new(bytes: &'a [u8], dimension: usize) -> Result<Self> {
        let expected = encoded_size(dimension);
        if bytes.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes, dimension })
    }

    /// Number of codes.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Raw record bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Signed 8-bit codes, one per original dimension.
    #[must_use]
    pub fn codes(&self) -> Vec<i8> {
        self.bytes[..self.dimension]
            .iter()
            .map(|&b| i8::from_le_bytes([b]))
            .collect()
    }

    /// Code at `index`, or `None` past the end.
    #[must_use]
    pub fn code(&self, index: usize) -> Option<i8> {
        if index < self.dimension {
            Some(i8::from_le_bytes([self.bytes[index]]))
        } else {
            None
        }
    }

    /// Trailing metadata record.
    #[must_use]
    pub fn metadata(&self) -> RqMetadata {
        let mut raw = [0u8; RqMetadata::SIZE];
        raw.copy_from_slice(&self.bytes[self.dimension..]);
        RqMetadata::from_le_bytes(&raw)
    }

    /// Approximate rotated-domain values, `l_x + code * delta_x`.
    #[must_use]
    pub fn decode(&self) -> Vec<f32> {
        let meta = self.metadata();
        self.bytes[..self.dimension]
            .iter()
            .map(|&b| meta.decode(i8::from_le_bytes([b])))
            .collect()
    }
}
