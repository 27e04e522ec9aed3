//! Fixed 16-byte reconstruction metadata appended to every packed RQ record.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-vector reconstruction metadata.
///
/// Serialized as four little-endian fields with no padding, in this order:
///
/// | offset | field | type |
/// |--------|-------|------|
/// | 0 | `l_x` | f32 |
/// | 4 | `delta_x` | f32 |
/// | 8 | `norm_sq` | f32 |
/// | 12 | `code_sum` | i32 |
///
/// A rotated component is reconstructed as `l_x + code * delta_x`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RqMetadata {
    /// Rotated-domain value that decodes to code 0 (`min + 128 * delta`).
    pub l_x: f32,
    /// Quantization step size.
    pub delta_x: f32,
    /// Squared L2 norm of the original, unrotated input.
    pub norm_sq: f32,
    /// Exact signed sum of the emitted codes.
    pub code_sum: i32,
}

impl RqMetadata {
    /// Serialized size in bytes.
    pub const SIZE: usize = 16;

    /// Serializes to the little-endian wire layout.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.l_x.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.delta_x.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.norm_sq.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.code_sum.to_le_bytes());
        bytes
    }

    /// Deserializes from the little-endian wire layout.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let field = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        Self {
            l_x: f32::from_le_bytes(field(0)),
            delta_x: f32::from_le_bytes(field(4)),
            norm_sq: f32::from_le_bytes(field(8)),
            code_sum: i32::from_le_bytes(field(12)),
        }
    }

    /// Writes the record into the first [`Self::SIZE`] bytes of `out`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `out` is shorter than [`Self::SIZE`].
    pub fn write_to(&self, out: &mut [u8]) -> Result<()> {
        let Some(record) = out.get_mut(..Self::SIZE) else {
            return Err(Error::BufferSize {
                expected: Self::SIZE,
                actual: out.len(),
            });
        };
        record.copy_from_slice(&self.to_le_bytes());
        Ok(())
    }

    /// Reconstructs the rotated-domain value for one code.
    #[must_use]
    pub fn decode(&self, code: i8) -> f32 {
        self.l_x + f32::from(code) * self.delta_x
    }
}
