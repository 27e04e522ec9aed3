//! Rotated 8-bit scalar quantization (RQ) encoder.
//!
//! Pipeline per vector:
//!
//! 1. `norm_sq` of the original input, accumulated in f64
//! 2. [`FastRotation`] into a padded working buffer (unless rotation is skipped)
//! 3. min/max over the first `dimension` rotated components
//! 4. uniform quantization to signed 8-bit codes in `[-128, 127]`
//! 5. packing as `[codes: dimension bytes][RqMetadata: 16 bytes]`

use crate::config::EncoderConfig;
use crate::error::{Error, Result};
use crate::rotation::FastRotation;

use super::metadata::RqMetadata;
use super::scratch::{RotationScratch, ScratchPool, DEFAULT_SHARDS};

/// Lower bound on the quantization step, keeps constant vectors well-defined.
pub const EPS: f32 = 1e-6;

/// Number of quantization levels minus one (codes span 256 values).
const LEVELS: f32 = 255.0;

/// Offset from `min` to the value that decodes to code 0.
const ZERO_CODE_OFFSET: f32 = 128.0;

/// Largest dimension whose code sum always fits in an `i32` (`i32::MAX / 128`).
pub const MAX_DIMENSION: usize = 16_777_215;

/// Size in bytes of a packed record for `dimension`: codes plus metadata.
#[must_use]
pub const fn encoded_size(dimension: usize) -> usize {
    dimension + RqMetadata::SIZE
}

/// RQ encoder for one `(dimension, seed)` pair.
///
/// Immutable after construction. Every call works in its own scratch buffer,
/// either checked out of an internal pool or supplied by the caller, so an
/// encoder can be shared behind an `Arc` and used from many threads.
///
/// # Example
///
/// ```
/// use velesrq_core::RqEncoder;
///
/// let encoder = RqEncoder::new(4, 42)?;
/// let packed = encoder.encode(&[1.0, 2.0, 3.0, 4.0])?;
/// assert_eq!(packed.len(), encoder.encoded_size());
/// # Ok::<(), velesrq_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RqEncoder {
    dimension: usize,
    rotation: FastRotation,
    skip_rotation: bool,
    pool: ScratchPool,
}

impl RqEncoder {
    /// Creates an encoder that rotates before quantizing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if `dimension` is 0 or above [`MAX_DIMENSION`].
    pub fn new(dimension: usize, seed: u64) -> Result<Self> {
        Self::with_skip_rotation(dimension, seed, false)
    }

    /// Creates an encoder, optionally bypassing the rotation step.
    ///
    /// Skipping rotation is meant for benchmarking the effect of the rotation;
    /// the packed layout is identical either way.
    pub fn with_skip_rotation(dimension: usize, seed: u64, skip_rotation: bool) -> Result<Self> {
        if dimension == 0 || dimension > MAX_DIMENSION {
            return Err(Error::InvalidDimension(dimension));
        }

        let rotation = FastRotation::new(dimension, seed)?;
        let pool = ScratchPool::new(DEFAULT_SHARDS, rotation.padded_dimension());

        tracing::debug!(
            dimension,
            padded_dim = rotation.padded_dimension(),
            seed,
            skip_rotation,
            encoded_size = encoded_size(dimension),
            "RqEncoder initialized"
        );

        Ok(Self {
            dimension,
            rotation,
            skip_rotation,
            pool,
        })
    }

    /// Creates an encoder from a validated [`EncoderConfig`].
    pub fn from_config(config: &EncoderConfig) -> Result<Self> {
        config.validate()?;
        Self::with_skip_rotation(config.dimension, config.seed, config.skip_rotation)
    }

    /// Input vector dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Padded working dimension of the rotation.
    #[must_use]
    pub fn padded_dimension(&self) -> usize {
        self.rotation.padded_dimension()
    }

    /// Rotation seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.rotation.seed()
    }

    /// Whether the rotation step is bypassed.
    #[must_use]
    pub fn skip_rotation(&self) -> bool {
        self.skip_rotation
    }

    /// The underlying rotation.
    #[must_use]
    pub fn rotation(&self) -> &FastRotation {
        &self.rotation
    }

    /// Size in bytes of every packed record this encoder produces.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        encoded_size(self.dimension)
    }

    /// Allocates a scratch buffer suitable for [`Self::encode_with_scratch`].
    #[must_use]
    pub fn new_scratch(&self) -> RotationScratch {
        RotationScratch::new(self.padded_dimension())
    }

    /// Encodes `input` into a newly allocated packed record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `input.len() != dimension()`.
    pub fn encode(&self, input: &[f32]) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.encoded_size()];
        self.encode_into(input, &mut out)?;
        Ok(out)
    }

    /// Encodes `input` into `out` using a pooled scratch buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `input.len() != dimension()`
    /// - [`Error::BufferSize`] if `out.len() != encoded_size()`
    pub fn encode_into(&self, input: &[f32], out: &mut [u8]) -> Result<RqMetadata> {
        let mut scratch = self.pool.checkout();
        self.encode_with_scratch(input, &mut scratch, out)
    }

    /// Encodes `input` into `out` using caller-owned scratch memory.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `input.len() != dimension()`
    /// - [`Error::BufferSize`] if `out` or `scratch` has the wrong length
    pub fn encode_with_scratch(
        &self,
        input: &[f32],
        scratch: &mut RotationScratch,
        out: &mut [u8],
    ) -> Result<RqMetadata> {
        if input.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: input.len(),
            });
        }
        if out.len() != self.encoded_size() {
            return Err(Error::BufferSize {
                expected: self.encoded_size(),
                actual: out.len(),
            });
        }
        if !scratch.fits(self.padded_dimension()) {
            return Err(Error::BufferSize {
                expected: self.padded_dimension(),
                actual: scratch.padded_dimension(),
            });
        }

        // Must come from the unrotated input so rotation error never reaches it.
        let norm_sq = squared_norm(input);

        if self.skip_rotation {
            scratch.work[..self.dimension].copy_from_slice(input);
        } else {
            self.rotation
                .rotate_into(input, &mut scratch.work, &mut scratch.swap)?;
        }

        let (codes, meta_bytes) = out.split_at_mut(self.dimension);
        let meta = quantize(&scratch.work[..self.dimension], norm_sq, codes);
        meta.write_to(meta_bytes)?;
        Ok(meta)
    }

    /// Encodes `input` and returns the packed record as signed bytes.
    ///
    /// Metadata bytes are converted bit-for-bit, which is the form text
    /// payloads (JSON tensors, query URLs) carry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `input.len() != dimension()`.
    pub fn encode_as_i8(&self, input: &[f32]) -> Result<Vec<i8>> {
        Ok(self
            .encode(input)?
            .into_iter()
            .map(|b| i8::from_le_bytes([b]))
            .collect())
    }
}

/// Sum of squares in f64, narrowed to f32 for storage.
// Reason: metadata stores norm_sq as f32 by layout contract
#[allow(clippy::cast_possible_truncation)]
fn squared_norm(input: &[f32]) -> f32 {
    let sum: f64 = input.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    sum as f32
}

/// Quantizes `values` into `codes` and returns the matching metadata.
fn quantize(values: &[f32], norm_sq: f32, codes: &mut [u8]) -> RqMetadata {
    let (min_val, max_val) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });

    let delta = ((max_val - min_val) / LEVELS).max(EPS);
    let l_x = min_val + ZERO_CODE_OFFSET * delta;

    let mut code_sum = 0i32;
    for (slot, &x) in codes.iter_mut().zip(values) {
        let code = quantize_component(x, l_x, delta);
        code_sum += i32::from(code);
        *slot = code.to_le_bytes()[0];
    }

    RqMetadata {
        l_x,
        delta_x: delta,
        norm_sq,
        code_sum,
    }
}

// Reason: value is clamped to [-128.0, 127.0] before the cast
#[allow(clippy::cast_possible_truncation)]
#[inline]
fn quantize_component(x: f32, l_x: f32, delta: f32) -> i8 {
    let normalized = (x - l_x) / delta;
    normalized.round().clamp(-128.0, 127.0) as i8
}

// Compile-time check: RqEncoder must be Send + Sync
// Reason: Compile-time assertion for Send + Sync bounds verification
#[allow(dead_code)]
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RqEncoder>();
};

#[cfg(test)]
#[path = "encoder_tests.rs"]
mod tests;
