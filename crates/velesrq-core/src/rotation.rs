//! Seeded fast pseudo-random rotation.
//!
//! A dense random rotation costs O(d²) per vector. `FastRotation` approximates
//! it with [`NUM_ROUNDS`] rounds of:
//!
//! 1. a random sign flip per coordinate,
//! 2. a normalized Walsh-Hadamard transform on each [`BLOCK_SIZE`]-wide block,
//! 3. a global permutation of the whole padded vector.
//!
//! The permutation is what carries energy across block boundaries, so after a
//! few rounds every output coordinate depends on coordinates from other blocks.
//! Total cost is O(d · log2(BLOCK_SIZE)) per round.
//!
//! # Determinism
//!
//! Round parameters are drawn from `ChaCha20Rng::seed_from_u64(seed)`, which is
//! value-stable across platforms. For every round, `padded_dim` sign bits are
//! drawn first, then the identity permutation is shuffled with the same stream.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::{Error, Result};

/// Width of the block-local Walsh-Hadamard transform.
pub const BLOCK_SIZE: usize = 32;

/// Number of sign/transform/permute rounds.
pub const NUM_ROUNDS: usize = 3;

/// Rounds `dimension` up to the next multiple of [`BLOCK_SIZE`].
#[must_use]
pub fn padded_dimension(dimension: usize) -> usize {
    dimension.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// Blocked FWHT rotation with seed-derived sign flips and permutations.
///
/// Read-only after construction: `rotate_into` only touches caller buffers, so
/// one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct FastRotation {
    dimension: usize,
    padded_dim: usize,
    seed: u64,
    /// `NUM_ROUNDS * padded_dim` entries, each +1.0 or -1.0.
    signs: Vec<f32>,
    /// `NUM_ROUNDS * padded_dim` entries, one permutation of `0..padded_dim` per round.
    permutation: Vec<usize>,
}

impl FastRotation {
    /// Builds the rotation for `dimension` and derives every round parameter from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if `dimension` is zero or does not fit in a `u32`.
    pub fn new(dimension: usize, seed: u64) -> Result<Self> {
        if dimension == 0 || u32::try_from(dimension).is_err() {
            return Err(Error::InvalidDimension(dimension));
        }

        let padded_dim = padded_dimension(dimension);
        let (signs, permutation) = Self::derive_parameters(padded_dim, seed);

        tracing::debug!(
            dimension,
            padded_dim,
            seed,
            rounds = NUM_ROUNDS,
            "FastRotation initialized"
        );

        Ok(Self {
            dimension,
            padded_dim,
            seed,
            signs,
            permutation,
        })
    }

    fn derive_parameters(padded_dim: usize, seed: u64) -> (Vec<f32>, Vec<usize>) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut signs = Vec::with_capacity(NUM_ROUNDS * padded_dim);
        let mut permutation = Vec::with_capacity(NUM_ROUNDS * padded_dim);

        for _ in 0..NUM_ROUNDS {
            signs.extend((0..padded_dim).map(|_| if rng.gen::<bool>() { 1.0 } else { -1.0 }));

            let start = permutation.len();
            permutation.extend(0..padded_dim);
            permutation[start..].shuffle(&mut rng);
        }

        (signs, permutation)
    }

    /// Original (unpadded) dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Working dimension, a multiple of [`BLOCK_SIZE`].
    #[must_use]
    pub fn padded_dimension(&self) -> usize {
        self.padded_dim
    }

    /// Seed the round parameters were derived from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rotates `input` into a freshly allocated `padded_dimension()`-long vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `input.len() != dimension()`.
    pub fn rotate(&self, input: &[f32]) -> Result<Vec<f32>> {
        let mut output = vec![0.0; self.padded_dim];
        let mut swap = vec![0.0; self.padded_dim];
        self.rotate_into(input, &mut output, &mut swap)?;
        Ok(output)
    }

    /// Rotates `input` into `output`, using `swap` as the permutation buffer.
    ///
    /// Both buffers must be exactly `padded_dimension()` long. Their previous
    /// contents are irrelevant: `output` is overwritten and zero-padded.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `input.len() != dimension()`
    /// - [`Error::BufferSize`] if either buffer has the wrong length
    pub fn rotate_into(&self, input: &[f32], output: &mut [f32], swap: &mut [f32]) -> Result<()> {
        if input.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: input.len(),
            });
        }
        for len in [output.len(), swap.len()] {
            if len != self.padded_dim {
                return Err(Error::BufferSize {
                    expected: self.padded_dim,
                    actual: len,
                });
            }
        }

        output[..self.dimension].copy_from_slice(input);
        output[self.dimension..].fill(0.0);

        for round in 0..NUM_ROUNDS {
            self.apply_round(output, swap, round);
        }
        Ok(())
    }

    fn apply_round(&self, data: &mut [f32], swap: &mut [f32], round: usize) {
        for (x, &sign) in data.iter_mut().zip(self.round_signs(round)) {
            *x *= sign;
        }

        for block in data.chunks_exact_mut(BLOCK_SIZE) {
            fwht_block(block);
        }

        swap.copy_from_slice(data);
        for (&value, &target) in swap.iter().zip(self.round_permutation(round)) {
            data[target] = value;
        }
    }

    fn round_signs(&self, round: usize) -> &[f32] {
        let start = round * self.padded_dim;
        &self.signs[start..start + self.padded_dim]
    }

    fn round_permutation(&self, round: usize) -> &[usize] {
        let start = round * self.padded_dim;
        &self.permutation[start..start + self.padded_dim]
    }
}

/// In-place orthonormal Walsh-Hadamard transform of one power-of-two block.
fn fwht_block(block: &mut [f32]) {
    debug_assert!(block.len().is_power_of_two());

    let mut half = 1;
    while half < block.len() {
        for pair in block.chunks_exact_mut(half * 2) {
            let (lo, hi) = pair.split_at_mut(half);
            for (x, y) in lo.iter_mut().zip(hi.iter_mut()) {
                let (a, b) = (*x, *y);
                *x = a + b;
                *y = a - b;
            }
        }
        half *= 2;
    }

    // Reason: block length is BLOCK_SIZE (32), exactly representable in f32
    #[allow(clippy::cast_precision_loss)]
    let scale = (block.len() as f32).sqrt().recip();
    for x in block.iter_mut() {
        *x *= scale;
    }
}

// Compile-time check: FastRotation must be Send + Sync
// Reason: Compile-time assertion for Send + Sync bounds verification
#[allow(dead_code)]
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FastRotation>();
};

#[cfg(test)]
#[path = "rotation_tests.rs"]
mod tests;
