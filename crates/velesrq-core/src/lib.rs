//! # `VelesRQ` Core
//!
//! Rotated 8-bit scalar quantization (RQ) for approximate nearest neighbor search.
//!
//! A float embedding is mixed by a seeded fast rotation (sign flips, blocked
//! Walsh-Hadamard transforms, global permutations) and then quantized to one
//! signed byte per dimension. The result is a fixed-size packed record:
//!
//! ```text
//! [ codes: d × i8 ][ l_x: f32 ][ delta_x: f32 ][ norm_sq: f32 ][ code_sum: i32 ]
//! ```
//!
//! all little-endian, `d + 16` bytes in total.
//!
//! ## Quick Start
//!
//! ```rust
//! use velesrq_core::{PackedVector, RqEncoder};
//!
//! fn main() -> Result<(), velesrq_core::Error> {
//!     // Documents and queries must use the same (dimension, seed)
//!     let encoder = RqEncoder::new(128, 42)?;
//!
//!     let embedding = vec![0.25_f32; 128];
//!     let packed = encoder.encode(&embedding)?;
//!     assert_eq!(packed.len(), 128 + 16);
//!
//!     let view = PackedVector::new(&packed, 128)?;
//!     assert_eq!(view.metadata().code_sum, view.codes().iter().map(|&c| i32::from(c)).sum());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
// Clippy lints configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(
    test,
    allow(
        clippy::float_cmp,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )
)]

pub mod config;
pub mod error;
pub mod fvecs;
pub mod quantization;
pub mod rotation;

pub use config::EncoderConfig;
pub use error::{Error, Result};
pub use fvecs::FvecsReader;
pub use quantization::{
    encoded_size, PackedVector, RotationScratch, RqEncoder, RqMetadata, EPS, MAX_DIMENSION,
};
pub use rotation::{padded_dimension, FastRotation, BLOCK_SIZE, NUM_ROUNDS};
