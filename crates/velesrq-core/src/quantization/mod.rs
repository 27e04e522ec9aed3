//! Rotated 8-bit scalar quantization (RQ) for compact ANN vector storage.
//!
//! Each vector is rotated with a seeded [`FastRotation`](crate::rotation::FastRotation),
//! then quantized to one signed byte per dimension plus a 16-byte metadata record.
//!
//! ## Footprint
//!
//! | Dimension | f32 | RQ (codes + metadata) |
//! |-----------|-----|-----------------------|
//! | 128 (SIFT) | 512 bytes | 144 bytes |
//! | 768 | 3 KB | 784 bytes |
//! | 960 (GIST) | 3840 bytes | 976 bytes |

mod batch;
mod encoder;
mod metadata;
mod packed;
mod scratch;

pub use encoder::{encoded_size, RqEncoder, EPS, MAX_DIMENSION};
pub use metadata::RqMetadata;
pub use packed::PackedVector;
pub use scratch::RotationScratch;
