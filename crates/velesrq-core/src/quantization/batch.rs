//! Batch encoding.
//!
//! Vectors are independent, so with the `parallel` feature the batch is spread
//! over the rayon thread pool. Output order always matches input order.

use crate::error::Result;

use super::encoder::RqEncoder;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

impl RqEncoder {
    /// Encodes every vector in `inputs`, preserving order.
    ///
    /// Fails on the first vector with the wrong dimension.
    #[cfg(feature = "parallel")]
    pub fn encode_batch<V>(&self, inputs: &[V]) -> Result<Vec<Vec<u8>>>
    where
        V: AsRef<[f32]> + Sync,
    {
        inputs
            .par_iter()
            .map_init(
                || self.new_scratch(),
                |scratch, input| {
                    let mut out = vec![0u8; self.encoded_size()];
                    self.encode_with_scratch(input.as_ref(), scratch, &mut out)?;
                    Ok(out)
                },
            )
            .collect()
    }

    /// Encodes every vector in `inputs`, preserving order.
    ///
    /// Fails on the first vector with the wrong dimension.
    #[cfg(not(feature = "parallel"))]
    pub fn encode_batch<V>(&self, inputs: &[V]) -> Result<Vec<Vec<u8>>>
    where
        V: AsRef<[f32]>,
    {
        let mut scratch = self.new_scratch();
        inputs
            .iter()
            .map(|input| {
                let mut out = vec![0u8; self.encoded_size()];
                self.encode_with_scratch(input.as_ref(), &mut scratch, &mut out)?;
                Ok(out)
            })
            .collect()
    }
}
