//! Per-call scratch buffers for the rotate-then-quantize pipeline.
//!
//! `ScratchPool` hands out private `RotationScratch` buffers across a few
//! mutex-guarded shards, so concurrent `encode` calls on one encoder never share
//! working memory. A checked-out buffer returns to its shard on drop.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default shard count for [`ScratchPool`].
pub(crate) const DEFAULT_SHARDS: usize = 8;

/// Maximum idle buffers kept per shard.
const MAX_IDLE_PER_SHARD: usize = 4;

/// Working memory for one encode call: the rotated vector and the permutation
/// swap buffer, both `padded_dimension` long.
#[derive(Debug, Clone, Default)]
pub struct RotationScratch {
    pub(crate) work: Vec<f32>,
    pub(crate) swap: Vec<f32>,
}

impl RotationScratch {
    /// Allocates zeroed buffers for `padded_dim` components.
    #[must_use]
    pub fn new(padded_dim: usize) -> Self {
        Self {
            work: vec![0.0; padded_dim],
            swap: vec![0.0; padded_dim],
        }
    }

    /// Length of each buffer.
    #[must_use]
    pub fn padded_dimension(&self) -> usize {
        self.work.len()
    }

    /// Whether both buffers have the expected length.
    pub(crate) fn fits(&self, padded_dim: usize) -> bool {
        self.work.len() == padded_dim && self.swap.len() == padded_dim
    }
}

/// Sharded pool of [`RotationScratch`] buffers for one padded dimension.
pub(crate) struct ScratchPool {
    shards: Vec<Mutex<Vec<RotationScratch>>>,
    padded_dim: usize,
    next_shard: AtomicUsize,
}

impl ScratchPool {
    pub(crate) fn new(num_shards: usize, padded_dim: usize) -> Self {
        let num_shards = num_shards.max(1);
        Self {
            shards: (0..num_shards).map(|_| Mutex::new(Vec::new())).collect(),
            padded_dim,
            next_shard: AtomicUsize::new(0),
        }
    }

    /// Takes an idle buffer from the next shard, allocating one if it is empty.
    pub(crate) fn checkout(&self) -> PooledScratch<'_> {
        let shard = self.next_shard.fetch_add(1, Ordering::Relaxed) % self.shards.len();
        let scratch = self.shards[shard]
            .lock()
            .pop()
            .unwrap_or_else(|| RotationScratch::new(self.padded_dim));
        PooledScratch {
            pool: self,
            shard,
            scratch,
        }
    }

    /// Number of idle buffers across all shards.
    #[cfg(test)]
    pub(crate) fn idle_count(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    fn check_in(&self, shard: usize, scratch: RotationScratch) {
        if !scratch.fits(self.padded_dim) {
            return;
        }
        let mut idle = self.shards[shard].lock();
        if idle.len() < MAX_IDLE_PER_SHARD {
            idle.push(scratch);
        }
    }
}

impl Clone for ScratchPool {
    /// Clones get their own, initially empty, shards.
    fn clone(&self) -> Self {
        Self::new(self.shards.len(), self.padded_dim)
    }
}

impl std::fmt::Debug for ScratchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchPool")
            .field("shards", &self.shards.len())
            .field("padded_dim", &self.padded_dim)
            .finish_non_exhaustive()
    }
}

/// A scratch buffer checked out of a [`ScratchPool`]; returned on drop.
pub(crate) struct PooledScratch<'a> {
    pool: &'a ScratchPool,
    shard: usize,
    scratch: RotationScratch,
}

impl Deref for PooledScratch<'_> {
    type Target = RotationScratch;

    fn deref(&self) -> &Self::Target {
        &self.scratch
    }
}

impl DerefMut for PooledScratch<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.scratch
    }
}

impl Drop for PooledScratch<'_> {
    fn drop(&mut self) {
        let scratch = std::mem::take(&mut self.scratch);
        self.pool.check_in(self.shard, scratch);
    }
}

// Compile-time check: ScratchPool must be Send + Sync
// Reason: Compile-time assertion for Send + Sync bounds verification
#[allow(dead_code)]
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ScratchPool>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_allocates_padded_buffers() {
        let pool = ScratchPool::new(2, 64);
        let scratch = pool.checkout();
        assert_eq!(scratch.padded_dimension(), 64);
        assert_eq!(scratch.swap.len(), 64);
    }

    #[test]
    fn test_buffer_returns_on_drop() {
        let pool = ScratchPool::new(1, 32);
        assert_eq!(pool.idle_count(), 0);
        {
            let _a = pool.checkout();
            let _b = pool.checkout();
            assert_eq!(pool.idle_count(), 0);
        }
        assert_eq!(pool.idle_count(), 2);

        let _c = pool.checkout();
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_concurrent_checkouts_are_distinct() {
        let pool = ScratchPool::new(1, 32);
        let mut a = pool.checkout();
        let mut b = pool.checkout();
        a.work[0] = 1.0;
        b.work[0] = 2.0;
        assert_eq!(a.work[0], 1.0);
        assert_eq!(b.work[0], 2.0);
        assert_ne!(a.work.as_ptr(), b.work.as_ptr());
    }

    #[test]
    fn test_idle_buffers_are_capped() {
        let pool = ScratchPool::new(1, 32);
        let held: Vec<_> = (0..MAX_IDLE_PER_SHARD + 3).map(|_| pool.checkout()).collect();
        drop(held);
        assert_eq!(pool.idle_count(), MAX_IDLE_PER_SHARD);
    }

    #[test]
    fn test_wrong_sized_buffer_is_discarded() {
        let pool = ScratchPool::new(1, 32);
        pool.check_in(0, RotationScratch::new(16));
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_clone_starts_empty() {
        let pool = ScratchPool::new(3, 32);
        drop(pool.checkout());
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.clone().idle_count(), 0);
    }
}
