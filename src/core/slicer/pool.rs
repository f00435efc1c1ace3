//! Reusable slice buffers shared by all hashing workers.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Largest buffer the pool will hand out (1 GiB)
pub const MAX_BUFFER_SIZE: usize = 1 << 30;

/// Default number of idle buffers kept for reuse
pub const DEFAULT_MAX_IDLE: usize = 256;

/// A pool of byte buffers sized for slice reads.
///
/// Only buffers of the canonical size are recycled; any other size is
/// allocated on demand and freed on release. The pool is safe to share
/// between threads and never blocks: an empty pool allocates, a full
/// pool drops.
#[derive(Debug)]
pub struct BufferPool {
    recycler: Sender<Vec<u8>>,
    receiver: Receiver<Vec<u8>>,
    canonical_size: usize,
    allocated: AtomicUsize,
    recycled: AtomicUsize,
    discarded: AtomicUsize,
}

/// Point-in-time pool counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolMetrics {
    /// Buffers allocated because none could be reused
    pub allocated: usize,
    /// Acquisitions served from the pool
    pub recycled: usize,
    /// Releases that were not kept (wrong size or pool full)
    pub discarded: usize,
}

impl BufferPool {
    /// Create a pool recycling buffers of `canonical_size` bytes, keeping at
    /// most `max_idle` of them.
    pub fn new(canonical_size: usize, max_idle: usize) -> Self {
        let (recycler, receiver) = bounded(max_idle.max(1));
        Self {
            recycler,
            receiver,
            canonical_size,
            allocated: AtomicUsize::new(0),
            recycled: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    /// Size of the buffers this pool recycles
    pub fn canonical_size(&self) -> usize {
        self.canonical_size
    }

    /// Get a buffer of exactly `size` bytes.
    ///
    /// Returns `None` if `size` exceeds [`MAX_BUFFER_SIZE`]. The buffer goes
    /// back to the pool when the guard is dropped.
    pub fn acquire(&self, size: usize) -> Option<PooledBuffer<'_>> {
        if size > MAX_BUFFER_SIZE {
            return None;
        }

        let buffer = if size == self.canonical_size {
            match self.receiver.try_recv() {
                Ok(buffer) => {
                    self.recycled.fetch_add(1, Ordering::Relaxed);
                    buffer
                }
                Err(_) => self.allocate(size),
            }
        } else {
            self.allocate(size)
        };

        Some(PooledBuffer {
            pool: self,
            buffer: Some(buffer),
        })
    }

    /// Return a buffer to the pool.
    ///
    /// Kept only when its capacity is the canonical size and the pool has
    /// room; otherwise it is freed.
    pub fn release(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() != self.canonical_size {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        buffer.resize(self.canonical_size, 0);
        if self.recycler.try_send(buffer).is_err() {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of idle buffers waiting for reuse
    pub fn idle(&self) -> usize {
        self.receiver.len()
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            allocated: self.allocated.load(Ordering::Relaxed),
            recycled: self.recycled.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }

    fn allocate(&self, size: usize) -> Vec<u8> {
        self.allocated.fetch_add(1, Ordering::Relaxed);
        vec![0u8; size]
    }
}

/// A buffer on loan from a [`BufferPool`]
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buffer: Option<Vec<u8>>,
}

impl PooledBuffer<'_> {
    /// Take the buffer out of the guard without returning it to the pool
    pub fn into_inner(mut self) -> Vec<u8> {
        self.buffer.take().unwrap_or_default()
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buffer.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buffer.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.release(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn acquire_returns_exact_size() {
        let pool = BufferPool::new(8192, 4);
        assert_eq!(pool.acquire(8192).unwrap().len(), 8192);
        assert_eq!(pool.acquire(100).unwrap().len(), 100);
        assert_eq!(pool.acquire(0).unwrap().len(), 0);
    }

    #[test]
    fn oversized_request_is_refused() {
        let pool = BufferPool::new(8192, 4);
        assert!(pool.acquire(MAX_BUFFER_SIZE + 1).is_none());
    }

    #[test]
    fn canonical_buffers_are_reused() {
        let pool = BufferPool::new(1024, 4);
        drop(pool.acquire(1024).unwrap());
        assert_eq!(pool.idle(), 1);

        let _again = pool.acquire(1024).unwrap();
        let metrics = pool.metrics();
        assert_eq!(metrics.allocated, 1);
        assert_eq!(metrics.recycled, 1);
    }

    #[test]
    fn non_canonical_buffers_are_not_pooled() {
        let pool = BufferPool::new(1024, 4);
        drop(pool.acquire(2048).unwrap());
        pool.release(Vec::with_capacity(10));
        assert_eq!(pool.idle(), 0);
        assert_eq!(pool.metrics().discarded, 2);
    }

    #[test]
    fn full_pool_discards_extra_buffers() {
        let pool = BufferPool::new(64, 1);
        let first = pool.acquire(64).unwrap();
        let second = pool.acquire(64).unwrap();
        drop(first);
        drop(second);
        assert_eq!(pool.idle(), 1);
        assert_eq!(pool.metrics().discarded, 1);
    }

    #[test]
    fn into_inner_keeps_buffer_out_of_pool() {
        let pool = BufferPool::new(64, 4);
        let buffer = pool.acquire(64).unwrap().into_inner();
        assert_eq!(buffer.len(), 64);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn concurrent_use_never_shares_a_buffer() {
        let pool = BufferPool::new(4096, 8);

        thread::scope(|scope| {
            for worker in 0..16u8 {
                let pool = &pool;
                scope.spawn(move || {
                    for round in 0..200u32 {
                        let mut buffer = pool.acquire(4096).unwrap();
                        let marker = worker.wrapping_add(round as u8);
                        buffer.fill(marker);
                        thread::yield_now();
                        assert!(buffer.iter().all(|&b| b == marker));
                    }
                });
            }
        });

        let metrics = pool.metrics();
        assert_eq!(metrics.allocated + metrics.recycled, 16 * 200);
        assert!(pool.idle() <= 8);
    }
}
