//! Process-wide pool of scratch byte buffers.
//!
//! Buffers are handed out through [`BufferPool::lease`], whose guard returns
//! the buffer on drop. The guard also runs while unwinding, so a panicking
//! caller never leaks a lease.

use std::ops::DerefMut;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use crossbeam_channel::{Receiver, Sender};

/// Number of idle buffers kept by [`BufferPool::new`].
pub const DEFAULT_MAX_POOLED: usize = 32;

/// Buffers with a larger capacity are freed instead of pooled.
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1024 * 1024; // 1 MiB

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers currently out on lease.
    pub leased: usize,
    /// Idle buffers ready for reuse.
    pub pooled: usize,
    /// Buffers allocated because the pool was empty.
    pub allocated: usize,
}

#[derive(Debug)]
pub struct BufferPool {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    max_retained_capacity: usize,
    leased: AtomicUsize,
    allocated: AtomicUsize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_POOLED, DEFAULT_MAX_RETAINED_CAPACITY)
    }

    pub fn with_limits(max_pooled: usize, max_retained_capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(max_pooled);
        Self {
            tx,
            rx,
            max_retained_capacity,
            leased: AtomicUsize::new(0),
            allocated: AtomicUsize::new(0),
        }
    }

    pub fn global() -> &'static BufferPool {
        static POOL: OnceLock<BufferPool> = OnceLock::new();
        POOL.get_or_init(BufferPool::new)
    }

    /// Borrows a zero-filled buffer of exactly `len` bytes.
    pub fn lease(&self, len: usize) -> impl DerefMut<Target = Vec<u8>> + '_ {
        let buf = self.acquire(len);
        scopeguard::guard(buf, move |buf| self.release(buf))
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            leased: self.leased.load(Ordering::Acquire),
            pooled: self.rx.len(),
            allocated: self.allocated.load(Ordering::Relaxed),
        }
    }

    fn acquire(&self, len: usize) -> Vec<u8> {
        let mut buf = match self.rx.try_recv() {
            Ok(buf) => buf,
            Err(_) => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                log::trace!("pool empty, allocating {} bytes", len);
                Vec::with_capacity(len)
            }
        };
        buf.resize(len, 0);
        self.leased.fetch_add(1, Ordering::AcqRel);
        buf
    }

    fn release(&self, mut buf: Vec<u8>) {
        self.leased.fetch_sub(1, Ordering::AcqRel);
        if buf.capacity() > self.max_retained_capacity {
            log::trace!("dropping oversized buffer of {} bytes", buf.capacity());
            return;
        }

        buf.clear();
        // a full pool simply frees the buffer
        let _ = self.tx.try_send(buf);
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
