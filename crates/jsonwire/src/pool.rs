//! Shared pool of scratch vectors used by container decoding.
//!
//! A decode loop rents a [`PooledVec`] sized for a typical collection, pushes
//! elements into it (the guard doubles its capacity by renting a larger buffer
//! and returning the old one), and finally moves the elements into an
//! exactly-sized result. The guard hands its buffer back on drop, so every
//! checkout is returned exactly once on every exit path, errors and unwinding
//! included.
//!
//! Buffers are bucketed by element type and power-of-two capacity class. A
//! checkout pops from its bucket under the bucket's lock, so no buffer is
//! ever handed out twice.

use std::{
    any::{Any, TypeId, type_name},
    mem,
    sync::{
        Arc, Mutex, OnceLock, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashMap;

use crate::error::Error;

/// Limits on what a [`ScratchPool`] retains between checkouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchPoolConfig {
    /// Buffers kept per (element type, capacity class) bucket.
    ///
    /// # Default
    ///
    /// `8`
    pub max_retained_per_bucket: usize,

    /// Buffers whose capacity in bytes exceeds this are freed instead of
    /// retained.
    ///
    /// # Default
    ///
    /// `1 MiB`
    pub max_retained_bytes: usize,
}

impl Default for ScratchPoolConfig {
    fn default() -> Self {
        Self {
            max_retained_per_bucket: 8,
            max_retained_bytes: 1 << 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BucketKey {
    element: TypeId,
    class: u32,
}

/// Idle buffers of one class. Each entry is a cleared `Vec<T>`.
type Bucket = Mutex<Vec<Box<dyn Any + Send>>>;

/// Checkout counters of a [`ScratchPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Buffers handed out, including the larger buffers rented during growth.
    pub rented: u64,
    /// Buffers handed back.
    pub returned: u64,
    /// Buffers that had to be freshly allocated.
    pub allocated: u64,
}

impl PoolStats {
    /// Checkouts not yet returned.
    ///
    /// Saturates at zero for hand-built or inconsistent stats.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.rented.saturating_sub(self.returned)
    }
}

#[derive(Debug)]
pub struct ScratchPool {
    buckets: DashMap<BucketKey, Bucket, ahash::RandomState>,
    config: ScratchPoolConfig,
    rented: AtomicU64,
    returned: AtomicU64,
    allocated: AtomicU64,
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(ScratchPoolConfig::default())
    }
}

impl ScratchPool {
    #[must_use]
    pub fn new(config: ScratchPoolConfig) -> Self {
        Self {
            buckets: DashMap::with_hasher(ahash::RandomState::new()),
            config,
            rented: AtomicU64::new(0),
            returned: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
        }
    }

    /// The process-wide pool used by default options.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<ScratchPool>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::default())))
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        // Every return follows its rent, so loading `returned` first keeps
        // `rented >= returned` within one snapshot.
        let returned = self.returned.load(Ordering::Acquire);
        PoolStats {
            rented: self.rented.load(Ordering::Acquire),
            returned,
            allocated: self.allocated.load(Ordering::Acquire),
        }
    }

    /// Number of idle buffers currently held.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Checks out an empty vector with capacity for at least `min_capacity`
    /// elements.
    ///
    /// # Errors
    ///
    /// [`Error::Resource`] if a fresh buffer cannot be allocated.
    pub fn rent<T: Send + 'static>(&self, min_capacity: usize) -> Result<PooledVec<'_, T>, Error> {
        let buf = self.take(min_capacity)?;
        Ok(PooledVec { pool: self, buf })
    }

    fn take<T: Send + 'static>(&self, min_capacity: usize) -> Result<Vec<T>, Error> {
        let class = capacity_class(min_capacity);
        let key = BucketKey {
            element: TypeId::of::<T>(),
            class,
        };
        let reused = self
            .buckets
            .get(&key)
            .and_then(|bucket| bucket.lock().unwrap_or_else(PoisonError::into_inner).pop())
            .and_then(|boxed| boxed.downcast::<Vec<T>>().ok());

        let buf = if let Some(buf) = reused {
            *buf
        } else {
            let mut buf = Vec::new();
            buf.try_reserve_exact(1 << class)?;
            self.allocated.fetch_add(1, Ordering::AcqRel);
            tracing::debug!(
                element = type_name::<T>(),
                capacity = buf.capacity(),
                "allocated scratch buffer"
            );
            buf
        };
        self.rented.fetch_add(1, Ordering::AcqRel);
        Ok(buf)
    }

    fn give_back<T: Send + 'static>(&self, mut buf: Vec<T>) {
        self.returned.fetch_add(1, Ordering::AcqRel);
        buf.clear();

        let capacity = buf.capacity();
        let bytes = capacity.saturating_mul(mem::size_of::<T>());
        if capacity == 0 || bytes > self.config.max_retained_bytes {
            tracing::debug!(
                element = type_name::<T>(),
                capacity,
                "dropping scratch buffer instead of retaining it"
            );
            return;
        }

        // Floor class, so a bucket only ever holds buffers at least as large as
        // its class promises.
        let key = BucketKey {
            element: TypeId::of::<T>(),
            class: capacity.ilog2(),
        };
        let bucket = self.buckets.entry(key).or_default();
        let mut idle = bucket.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.config.max_retained_per_bucket {
            idle.push(Box::new(buf));
        }
    }
}

/// Smallest power-of-two class holding `min_capacity` elements.
fn capacity_class(min_capacity: usize) -> u32 {
    min_capacity.max(1).next_power_of_two().ilog2()
}

/// A scratch vector checked out of a [`ScratchPool`].
///
/// Returned to the pool when dropped.
#[derive(Debug)]
pub struct PooledVec<'p, T: Send + 'static> {
    pool: &'p ScratchPool,
    buf: Vec<T>,
}

impl<T: Send + 'static> PooledVec<'_, T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.buf
    }

    /// Appends `value`, doubling the scratch capacity first if it is full.
    ///
    /// # Errors
    ///
    /// [`Error::Resource`] if the larger buffer cannot be allocated.
    pub fn push(&mut self, value: T) -> Result<(), Error> {
        if self.buf.len() == self.buf.capacity() {
            self.grow()?;
        }
        self.buf.push(value);
        Ok(())
    }

    #[cold]
    fn grow(&mut self) -> Result<(), Error> {
        let mut next = self.pool.take::<T>(self.buf.capacity().max(1) * 2)?;
        next.append(&mut self.buf);
        tracing::trace!(
            element = type_name::<T>(),
            len = next.len(),
            capacity = next.capacity(),
            "grew scratch buffer"
        );
        let old = mem::replace(&mut self.buf, next);
        self.pool.give_back(old);
        Ok(())
    }

    /// Moves the elements into a vector of exactly `len()` capacity.
    ///
    /// # Errors
    ///
    /// [`Error::Resource`] if the result cannot be allocated.
    pub fn to_exact_vec(&mut self) -> Result<Vec<T>, Error> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.buf.len())?;
        out.append(&mut self.buf);
        Ok(out)
    }

    /// Removes every element, leaving the buffer checked out.
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.buf.drain(..)
    }
}

impl<T: Send + 'static> Drop for PooledVec<'_, T> {
    fn drop(&mut self) {
        let buf = mem::take(&mut self.buf);
        self.pool.give_back(buf);
    }
}
