use std::fmt;

use parking_lot::Mutex;

use crate::logging::targets;

/// Pools hold at most this many idle values unless configured otherwise.
pub const DEFAULT_POOL_CAPACITY: usize = 32;

/// Values that can be recycled through an [`ObjectPool`].
pub trait Poolable: Send {
    /// Return the value to a fresh state. Called on release.
    fn reset(&mut self) {}
}

/// A bounded pool of reusable values.
///
/// [`acquire`](Self::acquire) hands out an idle value or builds a new one.
/// [`release`](Self::release) resets the value and keeps it while the pool
/// is below capacity; extras are dropped.
pub struct ObjectPool<T: Poolable> {
    idle: Mutex<Vec<T>>,
    capacity: usize,
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T: Poolable> ObjectPool<T> {
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY, factory)
    }

    pub fn with_capacity(capacity: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            factory: Box::new(factory),
        }
    }

    pub fn acquire(&self) -> T {
        let reused = self.idle.lock().pop();
        reused.unwrap_or_else(|| (self.factory)())
    }

    pub fn release(&self, mut value: T) {
        value.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(value);
        } else {
            drop(idle);
            tracing::trace!(target: targets::MEMORY, capacity = self.capacity, "pool full, dropping value");
        }
    }

    /// Idle values ready for reuse.
    pub fn available(&self) -> usize {
        self.idle.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.idle.lock().clear();
    }
}

impl<T: Poolable + Default + 'static> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new(T::default)
    }
}

impl<T: Poolable> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("available", &self.available())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Scratch {
        buffer: Vec<u8>,
        resets: usize,
    }

    impl Poolable for Scratch {
        fn reset(&mut self) {
            self.buffer.clear();
            self.resets += 1;
        }
    }

    #[test]
    fn test_release_resets_and_reuses() {
        let pool = ObjectPool::<Scratch>::default();
        assert_eq!(pool.capacity(), DEFAULT_POOL_CAPACITY);

        let mut scratch = pool.acquire();
        scratch.buffer.extend_from_slice(b"abc");
        pool.release(scratch);
        assert_eq!(pool.available(), 1);

        let reused = pool.acquire();
        assert!(reused.buffer.is_empty());
        assert_eq!(reused.resets, 1);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_extras_are_dropped() {
        let pool = ObjectPool::with_capacity(2, Scratch::default);
        for _ in 0..5 {
            pool.release(Scratch::default());
        }
        assert_eq!(pool.available(), 2);
        pool.clear();
        assert_eq!(pool.available(), 0);
    }
}
