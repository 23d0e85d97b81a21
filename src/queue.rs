//! Thread-safe blocking queue, the only primitive shared between the
//! kernel worker and its callers.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Unbounded multi-producer/multi-consumer queue. Clones share the same
/// underlying storage.
pub struct SyncQueue<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> SyncQueue<T> {
    pub fn new() -> Self {
        SyncQueue {
            inner: Arc::new(Inner {
                items: Mutex::new(VecDeque::new()),
                available: Condvar::new(),
            }),
        }
    }

    /// Enqueue a value and wake one blocked [`wait_pop`](Self::wait_pop).
    pub fn push(&self, value: T) {
        let mut items = self.inner.items.lock();
        items.push_back(value);
        self.inner.available.notify_one();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.lock().is_empty()
    }

    /// Dequeue without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.items.lock().pop_front()
    }

    /// Dequeue, blocking until an item is available.
    pub fn wait_pop(&self) -> T {
        let mut items = self.inner.items.lock();
        loop {
            if let Some(value) = items.pop_front() {
                return value;
            }
            self.inner.available.wait(&mut items);
        }
    }
}

impl<T> Clone for SyncQueue<T> {
    fn clone(&self) -> Self {
        SyncQueue {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
