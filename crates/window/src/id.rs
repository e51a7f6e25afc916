//! Window id allocation.
//!
//! Ids only have to be unique among the windows a single client has open,
//! and clients scope everything by the current window, so a wrapping counter
//! shared by the whole process is enough. Liveness is not tracked.

use std::sync::atomic::{AtomicU8, Ordering};

/// Process-wide allocator used by [`crate::ClientContainer::new`].
pub static CONTAINER_IDS: ContainerIdAllocator = ContainerIdAllocator::new(1, 99);

/// Wrapping window id counter over `first..=last`.
#[derive(Debug)]
pub struct ContainerIdAllocator {
    next: AtomicU8,
    first: u8,
    last: u8,
}

impl ContainerIdAllocator {
    /// Allocator handing out `first..=last`, then wrapping back to `first`.
    pub const fn new(first: u8, last: u8) -> Self {
        assert!(first >= 1, "window id 0 is reserved for the player inventory");
        assert!(first <= last, "empty window id range");
        assert!(last <= i8::MAX as u8, "window ids must fit a signed byte");
        Self {
            next: AtomicU8::new(first),
            first,
            last,
        }
    }

    /// Next id in the range. Safe to call from any thread.
    pub fn allocate(&self) -> u8 {
        let mut current = self.next.load(Ordering::Relaxed);
        loop {
            let next = if current >= self.last {
                self.first
            } else {
                current + 1
            };
            match self
                .next
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return current,
                Err(actual) => current = actual,
            }
        }
    }

    /// Inclusive id range.
    pub fn range(&self) -> (u8, u8) {
        (self.first, self.last)
    }
}
