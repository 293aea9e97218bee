//! Test utilities and allocator fixtures for Quarry development.
//!
//! - [`TrackingAllocator`] counts live blocks so tests can assert that a
//!   container returned everything it took.
//! - [`FailingAllocator`] succeeds a fixed number of times, then fails
//!   every request.
//! - [`constant_hash`] collides every key.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use quarry_core::{AllocError, Allocator, SystemAllocator};

/// Forwards to [`SystemAllocator`] while counting live blocks.
#[derive(Debug, Default)]
pub struct TrackingAllocator {
    live: Cell<usize>,
    allocations: Cell<usize>,
    reallocations: Cell<usize>,
}

impl TrackingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks allocated and not yet released.
    pub fn live_blocks(&self) -> usize {
        self.live.get()
    }

    /// Successful `allocate` calls (including `reallocate(None, ..)`).
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    /// Successful `reallocate` calls on an existing block.
    pub fn reallocations(&self) -> usize {
        self.reallocations.get()
    }
}

// SAFETY: every block comes from `SystemAllocator`.
unsafe impl Allocator for TrackingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let block = SystemAllocator.allocate(layout)?;
        self.live.set(self.live.get() + 1);
        self.allocations.set(self.allocations.get() + 1);
        Ok(block)
    }

    unsafe fn reallocate(
        &self,
        block: Option<NonNull<u8>>,
        layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        if block.is_none() {
            return self.allocate(layout);
        }
        // SAFETY: forwarded caller contract.
        let moved = unsafe { SystemAllocator.reallocate(block, layout) }?;
        self.reallocations.set(self.reallocations.get() + 1);
        Ok(moved)
    }

    unsafe fn release(&self, block: Option<NonNull<u8>>) {
        if block.is_some() {
            assert!(self.live.get() > 0, "release of a block that was never allocated");
            self.live.set(self.live.get() - 1);
        }
        // SAFETY: forwarded caller contract.
        unsafe { SystemAllocator.release(block) }
    }
}

/// Forwards to [`SystemAllocator`] for the first `n` allocating calls, then
/// fails every allocation and reallocation.
#[derive(Debug)]
pub struct FailingAllocator {
    remaining: Cell<usize>,
}

impl FailingAllocator {
    /// Allow `n` successful allocations before failing.
    pub fn after(n: usize) -> Self {
        Self {
            remaining: Cell::new(n),
        }
    }

    /// Allow `n` more successful allocations from now on.
    pub fn refill(&self, n: usize) {
        self.remaining.set(n);
    }

    fn take(&self) -> Result<(), AllocError> {
        match self.remaining.get() {
            0 => Err(AllocError),
            n => {
                self.remaining.set(n - 1);
                Ok(())
            }
        }
    }
}

// SAFETY: every block comes from `SystemAllocator`.
unsafe impl Allocator for FailingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.take()?;
        SystemAllocator.allocate(layout)
    }

    unsafe fn reallocate(
        &self,
        block: Option<NonNull<u8>>,
        layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        self.take()?;
        // SAFETY: forwarded caller contract.
        unsafe { SystemAllocator.reallocate(block, layout) }
    }

    unsafe fn release(&self, block: Option<NonNull<u8>>) {
        // SAFETY: forwarded caller contract.
        unsafe { SystemAllocator.release(block) }
    }
}

/// A hash function that sends every key to the same home slot.
pub fn constant_hash<K>(_key: &K) -> u64 {
    0x9E37_79B9_7F4A_7C15
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::from_size_align(32, 8).unwrap()
    }

    #[test]
    fn tracking_counts_live_blocks() {
        let tracker = TrackingAllocator::new();
        let a = tracker.allocate(layout()).unwrap();
        let b = unsafe { tracker.reallocate(None, layout()) }.unwrap();
        assert_eq!(tracker.live_blocks(), 2);
        let a = unsafe { tracker.reallocate(Some(a), Layout::from_size_align(64, 8).unwrap()) }
            .unwrap();
        assert_eq!(tracker.live_blocks(), 2);
        assert_eq!(tracker.reallocations(), 1);
        unsafe {
            tracker.release(Some(a));
            tracker.release(Some(b));
            tracker.release(None);
        }
        assert_eq!(tracker.live_blocks(), 0);
        assert_eq!(tracker.allocations(), 2);
    }

    #[test]
    fn failing_allocator_runs_out() {
        let failing = FailingAllocator::after(1);
        let block = failing.allocate(layout()).unwrap();
        assert_eq!(failing.allocate(layout()), Err(AllocError));
        failing.refill(1);
        let other = failing.allocate(layout()).unwrap();
        unsafe {
            failing.release(Some(block));
            failing.release(Some(other));
        }
    }

    #[test]
    fn constant_hash_ignores_key() {
        assert_eq!(constant_hash(&1u32), constant_hash(&"other"));
    }
}
