//! Fixed-capacity bump arena.
//!
//! An [`Arena`] is a single contiguous byte buffer with one cursor. Every
//! block is laid out as
//!
//! ```text
//! cursor
//! │
//! ▼
//! ┌─────────┬───────────┬──────────────────────┐
//! │ padding │ size: u64 │ data (size bytes)    │
//! └─────────┴───────────┴──────────────────────┘
//!                       ▲                      ▲
//!                       block offset           new cursor
//! ```
//!
//! The header sits immediately before the aligned data pointer. It is what
//! lets the pointer-based [`Allocator`] path resize a block without being
//! told its old size. Blocks are never freed individually; the cursor only
//! moves backwards on [`reset`](Arena::reset), when a tail block shrinks, or
//! when a [`ScopedAllocator`] ends.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};
use std::slice;

use quarry_core::{align_up, Allocator, SystemAllocator, MAX_ALIGN};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::handle::Block;
use crate::scope::ScopedAllocator;

/// Size of the length header written in front of every block.
pub const BLOCK_HEADER: usize = 8;

enum Backing<A> {
    /// Buffer obtained from `A`; released through it on drop.
    Owned(A),
    /// Caller-supplied buffer, borrowed for `'buf`.
    Borrowed,
}

/// A fixed-capacity bump allocator over one byte buffer.
///
/// Two ways to allocate:
///
/// - The safe handle API ([`alloc`](Arena::alloc), [`realloc`](Arena::realloc),
///   [`bytes`](Arena::bytes)) returns [`Block`]s. Blocks handed out this way
///   are zero-filled.
/// - A [`ScopedAllocator`] exposes the arena through the raw-pointer
///   [`Allocator`] capability, so containers such as tables can live in it.
///   Those blocks are not zero-filled.
///
/// The arena is single-threaded: its cursor is a [`Cell`], so it is never
/// `Sync`.
pub struct Arena<'buf, A: Allocator = SystemAllocator> {
    data: NonNull<u8>,
    capacity: usize,
    allocated: Cell<usize>,
    generation: u32,
    open_scopes: Cell<usize>,
    backing: Backing<A>,
    _buf: PhantomData<&'buf mut [u8]>,
}

// SAFETY: the arena exclusively owns (or exclusively borrows) its buffer, so
// moving it to another thread moves sole access along with it. It stays
// `!Sync` through its `Cell` fields.
unsafe impl<A: Allocator + Send> Send for Arena<'_, A> {}

impl Arena<'static> {
    /// Create an arena of `capacity` bytes on the C heap.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::new_in(capacity, SystemAllocator)
    }
}

impl<A: Allocator> Arena<'static, A> {
    /// Create an arena of `capacity` bytes obtained from `allocator`.
    ///
    /// The buffer is released through the same allocator when the arena is
    /// dropped.
    pub fn new_in(capacity: usize, allocator: A) -> Result<Self, ArenaError> {
        Self::from_config(&ArenaConfig::new(capacity), allocator)
    }

    /// Create an arena from a validated [`ArenaConfig`].
    pub fn from_config(config: &ArenaConfig, allocator: A) -> Result<Self, ArenaError> {
        config.validate()?;
        let layout = Layout::from_size_align(config.capacity, config.base_align).map_err(|_| {
            ArenaError::InvalidConfig {
                reason: "capacity and base_align do not form a valid layout",
            }
        })?;
        let data = allocator
            .allocate_zeroed(layout)
            .map_err(|_| ArenaError::BackingAllocFailed {
                bytes: config.capacity,
            })?;
        tracing::debug!(
            capacity = config.capacity,
            base_align = config.base_align,
            "arena created"
        );
        Ok(Self {
            data,
            capacity: config.capacity,
            allocated: Cell::new(0),
            generation: 0,
            open_scopes: Cell::new(0),
            backing: Backing::Owned(allocator),
            _buf: PhantomData,
        })
    }
}

impl<'buf> Arena<'buf> {
    /// Carve an arena out of caller-supplied memory.
    ///
    /// The data region starts at the first [`MAX_ALIGN`]-aligned byte of
    /// `buffer`; the bytes before it are unused. Fails if what is left
    /// cannot hold a single block header.
    pub fn wrap(buffer: &'buf mut [u8]) -> Result<Self, ArenaError> {
        let len = buffer.len();
        let base = buffer.as_mut_ptr() as usize;
        let prefix = align_up(base, MAX_ALIGN).map_or(usize::MAX, |start| start - base);
        let required = prefix.saturating_add(BLOCK_HEADER);
        if len < required {
            return Err(ArenaError::BufferTooSmall { len, required });
        }
        // SAFETY: `prefix < len`, so the offset stays inside `buffer`.
        let start = unsafe { buffer.as_mut_ptr().add(prefix) };
        let data = NonNull::new(start).ok_or(ArenaError::BufferTooSmall { len, required })?;
        tracing::debug!(capacity = len - prefix, prefix, "arena wrapped caller buffer");
        Ok(Self {
            data,
            capacity: len - prefix,
            allocated: Cell::new(0),
            generation: 0,
            open_scopes: Cell::new(0),
            backing: Backing::Borrowed,
            _buf: PhantomData,
        })
    }
}

impl<'buf, A: Allocator> Arena<'buf, A> {
    /// Total usable bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far, including headers and padding.
    pub fn allocated(&self) -> usize {
        self.allocated.get()
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.capacity - self.allocated.get()
    }

    /// Number of times the arena has been reset.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of [`ScopedAllocator`]s currently open on this arena.
    pub fn open_scopes(&self) -> usize {
        self.open_scopes.get()
    }

    /// Open a [`ScopedAllocator`] over this arena.
    pub fn scope(&self) -> ScopedAllocator<'_, 'buf, A> {
        ScopedAllocator::new(self)
    }

    /// Allocate a zero-filled block of `size` bytes aligned to `align`.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub fn alloc(&mut self, size: usize, align: usize) -> Result<Block, ArenaError> {
        assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
        let offset = self.bump(size, align)?;
        // SAFETY: `bump` reserved `size` bytes at `offset`.
        unsafe { ptr::write_bytes(self.data.as_ptr().add(offset), 0, size) };
        Ok(Block::new(self.generation, offset, size))
    }

    /// Resize `block` to `size` bytes.
    ///
    /// `None` behaves like [`alloc`](Arena::alloc). A block that ends at the
    /// cursor is resized in place and keeps its offset; any other block is
    /// copied into a fresh allocation, leaving its old bytes unreachable
    /// until the next reset. Bytes past the preserved prefix are zero.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub fn realloc(
        &mut self,
        block: Option<Block>,
        size: usize,
        align: usize,
    ) -> Result<Block, ArenaError> {
        let Some(block) = block else {
            return self.alloc(size, align);
        };
        assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
        self.check(block)?;
        let offset = self.resize(block.offset, block.len, size, align)?;
        if size > block.len {
            // SAFETY: the block now spans `size` bytes at `offset` and its
            // first `block.len` bytes were kept or copied.
            unsafe {
                ptr::write_bytes(self.data.as_ptr().add(offset + block.len), 0, size - block.len)
            };
        }
        Ok(Block::new(self.generation, offset, size))
    }

    /// Read a block's bytes.
    pub fn bytes(&self, block: Block) -> Result<&[u8], ArenaError> {
        self.check(block)?;
        // SAFETY: `check` confirmed the range lies below the cursor. Bytes of
        // handle blocks are always initialised (zero-filled on allocation),
        // and nothing can write into them while `&self` is borrowed because
        // every writer either needs `&mut self` or writes past the cursor.
        Ok(unsafe { slice::from_raw_parts(self.data.as_ptr().add(block.offset), block.len) })
    }

    /// Mutably access a block's bytes.
    pub fn bytes_mut(&mut self, block: Block) -> Result<&mut [u8], ArenaError> {
        self.check(block)?;
        // SAFETY: as in `bytes`, plus `&mut self` excludes every other borrow.
        Ok(unsafe { slice::from_raw_parts_mut(self.data.as_ptr().add(block.offset), block.len) })
    }

    /// Read the size header stored in front of a pointer handed out through
    /// a [`ScopedAllocator`].
    ///
    /// # Safety
    ///
    /// `block` must have been returned by an allocator over this arena and
    /// must still lie below the cursor.
    pub unsafe fn block_size(&self, block: NonNull<u8>) -> usize {
        let offset = block.as_ptr() as usize - self.data.as_ptr() as usize;
        // SAFETY: the caller guarantees `block` is a live block of this arena.
        unsafe { self.read_header(offset) }
    }

    /// Move the cursor back to zero.
    ///
    /// Every block becomes invalid; handles from before the reset are
    /// reported as [`ArenaError::StaleBlock`]. No memory is returned to the
    /// backing allocator.
    pub fn reset(&mut self) {
        let reclaimed = self.allocated.replace(0);
        self.generation = self.generation.wrapping_add(1);
        tracing::debug!(generation = self.generation, reclaimed, "arena reset");
    }

    fn check(&self, block: Block) -> Result<(), ArenaError> {
        if block.generation != self.generation {
            return Err(ArenaError::StaleBlock {
                block_generation: block.generation,
                arena_generation: self.generation,
            });
        }
        let allocated = self.allocated.get();
        match block.offset.checked_add(block.len) {
            Some(end) if end <= allocated => {}
            _ => {
                return Err(ArenaError::OutOfBounds {
                    end: block.offset.saturating_add(block.len),
                    allocated,
                })
            }
        }
        // An in-place resize rewrites the header but cannot reach the old
        // handle, so a mismatch marks a handle that outlived its block.
        // SAFETY: handles are only minted by `alloc`/`realloc`, whose offsets
        // sit after a header, and the range check above bounds the offset.
        let current = unsafe { self.read_header(block.offset) };
        if current != block.len {
            return Err(ArenaError::ResizedBlock {
                len: block.len,
                current,
            });
        }
        Ok(())
    }

    /// Reserve a header plus `size` bytes aligned to `align` at the cursor.
    /// Returns the data offset. Leaves the cursor untouched on failure.
    pub(crate) fn bump(&self, size: usize, align: usize) -> Result<usize, ArenaError> {
        let base = self.data.as_ptr() as usize;
        let cursor = self.allocated.get();
        let placement = base
            .checked_add(cursor + BLOCK_HEADER)
            .and_then(|header_end| align_up(header_end, align))
            .map(|ptr| ptr - base)
            .and_then(|offset| Some((offset, offset.checked_add(size)?)))
            .filter(|&(_, end)| end <= self.capacity);
        let Some((offset, end)) = placement else {
            tracing::trace!(
                requested = size,
                align,
                remaining = self.remaining(),
                "arena allocation rejected"
            );
            return Err(ArenaError::CapacityExceeded {
                requested: size,
                remaining: self.remaining(),
            });
        };
        // SAFETY: `offset - BLOCK_HEADER >= cursor` and `end <= capacity`.
        unsafe { self.write_header(offset, size) };
        self.allocated.set(end);
        Ok(offset)
    }

    /// Grow or shrink the block at `offset` from `old_size` to `size` bytes.
    ///
    /// In place when the block ends at the cursor, otherwise a fresh block
    /// receives a copy of the first `min(old_size, size)` bytes.
    pub(crate) fn resize(
        &self,
        offset: usize,
        old_size: usize,
        size: usize,
        align: usize,
    ) -> Result<usize, ArenaError> {
        debug_assert_eq!(
            (self.data.as_ptr() as usize + offset) % align,
            0,
            "realloc target is not aligned to {align}"
        );
        let cursor = self.allocated.get();
        if offset + old_size == cursor {
            return match offset.checked_add(size).filter(|&end| end <= self.capacity) {
                Some(end) => {
                    // SAFETY: the header of a live block lies inside the buffer.
                    unsafe { self.write_header(offset, size) };
                    self.allocated.set(end);
                    Ok(offset)
                }
                None => Err(ArenaError::CapacityExceeded {
                    requested: size,
                    remaining: self.capacity - offset,
                }),
            };
        }
        let moved = self.bump(size, align)?;
        // SAFETY: the old block ends at or below the previous cursor and the
        // new one starts after it, so the ranges are disjoint and in bounds.
        unsafe {
            ptr::copy_nonoverlapping(
                self.data.as_ptr().add(offset),
                self.data.as_ptr().add(moved),
                old_size.min(size),
            );
        }
        Ok(moved)
    }

    pub(crate) fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.capacity);
        // SAFETY: `offset` lies within the buffer, which is non-null.
        unsafe { NonNull::new_unchecked(self.data.as_ptr().add(offset)) }
    }

    pub(crate) fn offset_of(&self, block: NonNull<u8>) -> usize {
        let offset = (block.as_ptr() as usize).wrapping_sub(self.data.as_ptr() as usize);
        debug_assert!(
            offset >= BLOCK_HEADER && offset <= self.allocated.get(),
            "pointer does not belong to this arena"
        );
        offset
    }

    pub(crate) fn rewind(&self, mark: usize) -> usize {
        let reclaimed = self.allocated.get().saturating_sub(mark);
        self.allocated.set(mark);
        reclaimed
    }

    pub(crate) fn open_scope(&self) -> usize {
        let depth = self.open_scopes.get() + 1;
        self.open_scopes.set(depth);
        depth
    }

    pub(crate) fn close_scope(&self, depth: usize) {
        debug_assert_eq!(self.open_scopes.get(), depth);
        self.open_scopes.set(depth - 1);
    }

    /// # Safety
    ///
    /// `offset >= BLOCK_HEADER` and `offset <= capacity`.
    pub(crate) unsafe fn read_header(&self, offset: usize) -> usize {
        // SAFETY: the header occupies the 8 bytes before `offset`, inside the buffer.
        let size = unsafe {
            self.data
                .as_ptr()
                .add(offset - BLOCK_HEADER)
                .cast::<u64>()
                .read_unaligned()
        };
        size as usize
    }

    /// # Safety
    ///
    /// `offset >= BLOCK_HEADER` and `offset <= capacity`.
    unsafe fn write_header(&self, offset: usize, size: usize) {
        // SAFETY: the header occupies the 8 bytes before `offset`, inside the buffer.
        unsafe {
            self.data
                .as_ptr()
                .add(offset - BLOCK_HEADER)
                .cast::<u64>()
                .write_unaligned(size as u64);
        }
    }
}

impl<A: Allocator> Drop for Arena<'_, A> {
    fn drop(&mut self) {
        if let Backing::Owned(allocator) = &self.backing {
            // SAFETY: `data` came from `allocator` in `from_config` and no
            // block can outlive the arena.
            unsafe { allocator.release(Some(self.data)) };
        }
    }
}

impl<A: Allocator> fmt::Debug for Arena<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity)
            .field("allocated", &self.allocated.get())
            .field("generation", &self.generation)
            .field("open_scopes", &self.open_scopes.get())
            .field("owned", &matches!(self.backing, Backing::Owned(_)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quarry_test_utils::{FailingAllocator, TrackingAllocator};

    fn size_of_i32s(n: usize) -> usize {
        n * std::mem::size_of::<i32>()
    }

    #[test]
    fn hundred_ints_at_16_consume_416_bytes() {
        let mut arena = Arena::new(512).unwrap();
        let a = arena.alloc(size_of_i32s(100), 16).unwrap();
        assert_eq!(a.offset() % 16, 0);
        assert_eq!(a.len(), 400);
        assert_eq!(arena.allocated(), 416);
    }

    #[test]
    fn header_and_padding_accounting_is_byte_exact() {
        let mut arena = Arena::new(512).unwrap();
        let _a = arena.alloc(size_of_i32s(100), 16).unwrap();
        assert_eq!(arena.allocated(), 416);

        // 8 byte header + 8 bytes of padding.
        let _b = arena.alloc(size_of_i32s(1), 16).unwrap();
        assert_eq!(arena.allocated(), 436);

        // 8 byte header + 4 bytes of padding.
        let c = arena.alloc(size_of_i32s(2), 16).unwrap();
        assert_eq!(arena.allocated(), 456);

        // Header lands exactly on an aligned boundary.
        let d = arena.alloc(size_of_i32s(1), 16).unwrap();
        assert_eq!(arena.allocated(), 468);

        let d_grown = arena.realloc(Some(d), size_of_i32s(3), 16).unwrap();
        assert_eq!(d_grown.offset(), d.offset());
        assert_eq!(arena.allocated(), 476);

        let d_shrunk = arena.realloc(Some(d_grown), size_of_i32s(2), 16).unwrap();
        assert_eq!(d_shrunk.offset(), d.offset());
        assert_eq!(arena.allocated(), 472);

        let c_moved = arena.realloc(Some(c), size_of_i32s(1), 16).unwrap();
        assert_ne!(c_moved.offset(), c.offset());
        assert_eq!(arena.allocated(), 484);
    }

    #[test]
    fn header_holds_block_size() {
        let mut arena = Arena::new(256).unwrap();
        let block = arena.alloc(24, 8).unwrap();
        assert_eq!(unsafe { arena.read_header(block.offset()) }, 24);
        let grown = arena.realloc(Some(block), 40, 8).unwrap();
        assert_eq!(unsafe { arena.read_header(grown.offset()) }, 40);
    }

    #[test]
    fn exhaustion_leaves_cursor_untouched() {
        let mut arena = Arena::new(64).unwrap();
        arena.alloc(32, 8).unwrap();
        let before = arena.allocated();
        let err = arena.alloc(64, 8).unwrap_err();
        assert!(matches!(err, ArenaError::CapacityExceeded { requested: 64, .. }));
        assert_eq!(arena.allocated(), before);
    }

    #[test]
    fn exact_fit_succeeds() {
        let mut arena = Arena::new(64).unwrap();
        arena.alloc(64 - BLOCK_HEADER, 8).unwrap();
        assert_eq!(arena.remaining(), 0);
        assert!(arena.alloc(0, 1).is_err());
    }

    #[test]
    fn tail_growth_past_capacity_fails_in_place() {
        let mut arena = Arena::new(64).unwrap();
        let block = arena.alloc(16, 8).unwrap();
        let before = arena.allocated();
        assert!(arena.realloc(Some(block), 128, 8).is_err());
        assert_eq!(arena.allocated(), before);
        // The block is still the tail and still usable.
        assert_eq!(arena.bytes(block).unwrap().len(), 16);
    }

    #[test]
    fn realloc_none_allocates() {
        let mut arena = Arena::new(128).unwrap();
        let block = arena.realloc(None, 10, 8).unwrap();
        assert_eq!(block.len(), 10);
        assert_eq!(arena.allocated(), BLOCK_HEADER + 10);
    }

    #[test]
    fn moved_block_keeps_prefix_and_zeroes_rest() {
        let mut arena = Arena::new(256).unwrap();
        let a = arena.alloc(4, 8).unwrap();
        arena.bytes_mut(a).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        let _b = arena.alloc(4, 8).unwrap();

        let moved = arena.realloc(Some(a), 8, 8).unwrap();
        assert_ne!(moved.offset(), a.offset());
        assert_eq!(arena.bytes(moved).unwrap(), &[1, 2, 3, 4, 0, 0, 0, 0]);

        let shrunk = arena.realloc(Some(a), 2, 8).unwrap();
        assert_eq!(arena.bytes(shrunk).unwrap(), &[1, 2]);
    }

    #[test]
    fn tail_growth_zeroes_new_bytes() {
        let mut arena = Arena::new(256).unwrap();
        let a = arena.alloc(4, 8).unwrap();
        arena.bytes_mut(a).unwrap().fill(0xAB);
        let shrunk = arena.realloc(Some(a), 2, 8).unwrap();
        let grown = arena.realloc(Some(shrunk), 4, 8).unwrap();
        assert_eq!(arena.bytes(grown).unwrap(), &[0xAB, 0xAB, 0, 0]);
    }

    #[test]
    fn reset_invalidates_blocks() {
        let mut arena = Arena::new(128).unwrap();
        let block = arena.alloc(16, 8).unwrap();
        arena.reset();
        assert_eq!(arena.allocated(), 0);
        assert_eq!(arena.generation(), 1);
        assert_eq!(
            arena.bytes(block),
            Err(ArenaError::StaleBlock {
                block_generation: 0,
                arena_generation: 1
            })
        );
        assert!(arena.realloc(Some(block), 32, 8).is_err());
    }

    #[test]
    fn block_past_cursor_is_out_of_bounds() {
        let mut arena = Arena::new(128).unwrap();
        let block = arena.alloc(16, 8).unwrap();
        let shrunk = arena.realloc(Some(block), 4, 8).unwrap();
        assert!(arena.bytes(shrunk).is_ok());
        assert!(matches!(
            arena.bytes(block),
            Err(ArenaError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn handle_from_before_in_place_shrink_is_rejected() {
        let mut arena = Arena::new(128).unwrap();
        let block = arena.alloc(16, 8).unwrap();
        let shrunk = arena.realloc(Some(block), 4, 8).unwrap();
        let next = arena.alloc(8, 8).unwrap();
        arena.bytes_mut(next).unwrap().fill(0x11);

        // The old handle now spans the next block's header and data.
        assert!(block.end() <= arena.allocated());
        assert_eq!(
            arena.bytes_mut(block).map(|b| b.len()),
            Err(ArenaError::ResizedBlock { len: 16, current: 4 })
        );
        assert!(arena.realloc(Some(block), 32, 8).is_err());

        assert!(arena.bytes(shrunk).is_ok());
        assert_eq!(arena.bytes(next).unwrap(), &[0x11; 8]);
        let grown = arena.realloc(Some(next), 16, 8).unwrap();
        assert_eq!(grown.offset(), next.offset());
        assert_eq!(&arena.bytes(grown).unwrap()[..8], &[0x11; 8]);
    }

    #[test]
    fn handle_from_before_in_place_growth_is_rejected() {
        let mut arena = Arena::new(128).unwrap();
        let block = arena.alloc(8, 8).unwrap();
        let grown = arena.realloc(Some(block), 24, 8).unwrap();
        assert!(matches!(
            arena.bytes(block),
            Err(ArenaError::ResizedBlock { len: 8, current: 24 })
        ));
        assert_eq!(arena.bytes(grown).unwrap().len(), 24);
    }

    #[test]
    fn wrap_uses_caller_buffer() {
        let mut buffer = [0u8; 256];
        let mut arena = Arena::wrap(&mut buffer).unwrap();
        assert!(arena.capacity() <= 256);
        assert!(arena.capacity() > 256 - MAX_ALIGN);
        let block = arena.alloc(32, 16).unwrap();
        arena.bytes_mut(block).unwrap().fill(7);
        assert!(arena.bytes(block).unwrap().iter().all(|&b| b == 7));
    }

    #[test]
    fn wrap_rejects_tiny_buffer() {
        let mut buffer = [0u8; 4];
        assert!(matches!(
            Arena::wrap(&mut buffer),
            Err(ArenaError::BufferTooSmall { len: 4, .. })
        ));
        let mut empty: [u8; 0] = [];
        assert!(Arena::wrap(&mut empty).is_err());
    }

    #[test]
    fn backing_buffer_returned_on_drop() {
        let tracker = TrackingAllocator::new();
        {
            let arena = Arena::new_in(1024, &tracker).unwrap();
            assert_eq!(arena.capacity(), 1024);
            assert_eq!(tracker.live_blocks(), 1);
        }
        assert_eq!(tracker.live_blocks(), 0);
    }

    #[test]
    fn backing_failure_is_reported() {
        let failing = FailingAllocator::after(0);
        assert_eq!(
            Arena::new_in(64, &failing).unwrap_err(),
            ArenaError::BackingAllocFailed { bytes: 64 }
        );
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            Arena::new(0),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn from_config_honours_base_align() {
        let config = ArenaConfig {
            capacity: 256,
            base_align: 64,
        };
        let mut arena = Arena::from_config(&config, SystemAllocator).unwrap();
        // Base aligned to 64 means a 64-aligned block needs a full 64 bytes
        // of header plus padding.
        let block = arena.alloc(8, 64).unwrap();
        assert_eq!(block.offset(), 64);
    }

    proptest! {
        #[test]
        fn cursor_never_exceeds_capacity(
            requests in proptest::collection::vec((0usize..96, 0u32..5), 1..40),
        ) {
            let mut arena = Arena::new(1024).unwrap();
            for (size, shift) in requests {
                let before = arena.allocated();
                match arena.alloc(size, 1 << shift) {
                    Ok(block) => {
                        prop_assert!(block.offset() >= before + BLOCK_HEADER);
                        prop_assert_eq!(block.end(), arena.allocated());
                        prop_assert_eq!(block.offset() % (1 << shift), 0);
                    }
                    Err(_) => prop_assert_eq!(arena.allocated(), before),
                }
                prop_assert!(arena.allocated() <= arena.capacity());
            }
        }

        #[test]
        fn tail_realloc_never_moves(first in 1usize..200, second in 0usize..200) {
            let mut arena = Arena::new(1024).unwrap();
            let block = arena.alloc(first, 16).unwrap();
            let resized = arena.realloc(Some(block), second, 16).unwrap();
            prop_assert_eq!(resized.offset(), block.offset());
            prop_assert_eq!(arena.allocated(), block.offset() + second);
        }

        #[test]
        fn non_tail_realloc_moves_and_preserves(
            data in proptest::collection::vec(any::<u8>(), 1..64),
            new_len in 0usize..128,
        ) {
            let mut arena = Arena::new(1024).unwrap();
            let block = arena.alloc(data.len(), 8).unwrap();
            arena.bytes_mut(block).unwrap().copy_from_slice(&data);
            let _tail = arena.alloc(1, 8).unwrap();

            let moved = arena.realloc(Some(block), new_len, 8).unwrap();
            prop_assert_ne!(moved.offset(), block.offset());
            let keep = data.len().min(new_len);
            prop_assert_eq!(&arena.bytes(moved).unwrap()[..keep], &data[..keep]);
        }
    }
}
