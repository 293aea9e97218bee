//! The allocator capability and the C-heap implementation of it.
//!
//! Every Quarry container is written against [`Allocator`] rather than a
//! concrete memory source. There is no process-wide default: the allocator
//! is a value threaded through constructors, with [`SystemAllocator`] as the
//! default type parameter.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::error::AllocError;
use crate::layout::MAX_ALIGN;

/// A source of raw memory blocks.
///
/// Three operations, all reporting exhaustion through their return value:
///
/// - [`allocate`](Allocator::allocate) a fresh block,
/// - [`reallocate`](Allocator::reallocate) an existing block (or allocate when
///   given `None`), preserving `min(old, new)` bytes,
/// - [`release`](Allocator::release) a block (no-op on `None`).
///
/// Ownership is never implicit: a block belongs to the caller until it is
/// released through the same allocator value that produced it.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and that do not
/// overlap any other live block. A block stays valid until it is released,
/// reallocated, or the allocator value that produced it is dropped.
/// Implementations backed by memory that is already suitably aligned may
/// ignore the alignment request.
pub unsafe trait Allocator {
    /// Allocate a block described by `layout`.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Allocate a block and fill it with zero bytes.
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let block = self.allocate(layout)?;
        // SAFETY: `allocate` returned a block valid for `layout.size()` writes.
        unsafe { ptr::write_bytes(block.as_ptr(), 0, layout.size()) };
        Ok(block)
    }

    /// Resize `block` to `layout.size()` bytes.
    ///
    /// With `block == None` this behaves exactly like
    /// [`allocate`](Allocator::allocate). Otherwise the returned block holds
    /// the first `min(old, new)` bytes of the old one. The returned pointer
    /// may or may not equal `block`; on success the old pointer must no
    /// longer be used unless they are equal. On failure `block` is untouched.
    ///
    /// # Safety
    ///
    /// `block`, if present, must be a live block obtained from this
    /// allocator, aligned to `layout.align()`.
    unsafe fn reallocate(
        &self,
        block: Option<NonNull<u8>>,
        layout: Layout,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Return `block` to the allocator. `None` is a no-op.
    ///
    /// # Safety
    ///
    /// `block`, if present, must be a live block obtained from this
    /// allocator. It must not be used afterwards.
    unsafe fn release(&self, block: Option<NonNull<u8>>);
}

// SAFETY: forwards every call to `A`, which upholds the contract.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate_zeroed(layout)
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        block: Option<NonNull<u8>>,
        layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        // SAFETY: the caller upholds the contract for `A`.
        unsafe { (**self).reallocate(block, layout) }
    }

    #[inline]
    unsafe fn release(&self, block: Option<NonNull<u8>>) {
        // SAFETY: the caller upholds the contract for `A`.
        unsafe { (**self).release(block) }
    }
}

/// The C heap (`malloc`/`realloc`/`free`).
///
/// Requests up to [`MAX_ALIGN`] are served by `malloc` directly, which
/// already guarantees that alignment. Larger alignments are allocated with
/// `posix_memalign`; reallocating to an alignment above [`MAX_ALIGN`] is not
/// supported and fails. Zero-sized requests are served as one byte so a
/// successful call never yields a null pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SystemAllocator;

// SAFETY: the C heap hands out distinct blocks valid until `free`, aligned
// to at least `MAX_ALIGN`; over-aligned requests use `posix_memalign`.
unsafe impl Allocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let size = layout.size().max(1);
        let raw = if layout.align() <= MAX_ALIGN {
            // SAFETY: `malloc` has no preconditions.
            unsafe { libc::malloc(size) }
        } else {
            let mut out = ptr::null_mut();
            // SAFETY: `layout.align()` is a power of two larger than
            // `MAX_ALIGN`, hence a multiple of `size_of::<*mut c_void>()`.
            let rc = unsafe { libc::posix_memalign(&mut out, layout.align(), size) };
            if rc != 0 {
                return Err(AllocError);
            }
            out
        };
        NonNull::new(raw.cast::<u8>()).ok_or(AllocError)
    }

    unsafe fn reallocate(
        &self,
        block: Option<NonNull<u8>>,
        layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        let Some(block) = block else {
            return self.allocate(layout);
        };
        if layout.align() > MAX_ALIGN {
            return Err(AllocError);
        }
        // SAFETY: the caller guarantees `block` is a live C-heap block.
        let raw = unsafe { libc::realloc(block.as_ptr().cast(), layout.size().max(1)) };
        NonNull::new(raw.cast::<u8>()).ok_or(AllocError)
    }

    unsafe fn release(&self, block: Option<NonNull<u8>>) {
        if let Some(block) = block {
            // SAFETY: the caller guarantees `block` is a live C-heap block.
            unsafe { libc::free(block.as_ptr().cast()) }
        }
    }
}
