//! Scope-bounded allocation over an [`Arena`].
//!
//! A [`ScopedAllocator`] snapshots the arena cursor when it is opened and
//! restores it when it ends, reclaiming everything allocated since in one
//! step. Individual releases are not tracked.
//!
//! Scopes on the same arena form a stack, and only the innermost open scope
//! may allocate. An outer scope that allocated while an inner one was open
//! would place blocks above the inner scope's mark, and ending the inner
//! scope would hand them out again. Allocation requests through any scope
//! other than the innermost therefore fail with [`AllocError`].
//!
//! Ending a scope while a scope opened after it is still alive is a caller
//! bug. It panics without rewinding, so the inner scope's blocks stay put.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

use quarry_core::{AllocError, Allocator, SystemAllocator};

use crate::arena::Arena;

/// A non-owning [`Allocator`] over an [`Arena`] that rewinds the arena when
/// dropped.
pub struct ScopedAllocator<'a, 'buf, A: Allocator = SystemAllocator> {
    arena: &'a Arena<'buf, A>,
    mark: usize,
    depth: usize,
}

impl<'a, 'buf, A: Allocator> ScopedAllocator<'a, 'buf, A> {
    /// Open a scope at the arena's current cursor.
    pub fn new(arena: &'a Arena<'buf, A>) -> Self {
        let depth = arena.open_scope();
        Self {
            arena,
            mark: arena.allocated(),
            depth,
        }
    }

    /// Cursor position the arena returns to when this scope ends.
    pub fn mark(&self) -> usize {
        self.mark
    }

    /// The arena this scope allocates from.
    pub fn arena(&self) -> &'a Arena<'buf, A> {
        self.arena
    }

    /// Bytes allocated through this scope (and any scope nested in it) so far.
    pub fn used(&self) -> usize {
        self.arena.allocated().saturating_sub(self.mark)
    }

    /// Whether this is the most recently opened scope still alive, and so
    /// the only one allowed to allocate.
    pub fn is_innermost(&self) -> bool {
        self.arena.open_scopes() == self.depth
    }

    /// End the scope now. Equivalent to dropping it.
    pub fn end(self) {}

    fn ensure_innermost(&self) -> Result<(), AllocError> {
        if self.is_innermost() {
            Ok(())
        } else {
            tracing::trace!(
                depth = self.depth,
                open = self.arena.open_scopes(),
                "allocation through an outer scope rejected"
            );
            Err(AllocError)
        }
    }
}

impl<A: Allocator> Drop for ScopedAllocator<'_, '_, A> {
    fn drop(&mut self) {
        if !self.is_innermost() {
            if std::thread::panicking() {
                return;
            }
            panic!("scopes on one arena must end in reverse creation order");
        }
        self.arena.close_scope(self.depth);
        let reclaimed = self.arena.rewind(self.mark);
        tracing::trace!(mark = self.mark, reclaimed, depth = self.depth, "scope ended");
    }
}

// SAFETY: blocks come from `Arena::bump`, which hands out disjoint ranges
// past the cursor aligned to the request. Only the innermost scope
// allocates, so every block lies above the marks of all scopes still open
// and the cursor only moves back below it when this scope ends. `reset`
// needs `&mut Arena` and cannot run while the scope borrows the arena.
unsafe impl<A: Allocator> Allocator for ScopedAllocator<'_, '_, A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.ensure_innermost()?;
        let offset = self.arena.bump(layout.size(), layout.align())?;
        Ok(self.arena.ptr_at(offset))
    }

    unsafe fn reallocate(
        &self,
        block: Option<NonNull<u8>>,
        layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        let Some(block) = block else {
            return self.allocate(layout);
        };
        self.ensure_innermost()?;
        let offset = self.arena.offset_of(block);
        // SAFETY: the caller guarantees `block` is a live block of this arena,
        // so its header lies in the 8 bytes before it.
        let old_size = unsafe { self.arena.read_header(offset) };
        let offset = self
            .arena
            .resize(offset, old_size, layout.size(), layout.align())?;
        Ok(self.arena.ptr_at(offset))
    }

    unsafe fn release(&self, _block: Option<NonNull<u8>>) {}
}

impl<A: Allocator> fmt::Debug for ScopedAllocator<'_, '_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedAllocator")
            .field("mark", &self.mark)
            .field("depth", &self.depth)
            .field("used", &self.used())
            .finish()
    }
}
