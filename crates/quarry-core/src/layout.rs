//! Alignment arithmetic shared by the arena and table crates.

use std::mem;

/// Default alignment for untyped byte requests.
///
/// Matches the guarantee of the platform `malloc` on every 64-bit target we
/// build for (`2 * size_of::<usize>()`).
pub const MAX_ALIGN: usize = 2 * mem::size_of::<usize>();

/// Round `addr` up to the next multiple of `align`.
///
/// `align` must be a power of two. Returns `None` if the rounded value does
/// not fit in a `usize`.
#[inline]
pub fn align_up(addr: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
    let mask = align - 1;
    addr.checked_add(mask).map(|v| v & !mask)
}
