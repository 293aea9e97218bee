//! Error type shared by every [`Allocator`](crate::Allocator).

use std::error::Error;
use std::fmt;

/// An allocator could not satisfy a request.
///
/// Always recoverable: the caller may retry with a smaller request, reset an
/// arena, or fall back to a different allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory allocation failed")
    }
}

impl Error for AllocError {}
