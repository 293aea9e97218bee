//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use quarry_core::AllocError;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The request does not fit in the bytes left after the cursor.
    CapacityExceeded {
        /// Number of bytes requested (excluding header and padding).
        requested: usize,
        /// Bytes left between the cursor and the end of the arena.
        remaining: usize,
    },
    /// The backing allocator could not provide the arena buffer.
    BackingAllocFailed {
        /// Size of the buffer that was requested.
        bytes: usize,
    },
    /// A caller-supplied buffer cannot hold the alignment prefix plus one
    /// block header.
    BufferTooSmall {
        /// Length of the supplied buffer.
        len: usize,
        /// Minimum length this buffer would have needed.
        required: usize,
    },
    /// A [`Block`](crate::Block) from before the last reset.
    StaleBlock {
        /// The generation encoded in the block.
        block_generation: u32,
        /// The arena's current generation.
        arena_generation: u32,
    },
    /// A [`Block`](crate::Block) that extends past the arena cursor.
    OutOfBounds {
        /// End offset of the block.
        end: usize,
        /// Current cursor of the arena.
        allocated: usize,
    },
    /// A [`Block`](crate::Block) whose allocation has since been resized in
    /// place, so the handle no longer matches the size header.
    ResizedBlock {
        /// Length recorded in the handle.
        len: usize,
        /// Length recorded in the block's size header.
        current: usize,
    },
    /// An [`ArenaConfig`](crate::ArenaConfig) failed validation.
    InvalidConfig {
        /// Which constraint was violated.
        reason: &'static str,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} bytes, {remaining} bytes remaining"
                )
            }
            Self::BackingAllocFailed { bytes } => {
                write!(f, "backing allocator failed to provide {bytes} bytes")
            }
            Self::BufferTooSmall { len, required } => {
                write!(f, "buffer of {len} bytes is too small, need at least {required}")
            }
            Self::StaleBlock {
                block_generation,
                arena_generation,
            } => {
                write!(
                    f,
                    "stale block: generation {block_generation}, arena generation {arena_generation}"
                )
            }
            Self::OutOfBounds { end, allocated } => {
                write!(f, "block ends at {end} but only {allocated} bytes are allocated")
            }
            Self::ResizedBlock { len, current } => {
                write!(f, "block handle of {len} bytes outlived a resize to {current} bytes")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}

impl From<ArenaError> for AllocError {
    fn from(_: ArenaError) -> Self {
        AllocError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_both_sides() {
        let err = ArenaError::CapacityExceeded {
            requested: 64,
            remaining: 10,
        };
        assert_eq!(
            err.to_string(),
            "arena capacity exceeded: requested 64 bytes, 10 bytes remaining"
        );
    }

    #[test]
    fn converts_to_alloc_error() {
        let err: AllocError = ArenaError::BackingAllocFailed { bytes: 8 }.into();
        assert_eq!(err, AllocError);
    }
}
