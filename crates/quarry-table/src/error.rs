//! Table error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while inserting into or resizing a table.
///
/// A failed operation leaves the table exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableError {
    /// The allocator could not provide a new entry array.
    AllocFailed {
        /// Size in bytes of the array that was requested.
        bytes: usize,
    },
    /// The requested slot count does not fit in memory.
    CapacityOverflow {
        /// Slot count that was requested.
        requested: usize,
    },
    /// No free slot was reachable, even after rebuilding the array to clear
    /// tombstones.
    Saturated {
        /// Slot count of the table at the time.
        capacity: usize,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocFailed { bytes } => {
                write!(f, "failed to allocate {bytes}-byte entry array")
            }
            Self::CapacityOverflow { requested } => {
                write!(f, "table capacity {requested} overflows the address space")
            }
            Self::Saturated { capacity } => {
                write!(f, "no free slot reachable in table of {capacity} slots")
            }
        }
    }
}

impl Error for TableError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_numbers() {
        let msg = TableError::AllocFailed { bytes: 768 }.to_string();
        assert!(msg.contains("768"));
        let msg = TableError::Saturated { capacity: 8 }.to_string();
        assert!(msg.contains('8'));
    }
}
