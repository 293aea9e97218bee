//! Block handles.
//!
//! A [`Block`] names an arena allocation by offset instead of by pointer.
//! The length travels with the handle rather than being read back from the
//! size header, and the generation allows O(1) staleness checks after the
//! arena has been reset.

use std::fmt;

/// Location of an allocation within an [`Arena`](crate::Arena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct Block {
    /// Arena generation when this block was allocated.
    pub(crate) generation: u32,
    /// Byte offset of the first data byte from the start of the arena.
    pub(crate) offset: usize,
    /// Length of the block in bytes.
    pub(crate) len: usize,
}

impl Block {
    pub(crate) fn new(generation: u32, offset: usize, len: usize) -> Self {
        Self {
            generation,
            offset,
            len,
        }
    }

    /// The arena generation this block belongs to.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Byte offset of the block's data.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length block.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset one past the last byte of the block.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block(gen={}, off={}, len={})",
            self.generation, self.offset, self.len
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let b = Block::new(3, 16, 400);
        assert_eq!(b.generation(), 3);
        assert_eq!(b.offset(), 16);
        assert_eq!(b.len(), 400);
        assert_eq!(b.end(), 416);
        assert!(!b.is_empty());
        assert_eq!(b.to_string(), "Block(gen=3, off=16, len=400)");
    }

    #[test]
    fn empty_block() {
        assert!(Block::new(0, 8, 0).is_empty());
    }
}
