//! Per-slot signatures.
//!
//! Every slot stores 64 bits of metadata next to its key and value. The two
//! reserved values mark empty slots (`0`) and removed slots (all ones). Any
//! other value marks an occupied slot: bit 63 is set and the low 62 bits
//! hold the top 62 bits of the key's hash. Bit 62 is always clear, so an
//! occupied signature can never equal either sentinel.
//!
//! Because the hash bits travel with the entry, collisions are mostly
//! rejected without comparing keys, and a resize can re-place entries
//! without hashing a single key.

use std::fmt;

/// Occupancy tag plus truncated hash for one table slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// A slot that has never held an entry since the last clear or resize.
    pub const EMPTY: Self = Self(0);

    /// A slot whose entry was removed.
    pub const TOMBSTONE: Self = Self(u64::MAX);

    const OCCUPIED: u64 = 1 << 63;
    const HASH_BITS: u64 = u64::MAX >> 2;

    /// Signature of an occupied slot holding a key with this hash.
    #[inline]
    pub const fn from_hash(hash: u64) -> Self {
        Self((hash >> 2) | Self::OCCUPIED)
    }

    /// The raw 64-bit value.
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether the slot has never been used.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }

    /// Whether the slot held an entry that was removed.
    #[inline]
    pub const fn is_tombstone(self) -> bool {
        self.0 == Self::TOMBSTONE.0
    }

    /// Whether the slot holds a live entry.
    #[inline]
    pub const fn is_occupied(self) -> bool {
        !self.is_empty() && !self.is_tombstone()
    }

    /// The hash bits with the occupancy tag stripped.
    #[inline]
    pub const fn probe_hash(self) -> u64 {
        self.0 & Self::HASH_BITS
    }

    /// First slot probed for this signature in a table of `capacity`
    /// slots. `capacity` must be a power of two.
    #[inline]
    pub const fn home_slot(self, capacity: usize) -> usize {
        self.probe_hash() as usize & (capacity - 1)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EMPTY => f.write_str("Signature(EMPTY)"),
            Self::TOMBSTONE => f.write_str("Signature(TOMBSTONE)"),
            Self(v) => write!(f, "Signature({v:#018x})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sentinels() {
        assert!(Signature::EMPTY.is_empty());
        assert!(!Signature::EMPTY.is_occupied());
        assert!(Signature::TOMBSTONE.is_tombstone());
        assert!(!Signature::TOMBSTONE.is_occupied());
    }

    #[test]
    fn extreme_hashes_stay_occupied() {
        for hash in [0, 1, 2, 3, u64::MAX, u64::MAX - 1, 1 << 63] {
            let sig = Signature::from_hash(hash);
            assert!(sig.is_occupied(), "hash {hash:#x}");
        }
        assert_eq!(Signature::from_hash(0).value(), 1 << 63);
        assert_eq!(Signature::from_hash(u64::MAX).value(), 0xBFFF_FFFF_FFFF_FFFF);
    }

    #[test]
    fn home_slot_masks_probe_hash() {
        let sig = Signature::from_hash(0b1101 << 2);
        assert_eq!(sig.probe_hash(), 0b1101);
        assert_eq!(sig.home_slot(8), 0b101);
        assert_eq!(sig.home_slot(16), 0b1101);
    }

    #[test]
    fn debug_names_sentinels() {
        assert_eq!(format!("{:?}", Signature::EMPTY), "Signature(EMPTY)");
        assert_eq!(format!("{:?}", Signature::TOMBSTONE), "Signature(TOMBSTONE)");
    }

    proptest! {
        #[test]
        fn live_signature_never_collides_with_sentinels(hash in any::<u64>()) {
            let sig = Signature::from_hash(hash);
            prop_assert!(sig.is_occupied());
            prop_assert_eq!(sig.probe_hash(), hash >> 2);
        }
    }
}
