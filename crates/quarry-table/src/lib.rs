//! Open-addressing hash tables for Quarry.
//!
//! # Architecture
//!
//! ```text
//! Table<K, V, H, A>
//! ├── entry array      one allocation from A, power-of-two slots
//! │   └── Entry        Signature + key + value
//! ├── H: KeyHasher     Fnv1a by default, any Fn(&K) -> u64 works
//! └── A: Allocator     SystemAllocator by default, or a ScopedAllocator
//! ```
//!
//! Each slot carries a 64-bit [`Signature`]: `0` for empty, all ones for a
//! removed entry, otherwise the top 62 bits of the key hash tagged with
//! bit 63. Probing compares signatures before keys, and resizing re-places
//! entries from their signatures without calling the hasher.
//!
//! # Unsafe
//!
//! Slot storage is uninitialized until occupied. All raw access lives in
//! [`table`]; [`iter`] relies on its occupancy invariant.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod hash;
pub mod iter;
pub mod signature;
pub mod table;

// Public re-exports for the primary API surface.
pub use error::TableError;
pub use hash::{fnv1a, Fnv1a, Fnv1aState, KeyHasher, RawKey, StdHash};
pub use iter::{Iter, IterMut};
pub use signature::Signature;
pub use table::{Table, LOAD_FACTOR_PERCENT, MIN_CAPACITY};
