//! Quarry: arena allocation and open-addressing hash tables.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Quarry sub-crates. For most users, adding `quarry` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use quarry::prelude::*;
//!
//! // A 4 KiB arena on the C heap.
//! let arena = Arena::new(4096).unwrap();
//!
//! {
//!     // Everything allocated through the scope is reclaimed when it ends.
//!     let scope = arena.scope();
//!     let mut counts = Table::new_in(&scope);
//!     for word in "the quick brown fox jumps over the lazy dog".split(' ') {
//!         *counts.get_or_insert_default(word).unwrap() += 1;
//!     }
//!     assert_eq!(counts.find("the"), Some(&2));
//!     assert!(arena.allocated() > 0);
//! }
//! assert_eq!(arena.allocated(), 0);
//!
//! // Tables default to the system allocator and FNV-1a.
//! let mut table: Table<u32, &str> = Table::new();
//! table.upsert(7, "seven").unwrap();
//! assert!(table.remove(&7));
//! assert!(table.is_empty());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`alloc`] | `quarry-core` | `Allocator` capability, `SystemAllocator`, alignment helpers |
//! | [`arena`] | `quarry-arena` | Bump arena, block handles, scoped allocator |
//! | [`table`] | `quarry-table` | Hash table, signatures, key hashers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// The allocator capability and alignment helpers (`quarry-core`).
///
/// Implement [`alloc::Allocator`] to plug a new memory source into every
/// Quarry container.
pub use quarry_core as alloc;

/// Fixed-capacity bump allocation (`quarry-arena`).
///
/// [`arena::Arena`] for the arena itself, [`arena::ScopedAllocator`] for
/// scope-bounded allocation through the [`alloc::Allocator`] trait.
pub use quarry_arena as arena;

/// Open-addressing hash tables (`quarry-table`).
///
/// [`table::Table`] plus the [`table::KeyHasher`] capability and the
/// default [`table::Fnv1a`] hasher.
pub use quarry_table as table;

/// Common imports for typical Quarry usage.
///
/// ```rust
/// use quarry::prelude::*;
/// ```
pub mod prelude {
    // Allocation
    pub use quarry_core::{AllocError, Allocator, SystemAllocator};

    // Arena
    pub use quarry_arena::{Arena, ArenaConfig, ArenaError, Block, ScopedAllocator};

    // Tables
    pub use quarry_table::{Fnv1a, KeyHasher, Table, TableError};
}
