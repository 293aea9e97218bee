//! Core allocation types for the Quarry workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! [`Allocator`] capability every other Quarry crate is written against,
//! the [`SystemAllocator`] that backs it with the C heap, and the alignment
//! arithmetic shared by the arena and table crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod alloc;
pub mod error;
pub mod layout;

pub use alloc::{Allocator, SystemAllocator};
pub use error::AllocError;
pub use layout::{align_up, MAX_ALIGN};
