//! Fixed-capacity bump allocation for Quarry.
//!
//! # Architecture
//!
//! ```text
//! Arena (owns or borrows one byte buffer, single cursor)
//! ├── Block handles        safe API: alloc / realloc / bytes, generation-checked
//! └── ScopedAllocator × N  raw Allocator capability, rewinds the cursor on drop
//! ```
//!
//! Every block carries an 8-byte size header directly in front of its
//! aligned data, so the raw [`Allocator`](quarry_core::Allocator) path can
//! resize the most recent block in place without being told its old size.
//! A 512-byte arena serving 100 `i32`s at 16-byte alignment therefore
//! consumes exactly 416 bytes: 8 header, 8 padding, 400 data.
//!
//! # Unsafe
//!
//! Raw buffer access is confined to [`arena`]; every block carries a
//! `// SAFETY:` comment. The crate denies `unsafe_code`; [`arena`] and
//! [`scope`] opt back in.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod arena;
pub mod config;
pub mod error;
pub mod handle;
pub mod scope;

// Public re-exports for the primary API surface.
pub use arena::{Arena, BLOCK_HEADER};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use handle::Block;
pub use scope::ScopedAllocator;
