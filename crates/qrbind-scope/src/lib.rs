//! Scoped linear-memory allocation and boundary marshaling.
//!
//! Foreign linear memory is not garbage-collected and is shared across
//! calls: forgetting to free leaks, freeing twice corrupts the module
//! allocator. This crate turns that ad hoc try/finally discipline into
//! two reusable pieces:
//!
//! - [`Scope`] tracks every buffer allocated during one logical
//!   operation and releases all of them exactly once when it drops, on
//!   success, error, and panic paths alike.
//! - [`marshal`] converts host values into linear-memory byte layouts
//!   (NUL-terminated UTF-8, raw payloads) and reconstructs the module
//!   matrix from raw memory reads.
//!
//! No address ever escapes a closed scope; callers copy what they need
//! (the [`Matrix`](qrbind_core::Matrix)) out before the scope ends.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod marshal;
pub mod scope;

pub use scope::{with_scope, Allocation, Scope};
