//! Shared foundational types for the sieve build-filter pipeline.
//!
//! This crate provides the content digest used for cache invalidation, the
//! link-or-copy filesystem primitives used for cheap output materialization,
//! and the ordered directory-tree enumerator that drives each build.

#![warn(missing_docs)]

pub mod digest;
pub mod fsops;
pub mod walk;

pub use digest::ContentDigest;
pub use fsops::{dereferenced_copy, ensure_dir, link_or_copy};
pub use walk::{walk_tree, WalkEntry};
