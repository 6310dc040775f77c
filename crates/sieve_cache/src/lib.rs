//! Incremental transformation-cache engine.
//!
//! This crate provides the caching and invalidation machinery for the sieve
//! file-transformation pipeline: cache entries keyed by the identity of their
//! input files, a memoized digest cache, a per-process in-memory cache, a
//! manifest-backed persisted cache that survives process restarts, and the
//! materializer that turns cache hits into output files via linking or
//! copying.

#![warn(missing_docs)]

pub mod digest;
pub mod entry;
pub mod error;
pub mod keys;
pub mod manifest;
pub mod materialize;
pub mod memory;
pub mod persist;

pub use digest::DigestCache;
pub use entry::CacheEntry;
pub use error::CacheError;
pub use keys::{EntryHasher, KeyMode};
pub use manifest::CacheManifest;
pub use materialize::{durable_promote, promote};
pub use memory::MemoryCache;
pub use persist::PersistedCache;
