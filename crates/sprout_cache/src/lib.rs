//! Generation caching primitives.
//!
//! This crate provides the pieces the generation pipeline caches with:
//! deterministic cache keys derived from requests, timestamped cache
//! entries, and an in-memory [`CacheStore`](sprout_interface::CacheStore)
//! with TTL expiry and LRU eviction.

#![warn(missing_docs)]

mod entry;
mod key;
mod store;

pub use entry::CacheEntry;
pub use key::CacheKey;
pub use store::InMemoryCacheStore;
