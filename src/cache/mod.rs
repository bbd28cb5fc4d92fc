//! In-memory cache for idempotent API responses
//!
//! The cache is an explicitly constructed [`RequestCache`] handed to each
//! client, never a process global. TTLs are recorded per entry at write time,
//! so clients with different `cache_ttl` settings can share one cache safely.

pub mod client;
pub mod key;
pub mod storage;

pub use client::CachedCall;
pub use key::{canonicalize, derive_cache_key};
pub use storage::RequestCache;
