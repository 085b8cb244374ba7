//! Cache Module
//!
//! Entry storage and TTL freshness for memoized results.

mod entry;
mod expiry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use expiry::ExpiryPolicy;
pub use stats::CacheStats;
pub use store::{CacheStore, MemoryStore};

// == Public Constants ==
/// TTL applied when none is configured
pub const DEFAULT_TTL_MS: u64 = 60 * 60 * 1000; // 1 hour
