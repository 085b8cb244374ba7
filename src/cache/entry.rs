//! Cache Entry Module
//!
//! Defines the timestamped slot holding one memoized result.

use std::time::Duration;

// == Cache Entry ==
/// A memoized result and the moment it was computed.
///
/// The value may be an async handle; the entry holds the handle itself.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Creation timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// The memoized result
    pub value: V,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, timestamp: u64) -> Self {
        Self { timestamp, value }
    }

    // == Age ==
    /// Milliseconds since creation. Zero if `now` precedes the timestamp.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    // == Time To Live ==
    /// Milliseconds left before the entry goes stale under `ttl`.
    ///
    /// # Returns
    /// - `0` once the entry is expired
    /// - `ttl - age` otherwise
    pub fn remaining_ms(&self, ttl: Duration, now: u64) -> u64 {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        ttl_ms.saturating_sub(self.age_ms(now))
    }
}
