//! Cache Statistics Module
//!
//! Tracks hits, misses, stale refreshes and uncached failures.
//! Key-derivation failures and callable failures are counted apart.

use serde::Serialize;

// == Cache Stats ==
/// Counters for one memoized callable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Calls answered from the store
    pub hits: u64,
    /// Calls that ran the wrapped callable (absent or stale entry)
    pub misses: u64,
    /// Misses caused by a stale entry
    pub refreshes: u64,
    /// Calls rejected before the callable ran: no key could be derived
    pub key_failures: u64,
    /// Calls whose callable returned an error; nothing was stored
    pub call_failures: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn record_key_failure(&mut self) {
        self.key_failures += 1;
    }

    pub fn record_call_failure(&mut self) {
        self.call_failures += 1;
    }

    /// Failed calls of either kind.
    pub fn failures(&self) -> u64 {
        self.key_failures + self.call_failures
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.refreshes, 0);
        assert_eq!(stats.key_failures, 0);
        assert_eq!(stats.call_failures, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_refresh_and_failure_counters() {
        let mut stats = CacheStats::new();
        stats.record_refresh();
        stats.record_key_failure();
        stats.record_call_failure();
        stats.record_call_failure();
        assert_eq!(stats.refreshes, 1);
        assert_eq!(stats.key_failures, 1);
        assert_eq!(stats.call_failures, 2);
        assert_eq!(stats.failures(), 3);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.set_total_entries(4);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["total_entries"], 4);
    }
}
