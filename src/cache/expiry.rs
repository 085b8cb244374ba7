//! Expiry Policy Module
//!
//! Decides whether a stored entry is still fresh.

use std::time::Duration;

use crate::cache::CacheEntry;

// == Expiry Policy ==
/// TTL check shared by every entry of one memoized callable.
///
/// Freshness is the half-open window `[timestamp, timestamp + ttl)`: an
/// entry exactly `ttl` old is already expired. Nothing is swept in the
/// background; staleness is only decided on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    ttl: Duration,
}

impl ExpiryPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// TTL in whole milliseconds, saturating.
    pub fn ttl_ms(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }

    // == Is Valid ==
    /// `now - timestamp < ttl`
    pub fn is_valid<V>(&self, entry: &CacheEntry<V>, now: u64) -> bool {
        entry.age_ms(now) < self.ttl_ms()
    }

    pub fn is_expired<V>(&self, entry: &CacheEntry<V>, now: u64) -> bool {
        !self.is_valid(entry, now)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_is_valid() {
        let policy = ExpiryPolicy::new(Duration::from_millis(100));
        let entry = CacheEntry::new(1, 1_000);

        assert!(policy.is_valid(&entry, 1_000));
        assert!(policy.is_valid(&entry, 1_099));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let policy = ExpiryPolicy::new(Duration::from_millis(100));
        let entry = CacheEntry::new(1, 1_000);

        // Exactly ttl old is expired
        assert!(policy.is_expired(&entry, 1_100));
        assert!(policy.is_expired(&entry, 5_000));
    }

    #[test]
    fn test_zero_ttl_never_valid() {
        let policy = ExpiryPolicy::new(Duration::ZERO);
        let entry = CacheEntry::new(1, 1_000);
        assert!(policy.is_expired(&entry, 1_000));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let policy = ExpiryPolicy::new(Duration::MAX);
        let entry = CacheEntry::new(1, 0);
        assert_eq!(policy.ttl_ms(), u64::MAX);
        assert!(policy.is_valid(&entry, u64::MAX - 1));
    }
}
