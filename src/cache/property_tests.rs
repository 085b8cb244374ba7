//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store semantics and the TTL window.

use proptest::prelude::*;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStore, ExpiryPolicy, MemoryStore};

// == Strategies ==
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}"
}

#[derive(Debug, Clone)]
enum StoreOp {
    Set { key: String, value: u32 },
    Remove { key: String },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (valid_key_strategy(), any::<u32>()).prop_map(|(key, value)| StoreOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| StoreOp::Remove { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The store always agrees with a plain model map: last write wins,
    // removals take effect, nothing else changes.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(store_op_strategy(), 1..60)) {
        let mut store = MemoryStore::new();
        let mut model = std::collections::HashMap::new();

        for op in ops {
            match op {
                StoreOp::Set { key, value } => {
                    store.set(key.clone(), CacheEntry::new(value, 0));
                    model.insert(key, value);
                }
                StoreOp::Remove { key } => {
                    prop_assert_eq!(store.remove(&key).map(|e| e.value), model.remove(&key));
                }
            }
        }

        prop_assert_eq!(store.len(), model.len());
        for (key, value) in &model {
            prop_assert_eq!(store.get(key).map(|e| e.value), Some(*value));
        }
    }

    // An entry is valid for exactly `ttl` milliseconds after its timestamp.
    #[test]
    fn prop_ttl_window_is_half_open(
        created in 0u64..1_000_000_000,
        ttl_ms in 1u64..10_000_000,
        offset in 0u64..20_000_000
    ) {
        let policy = ExpiryPolicy::new(Duration::from_millis(ttl_ms));
        let entry = CacheEntry::new((), created);
        let now = created + offset;

        prop_assert_eq!(policy.is_valid(&entry, now), offset < ttl_ms);
    }

    // Purging leaves exactly the fresh entries behind.
    #[test]
    fn prop_purge_keeps_only_fresh_entries(
        ages in prop::collection::vec(0u64..2_000, 0..40),
        ttl_ms in 1u64..2_000
    ) {
        let now = 10_000u64;
        let policy = ExpiryPolicy::new(Duration::from_millis(ttl_ms));
        let mut store = MemoryStore::new();
        for (i, age) in ages.iter().enumerate() {
            store.set(format!("k{}", i), CacheEntry::new(i, now - age));
        }

        let fresh = ages.iter().filter(|age| **age < ttl_ms).count();
        let removed = store.purge_expired(&policy, now);

        prop_assert_eq!(removed, ages.len() - fresh);
        prop_assert_eq!(store.len(), fresh);
    }
}
