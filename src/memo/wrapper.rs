//! Memoizing Wrapper Module
//!
//! Composes key derivation, the store slot and the expiry policy around a
//! wrapped callable.

use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, CacheStore, ExpiryPolicy, MemoryStore};
use crate::config::MemoOptions;
use crate::error::{MemoError, Result};
use crate::key::{canonicalize, Value};

type BoxedFn<V, E> = Box<dyn Fn(&[Value]) -> std::result::Result<V, E> + Send + Sync>;

/// Live handle to the installed store.
pub type CacheGuard<'a, V> = MutexGuard<'a, Box<dyn CacheStore<V>>>;

// == Memoize ==
/// Wraps an infallible callable.
///
/// Receiver state is whatever the closure captures; hits and misses both
/// see the same captured state.
///
/// # Example
/// ```
/// use memo_ttl::{memoize, MemoOptions, Value};
///
/// let sum = memoize(
///     |args: &[Value]| args.iter().filter_map(Value::as_i64).sum::<i64>(),
///     MemoOptions::default(),
/// );
/// assert_eq!(sum.call(&[Value::from(5), Value::from(6)]).unwrap(), 11);
/// ```
pub fn memoize<V, F>(func: F, options: MemoOptions) -> Memoized<V>
where
    F: Fn(&[Value]) -> V + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    Memoized::new(move |args: &[Value]| Ok(func(args)), options)
}

/// Wraps a fallible callable. Errors are returned untouched and never stored.
pub fn try_memoize<V, E, F>(func: F, options: MemoOptions) -> Memoized<V, E>
where
    F: Fn(&[Value]) -> std::result::Result<V, E> + Send + Sync + 'static,
    V: Clone + Send + 'static,
{
    Memoized::new(func, options)
}

/// Outcome of a store lookup.
enum Lookup<V> {
    Hit(V),
    Stale,
    Missing,
}

// == Memoized ==
/// A callable with a TTL result cache in front of it.
///
/// The store sits in a replaceable slot, so swapping it never changes the
/// identity of the memoized callable. The lock is held only for lookup and
/// write-back, never while the wrapped callable runs. A result computed
/// while the store was replaced is returned but not written anywhere.
pub struct Memoized<V, E = Infallible> {
    func: BoxedFn<V, E>,
    options: MemoOptions,
    policy: ExpiryPolicy,
    slot: Mutex<Box<dyn CacheStore<V>>>,
    /// Bumped on every store replacement; only touched under the slot lock
    generation: AtomicU64,
    stats: Mutex<CacheStats>,
}

impl<V, E> Memoized<V, E>
where
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a wrapper with an empty [`MemoryStore`].
    pub fn new<F>(func: F, options: MemoOptions) -> Self
    where
        F: Fn(&[Value]) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        Self::with_store(func, options, MemoryStore::new())
    }

    /// Creates a wrapper backed by the given store.
    pub fn with_store<F, S>(func: F, options: MemoOptions, store: S) -> Self
    where
        F: Fn(&[Value]) -> std::result::Result<V, E> + Send + Sync + 'static,
        S: CacheStore<V> + 'static,
    {
        let policy = ExpiryPolicy::new(options.ttl);
        let store: Box<dyn CacheStore<V>> = Box::new(store);
        Self {
            func: Box::new(func),
            options,
            policy,
            slot: Mutex::new(store),
            generation: AtomicU64::new(0),
            stats: Mutex::new(CacheStats::new()),
        }
    }

    // == Call ==
    /// Returns the stored result for `args` if fresh, otherwise runs the
    /// wrapped callable with the original `args` and stores its result.
    pub fn call(&self, args: &[Value]) -> std::result::Result<V, MemoError<E>> {
        let key = match self.key_for(args) {
            Ok(key) => key,
            Err(err) => {
                debug!(error = %err, "memo key derivation failed");
                self.stats.lock().record_key_failure();
                return Err(err.into());
            }
        };

        let now = self.options.clock.now_ms();
        let (lookup, generation) = self.lookup(&key, now);
        let stale = match lookup {
            Lookup::Hit(value) => {
                trace!(key = %key, "memo hit");
                self.stats.lock().record_hit();
                return Ok(value);
            }
            Lookup::Stale => {
                debug!(key = %key, "memo entry stale, recomputing");
                true
            }
            Lookup::Missing => {
                trace!(key = %key, "memo miss");
                false
            }
        };

        let result = (self.func)(args);

        let entries = match &result {
            Ok(value) => {
                let mut store = self.slot.lock();
                if self.generation.load(Ordering::Relaxed) == generation {
                    store.set(key, CacheEntry::new(value.clone(), now));
                } else {
                    debug!(key = %key, "memo store replaced during call, result not cached");
                }
                Some(store.len())
            }
            Err(_) => {
                debug!(key = %key, "wrapped call failed, result not cached");
                None
            }
        };

        let mut stats = self.stats.lock();
        stats.record_miss();
        if stale {
            stats.record_refresh();
        }
        match entries {
            Some(count) => stats.set_total_entries(count),
            None => stats.record_call_failure(),
        }

        result.map_err(MemoError::Call)
    }

    /// Looks `key` up and reports which store generation answered.
    fn lookup(&self, key: &str, now: u64) -> (Lookup<V>, u64) {
        let store = self.slot.lock();
        let generation = self.generation.load(Ordering::Relaxed);
        let lookup = match store.get(key) {
            Some(entry) if self.policy.is_valid(entry, now) => Lookup::Hit(entry.value.clone()),
            Some(_) => Lookup::Stale,
            None => Lookup::Missing,
        };
        (lookup, generation)
    }

    // == Key For ==
    /// The key a call with `args` would use, after argument conversion.
    pub fn key_for(&self, args: &[Value]) -> Result<String> {
        match &self.options.convert_args {
            Some(convert) => canonicalize(convert(args).as_slice(), self.options.key_strategy),
            None => canonicalize(args, self.options.key_strategy),
        }
    }

    // == Cache Access ==
    /// Live access to the installed store.
    ///
    /// Edits made through the guard are seen by the next call. Do not hold
    /// the guard across a call to this wrapper.
    pub fn cache(&self) -> CacheGuard<'_, V> {
        self.slot.lock()
    }

    /// Installs a new store and returns the previous one.
    ///
    /// Calls already running when the store is replaced do not write their
    /// results into the new store.
    pub fn set_cache<S>(&self, store: S) -> Box<dyn CacheStore<V>>
    where
        S: CacheStore<V> + 'static,
    {
        self.replace_cache(Box::new(store))
    }

    /// Boxed form of [`Memoized::set_cache`].
    pub fn replace_cache(&self, store: Box<dyn CacheStore<V>>) -> Box<dyn CacheStore<V>> {
        let mut slot = self.slot.lock();
        let previous = std::mem::replace(&mut *slot, store);
        self.generation.fetch_add(1, Ordering::Relaxed);
        drop(slot);
        debug!(previous_entries = previous.len(), "memo store replaced");
        previous
    }

    // == Maintenance ==
    /// Removes the entry for one argument set. Returns whether one existed.
    pub fn invalidate(&self, args: &[Value]) -> Result<bool> {
        let key = self.key_for(args)?;
        Ok(self.slot.lock().remove(&key).is_some())
    }

    /// Empties the installed store.
    pub fn clear(&self) {
        self.slot.lock().clear();
    }

    /// Drops every stale entry now instead of waiting for lookups.
    pub fn purge_expired(&self) -> usize {
        let now = self.options.clock.now_ms();
        let removed = self.slot.lock().purge_expired(&self.policy, now);
        if removed > 0 {
            debug!(removed, "purged expired memo entries");
        }
        removed
    }

    // == Introspection ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        stats.set_total_entries(self.slot.lock().len());
        stats
    }

    pub fn ttl(&self) -> Duration {
        self.policy.ttl()
    }

    pub fn options(&self) -> &MemoOptions {
        &self.options
    }
}

impl<V, E> fmt::Debug for Memoized<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("options", &self.options)
            .field("entries", &self.slot.lock().len())
            .finish()
    }
}
