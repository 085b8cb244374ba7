//! memo_ttl - Result memoization with per-entry TTL
//!
//! Wraps any callable so repeated calls with equal arguments return a stored
//! result until it expires. Arguments may be arbitrary, even cyclic, graphs;
//! they are canonicalized into a string key without being modified.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod key;
pub mod memo;

pub use cache::{CacheEntry, CacheStats, CacheStore, ExpiryPolicy, MemoryStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, MemoOptions};
pub use error::{KeyError, MemoError, UnknownKeyStrategy};
pub use key::{canonicalize, ArgVector, KeyStrategy, Value};
pub use memo::{memoize, memoize_async, try_memoize, Memoized, SharedResult};
