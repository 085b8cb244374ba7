//! Memo Module
//!
//! The memoizing wrapper and its async variant.

mod future;
mod wrapper;

pub use future::{memoize_async, SharedResult};
pub use wrapper::{memoize, try_memoize, CacheGuard, Memoized};
