//! Async Memoization Module
//!
//! Memoizes callables that return futures by caching a shared handle to the
//! computation rather than its output.

use std::future::Future;

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::config::MemoOptions;
use crate::key::Value;
use crate::memo::{memoize, Memoized};

/// Cloneable handle to one in-flight or settled computation.
pub type SharedResult<T> = Shared<BoxFuture<'static, T>>;

// == Memoize Async ==
/// Wraps a callable returning a future.
///
/// A miss starts nothing by itself: it stores the shared handle and returns
/// a clone. Every later hit returns another clone of the same handle, so all
/// callers await a single computation. A future that never settles stays
/// cached until its entry expires.
pub fn memoize_async<T, Fut, F>(func: F, options: MemoOptions) -> Memoized<SharedResult<T>>
where
    F: Fn(&[Value]) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    memoize(move |args: &[Value]| func(args).boxed().shared(), options)
}
