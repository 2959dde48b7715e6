//! Removal listener: a callback invoked whenever an entry leaves the cache.
//!
//! # Example
//! ```
//! use lungo::CacheBuilder;
//! use std::sync::{Arc, Mutex};
//!
//! let log: Arc<Mutex<Vec<(u64, bool)>>> = Arc::new(Mutex::new(Vec::new()));
//! let log2 = Arc::clone(&log);
//!
//! let mut cache: lungo::LruCache<u64, u64> = CacheBuilder::new(2)
//!     .removal_listener(move |evicted, key: &u64, _old, _new| {
//!         log2.lock().unwrap().push((*key, evicted));
//!     })
//!     .build()
//!     .unwrap();
//!
//! cache.put(1, 10).unwrap();
//! cache.put(2, 20).unwrap();
//! cache.put(3, 30).unwrap(); // capacity eviction of 1
//! cache.remove(&2).unwrap(); // explicit removal
//! assert_eq!(*log.lock().unwrap(), vec![(1, true), (2, false)]);
//! ```

use std::sync::Arc;

/// A callback invoked each time an entry is evicted, replaced or removed.
///
/// The callback receives:
/// - `evicted`: `true` only when the entry was dropped to make room,
/// - a reference to the key,
/// - the value that left the cache,
/// - the value that took its place: `Some` when a `put` replaced it or when a
///   freshly loaded value lost a race against a concurrent writer, `None`
///   for explicit removal and eviction.
///
/// In a [`SyncLruCache`](crate::SyncLruCache) the callback runs while the
/// cache lock is held.  **Do not call any method of the same cache from
/// inside the listener**, it would deadlock.
pub trait RemovalListener<K, V>: Send + Sync + 'static {
    fn on_removal(&self, evicted: bool, key: &K, old_value: Arc<V>, new_value: Option<Arc<V>>);
}

/// Ignores every removal.  This is the default listener.
pub struct NoopListener;

impl<K, V> RemovalListener<K, V> for NoopListener {
    #[inline]
    fn on_removal(&self, _evicted: bool, _key: &K, _old: Arc<V>, _new: Option<Arc<V>>) {}
}

/// A [`RemovalListener`] backed by a closure.
///
/// Created via [`CacheBuilder::removal_listener`](crate::CacheBuilder::removal_listener).
pub struct FnListener<F>(pub F);

impl<K, V, F> RemovalListener<K, V> for FnListener<F>
where
    F: Fn(bool, &K, Arc<V>, Option<Arc<V>>) + Send + Sync + 'static,
{
    fn on_removal(&self, evicted: bool, key: &K, old_value: Arc<V>, new_value: Option<Arc<V>>) {
        (self.0)(evicted, key, old_value, new_value)
    }
}
