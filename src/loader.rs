//! Loader: computes a value for a key that missed the cache.
//!
//! # Example
//! ```
//! use lungo::CacheBuilder;
//!
//! let mut squares: lungo::LruCache<u64, u64> = CacheBuilder::new(100)
//!     .loader(|k: &u64| Some(k * k))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(squares.get(&12).unwrap().as_deref(), Some(&144));
//! assert_eq!(squares.create_count(), 1);
//! ```

/// Synthesizes a value after a cache miss.
///
/// Returning `None` leaves the cache untouched and makes `get` return `None`.
/// A [`SyncLruCache`](crate::SyncLruCache) runs the loader without holding
/// its lock, so a slow loader does not block other callers; two callers that
/// miss on the same key may both load, and the first one to publish wins.
pub trait Loader<K, V>: Send + Sync + 'static {
    fn load(&self, key: &K) -> Option<V>;
}

/// Never produces a value.  This is the default loader.
pub struct NoLoader;

impl<K, V> Loader<K, V> for NoLoader {
    #[inline]
    fn load(&self, _key: &K) -> Option<V> {
        None
    }
}

/// A [`Loader`] backed by a closure.
///
/// Created via [`CacheBuilder::loader`](crate::CacheBuilder::loader).
pub struct FnLoader<F>(pub F);

impl<K, V, F> Loader<K, V> for FnLoader<F>
where
    F: Fn(&K) -> Option<V> + Send + Sync + 'static,
{
    #[inline]
    fn load(&self, key: &K) -> Option<V> {
        (self.0)(key)
    }
}
