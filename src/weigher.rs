//! Entry weigher: assigns a cost (weight) to each cached entry.
//!
//! The cache enforces `Σ weight(entry) ≤ max_weight`.  By default every
//! entry costs 1 unit (`UnitWeigher`), so `max_weight` is simply the
//! maximum number of entries.  A custom weigher allows the cache to bound
//! memory consumption instead of entry count.
//!
//! # Example
//! ```
//! use lungo::CacheBuilder;
//!
//! // Cap at ~10 MB total value size (keys are not counted).
//! let cache: lungo::LruCache<String, Vec<u8>> = CacheBuilder::new(10 * 1024 * 1024)
//!     .weigher(|_key: &String, val: &Vec<u8>| val.len() as i64)
//!     .build()
//!     .unwrap();
//! assert_eq!(cache.size(), 0);
//! ```

/// Computes the cost of a cache entry.
///
/// The returned weight must be `>= 0` and must be the same every time it is
/// asked about the same key/value pair: the cache does not remember the
/// weight it recorded on insertion and recomputes it on removal.  A negative
/// weight is reported as [`CacheError::InvalidWeight`].  Zero-weight entries
/// are allowed; they are only evicted by `evict_all`.
///
/// [`CacheError::InvalidWeight`]: crate::CacheError::InvalidWeight
pub trait Weigher<K, V>: Send + Sync + 'static {
    fn weigh(&self, key: &K, value: &V) -> i64;
}

/// Every entry costs exactly 1 unit.  This is the default weigher.
pub struct UnitWeigher;

impl<K, V> Weigher<K, V> for UnitWeigher {
    #[inline]
    fn weigh(&self, _key: &K, _value: &V) -> i64 {
        1
    }
}

/// A weigher backed by a closure.
///
/// Created via [`CacheBuilder::weigher`](crate::CacheBuilder::weigher).
pub struct FnWeigher<F>(pub F);

impl<K, V, F> Weigher<K, V> for FnWeigher<F>
where
    F: Fn(&K, &V) -> i64 + Send + Sync + 'static,
{
    #[inline]
    fn weigh(&self, key: &K, value: &V) -> i64 {
        (self.0)(key, value)
    }
}
